//! Error types for the bedtools-rs library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, BedToolsError>;

/// Errors that can occur while building or running an interval pipeline.
#[derive(Error, Debug)]
pub enum BedToolsError {
    /// Invalid temp directory or construction arguments
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Requested program is not in the whitelist; nothing was spawned
    #[error("Program not allowed: '{0}' is not a known bedtools program")]
    DisallowedProgram(String),

    /// The toolkit executable could not be located or started
    #[error("{toolkit} installation not found: {reason}")]
    Installation { toolkit: String, reason: String },

    /// The external program exited unsuccessfully
    #[error("{program} failed (exit code {code:?}): {stderr}\ncommand: {}", args.join(" "))]
    CommandExecution {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    /// Operation needs chromosome sizes and none were supplied or cached
    #[error("Operation '{0}' needs chromosome sizes: pass a genome or call set_chrom_sizes()")]
    MissingGenome(String),

    /// The genome-size provider could not answer
    #[error("Genome lookup failed for '{genome}': {reason}")]
    GenomeLookup { genome: String, reason: String },

    /// A dataset's backing file no longer exists
    #[error("MISSING FILE: {0}")]
    MissingFile(PathBuf),

    /// A data line could not be parsed into a feature
    #[error("Failed to parse line {line} of {path}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl From<tempfile::PersistError> for BedToolsError {
    fn from(e: tempfile::PersistError) -> Self {
        BedToolsError::IoError(e.error)
    }
}
