//! # bedtools-rs: Pipelines over the bedtools genome-arithmetic suite
//!
//! This library wraps the `bedtools` command-line programs behind a typed
//! dataset handle, so interval operations can be chained without managing
//! intermediate files by hand.
//!
//! ## Overview
//!
//! bedtools-rs allows you to:
//! - Run whitelisted bedtools programs on interval files and chain the results
//! - Keep every intermediate in session-owned temp files that are cleaned up
//!   once no handle refers to them
//! - Ask any dataset for the operations that produced it, and prune the
//!   temporary files of its ancestors
//! - Iterate the records of a dataset lazily, skipping comments and UCSC
//!   `track`/`browser` lines
//!
//! ## Example Usage
//!
//! ```no_run
//! # use anyhow::Result;
//! # fn main() -> Result<()> {
//! use bedtools_rs::{Genome, Options, Session};
//!
//! let session = Session::default();
//! let a = session.example_bedtool("a.bed")?;
//! let b = session.example_bedtool("b.bed")?;
//!
//! // Features of `a` overlapping `b`, then merged
//! let merged = (&a + &b)?.merge(Options::new())?;
//!
//! // Extend by 100bp on either side of a 1Mb chromosome
//! let sizes: bedtools_rs::ChromSizes = vec![("chr1", 1_000_000u64)].into_iter().collect();
//! let extended = merged.slop(Options::new().set("b", 100), Some(Genome::from(sizes)))?;
//!
//! for step in extended.history() {
//!     println!("{step}");
//! }
//! println!("{extended}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `session`: pipeline context owning the temp-file registry and lineage
//! - `bedtool`: dataset handles and operation dispatch
//! - `runner`: whitelisted invocation of the bedtools executable
//! - `registry`: temp-file tracking and cleanup
//! - `lineage`: history of every dataset in a session
//! - `feature`: lazy record parsing
//! - `error`: error types for the library
//!
//! ## Thread Safety
//!
//! A [`Session`] and its [`BedTool`] handles are `Send + Sync`; registry and
//! lineage updates are serialised internally. An output file counts as live
//! from the moment it is created, so a concurrent `cleanup(false)` never
//! removes a file a subprocess is still writing. Separate sessions keep their
//! own temp files and lineage, and a sweep in one session leaves the live temp
//! files of the others alone.

pub mod bedtool;
pub mod binary_finder;
pub mod config;
pub mod error;
pub mod feature;
pub mod genome;
pub mod lineage;
pub mod operations;
pub mod options;
pub mod programs;
pub mod registry;
pub mod runner;
pub mod session;

use error::Result;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use bedtool::{BedTool, Input};
pub use config::{Config, ConfigBuilder};
pub use error::BedToolsError;
pub use feature::{Feature, FeatureFormat, Features};
pub use genome::{ChromSizes, Genome, GenomeFileCache, GenomeSizeProvider};
pub use lineage::{confirm_on_stdin, DatasetId, HistoryStep};
pub use options::{OptionValue, Options};
pub use registry::Tracking;
pub use runner::ToolkitInfo;
pub use session::{example_bed_fn, list_example_beds, Session};

static DEFAULT_SESSION: OnceLock<Session> = OnceLock::new();

/// The process-wide default session used by the free functions below.
///
/// It is never dropped, so call [`cleanup`] before exit to remove its
/// temp files.
pub fn session() -> &'static Session {
    DEFAULT_SESSION.get_or_init(Session::default)
}

/// Open an interval file in the default session.
pub fn bedtool(path: impl AsRef<Path>) -> Result<BedTool> {
    session().open(path)
}

/// Wrap literal interval text in the default session.
pub fn from_string(text: &str) -> Result<BedTool> {
    session().from_string(text)
}

/// Remove the default session's temp files; see [`Session::cleanup`].
pub fn cleanup(remove_all: bool) -> Result<Vec<PathBuf>> {
    session().cleanup(remove_all)
}

/// Change where the default session creates temp files.
pub fn set_tempdir(path: impl AsRef<Path>) -> Result<()> {
    session().set_temp_dir(path)
}
