//! Configuration options for a pipeline session.
//!
//! This module provides a builder pattern for configuring where temporary
//! files live, how they are named and where the bedtools executable is found.

use std::path::PathBuf;

/// Configuration for a [`Session`](crate::Session).
///
/// Use the builder pattern to construct configurations with non-default values.
///
/// # Default Values
/// - `temp_dir`: None (platform temp directory)
/// - `bedtools_dir`: None (search `PATH` only)
/// - `executable`: `"bedtools"`
/// - `tempfile_prefix`: `"bedtools-rs."`
/// - `tempfile_suffix`: `".tmp"`
/// - `keep_tempfiles`: false
/// - `genome_dir`: None
/// - `verbose`: false
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for temporary files; must exist when set
    pub temp_dir: Option<PathBuf>,

    /// Directory searched for the toolkit executable before `PATH`
    pub bedtools_dir: Option<PathBuf>,

    /// Name of the toolkit executable
    pub executable: String,

    /// Prefix of every temp file this session creates
    pub tempfile_prefix: String,

    /// Suffix of every temp file this session creates
    pub tempfile_suffix: String,

    /// Leave temp files on disk when the session is dropped
    pub keep_tempfiles: bool,

    /// Local cache of `<genome>.genome` / `<genome>.chrom.sizes` files
    pub genome_dir: Option<PathBuf>,

    /// Log every executed command line at info level
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            temp_dir: None,
            bedtools_dir: None,
            executable: "bedtools".to_string(),
            tempfile_prefix: "bedtools-rs.".to_string(),
            tempfile_suffix: ".tmp".to_string(),
            keep_tempfiles: false,
            genome_dir: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Example
    /// ```
    /// use bedtools_rs::Config;
    ///
    /// let config = Config::builder()
    ///     .temp_dir(std::env::temp_dir())
    ///     .keep_tempfiles(true)
    ///     .build();
    /// assert!(config.keep_tempfiles);
    /// ```
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for constructing Config instances.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the temporary directory for intermediate files.
    ///
    /// Default: System temp directory
    pub fn temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(path.into());
        self
    }

    /// Sets a directory to look in for the toolkit before falling back to `PATH`.
    pub fn bedtools_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.bedtools_dir = Some(path.into());
        self
    }

    /// Sets the toolkit executable name.
    ///
    /// Default: `bedtools`
    pub fn executable(mut self, name: impl Into<String>) -> Self {
        self.config.executable = name.into();
        self
    }

    /// Sets the temp file naming convention.
    ///
    /// Stray files matching it are removed by `cleanup(true)`, so keep the
    /// prefix specific to this application.
    pub fn tempfile_naming(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.config.tempfile_prefix = prefix.into();
        self.config.tempfile_suffix = suffix.into();
        self
    }

    /// Keep temp files when the session goes away.
    ///
    /// Default: false
    pub fn keep_tempfiles(mut self, keep: bool) -> Self {
        self.config.keep_tempfiles = keep;
        self
    }

    /// Sets the directory holding cached chromosome size files.
    pub fn genome_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.genome_dir = Some(path.into());
        self
    }

    /// Enable verbose command logging.
    ///
    /// Default: false
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Builds the final Config instance.
    pub fn build(self) -> Config {
        self.config
    }
}
