//! Pipeline session: the context every dataset belongs to.
//!
//! A [`Session`] owns the temp-file registry, the lineage arena, the command
//! invoker and the genome-size provider. Independent sessions never share
//! temp files or lineage, so several pipelines can run in one process. A
//! process-wide default session is available through [`crate::session()`].

use crate::bedtool::BedTool;
use crate::config::Config;
use crate::error::{BedToolsError, Result};
use crate::genome::{ChromSizes, Genome, GenomeFileCache, GenomeSizeProvider};
use crate::lineage::{DatasetId, Lineage};
use crate::options::Options;
use crate::programs;
use crate::registry::{BackingFile, TempRegistry, Tracking};
use crate::runner::{Invoker, ToolkitInfo};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const EXAMPLE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Shared handle on a pipeline context. Cloning is cheap.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: Config,
    registry: Mutex<TempRegistry>,
    lineage: Mutex<Lineage>,
    invoker: Invoker,
    genomes: Option<Box<dyn GenomeSizeProvider>>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if self.config.keep_tempfiles {
            return;
        }
        let registry = self
            .registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = registry.cleanup(false) {
            log::warn!("Temp file cleanup failed: {e}");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::build(Config::default(), None)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .field("tracked_files", &self.registry().len())
            .finish()
    }
}

impl Session {
    /// Create a session.
    ///
    /// Fails with `Configuration` if `config.temp_dir` is set but missing.
    /// With `config.genome_dir` set, chromosome sizes are looked up there.
    pub fn new(config: Config) -> Result<Self> {
        let genomes = config
            .genome_dir
            .clone()
            .map(|dir| Box::new(GenomeFileCache::new(dir)) as Box<dyn GenomeSizeProvider>);
        Self::validated(config, genomes)
    }

    /// Create a session with a custom genome-size provider.
    pub fn with_genome_provider(
        config: Config,
        provider: impl GenomeSizeProvider + 'static,
    ) -> Result<Self> {
        Self::validated(config, Some(Box::new(provider)))
    }

    fn validated(config: Config, genomes: Option<Box<dyn GenomeSizeProvider>>) -> Result<Self> {
        let temp_dir = config.temp_dir.clone();
        let session = Self::build(config, genomes);
        if let Some(dir) = temp_dir {
            session.set_temp_dir(&dir)?;
        }
        Ok(session)
    }

    fn build(config: Config, genomes: Option<Box<dyn GenomeSizeProvider>>) -> Self {
        let registry = TempRegistry::new(None, &config.tempfile_prefix, &config.tempfile_suffix);
        let invoker = Invoker::new(&config);
        Session {
            inner: Arc::new(SessionInner {
                config,
                registry: Mutex::new(registry),
                lineage: Mutex::new(Lineage::new()),
                invoker,
                genomes,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn invoker(&self) -> &Invoker {
        &self.inner.invoker
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, TempRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lineage(&self) -> MutexGuard<'_, Lineage> {
        self.inner
            .lineage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Verify the toolkit is installed; cached unless `force`.
    pub fn check_installation(&self, force: bool) -> Result<ToolkitInfo> {
        self.inner.invoker.check_installation(force)
    }

    /// Move future temp files to `path`, which must exist.
    pub fn set_temp_dir(&self, path: impl AsRef<Path>) -> Result<()> {
        self.registry().set_temp_dir(path.as_ref())
    }

    pub fn temp_dir(&self) -> Result<PathBuf> {
        self.registry().temp_dir()
    }

    /// Create an empty, tracked temp file following the session naming.
    pub fn create_temp_file(&self) -> Result<PathBuf> {
        self.registry().create_temp_file()
    }

    pub(crate) fn create_backed_file(&self) -> Result<Arc<BackingFile>> {
        self.registry().create_backed_file()
    }

    pub fn tracking(&self, path: &Path) -> Tracking {
        self.registry().tracking(path)
    }

    /// Temp files currently tracked, in creation order.
    pub fn tracked_files(&self) -> Vec<PathBuf> {
        self.registry().tracked_files()
    }

    /// Delete temp files; see [`TempRegistry::cleanup`].
    pub fn cleanup(&self, remove_all: bool) -> Result<Vec<PathBuf>> {
        self.registry().cleanup(remove_all)
    }

    /// Remove every temp file of this session, live or not, and any strays.
    pub fn teardown(&self) -> Result<Vec<PathBuf>> {
        self.cleanup(true)
    }

    pub(crate) fn discard(&self, path: &Path) {
        if let Err(e) = self.registry().remove_temporary(path) {
            log::warn!("Could not discard {}: {e}", path.display());
        }
    }

    /// Wrap an existing interval file.
    ///
    /// The file is treated as caller-owned unless this session created it.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<BedTool> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BedToolsError::Configuration(format!(
                "{} does not exist; use from_string() for literal interval text",
                path.display()
            )));
        }
        let path = std::fs::canonicalize(path)?;
        let backing = self.registry().backing_for(&path);
        let id = self.lineage().add_root(&path, backing.temporary);
        Ok(BedTool::from_parts(self.clone(), id, backing, None))
    }

    /// Materialise literal interval text into a temp file and wrap it.
    ///
    /// Leading and trailing blank lines are dropped; everything in between is
    /// written verbatim.
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// let session = bedtools_rs::Session::default();
    /// let a = session.from_string("chr1\t1\t100\nchr5\t3000\t4000\n")?;
    /// assert_eq!(a.count()?, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_string(&self, text: &str) -> Result<BedTool> {
        let backing = self.create_backed_file()?;
        if let Err(e) = std::fs::write(&backing.path, trim_blank_boundaries(text)) {
            self.discard(&backing.path);
            return Err(e.into());
        }
        let id = self.lineage().add_root(&backing.path, true);
        Ok(BedTool::from_parts(self.clone(), id, backing, None))
    }

    /// Open one of the bundled example files.
    pub fn example_bedtool(&self, name: &str) -> Result<BedTool> {
        self.open(example_bed_fn(name)?)
    }

    /// Run a whitelisted program that takes no input dataset (e.g.
    /// `random` or `makewindows`) and wrap its output.
    pub fn call<I, S>(&self, program: &str, args: I, options: Options) -> Result<BedTool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if !programs::is_allowed(program) {
            return Err(BedToolsError::DisallowedProgram(program.to_string()));
        }
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let output = self.create_backed_file()?;
        if let Err(e) = self.invoker().invoke(program, &args, &options, &output.path) {
            self.discard(&output.path);
            return Err(e);
        }
        Ok(self.adopt_derived(output, program, options, Vec::new(), None))
    }

    pub(crate) fn adopt_derived(
        &self,
        backing: Arc<BackingFile>,
        operation: &str,
        options: Options,
        parents: Vec<DatasetId>,
        chrom_sizes: Option<Arc<ChromSizes>>,
    ) -> BedTool {
        let id = self.lineage().add_derived(
            &backing.path,
            backing.temporary,
            operation,
            options,
            parents,
        );
        BedTool::from_parts(self.clone(), id, backing, chrom_sizes)
    }

    /// Chromosome sizes for a named assembly from the session's provider.
    pub fn chromsizes(&self, genome: &str) -> Result<ChromSizes> {
        match &self.inner.genomes {
            Some(provider) => provider.chrom_sizes(genome),
            None => Err(BedToolsError::GenomeLookup {
                genome: genome.to_string(),
                reason: "no genome-size provider configured".to_string(),
            }),
        }
    }

    pub(crate) fn resolve_genome(&self, genome: Genome) -> Result<ChromSizes> {
        match genome {
            Genome::Named(name) => self.chromsizes(&name),
            Genome::Sizes(sizes) => Ok(sizes),
            Genome::File(path) if !path.is_file() => Err(BedToolsError::MissingFile(path)),
            Genome::File(path) => ChromSizes::from_file(&path),
        }
    }

    /// Write `sizes` as a genome file, to a new temp file when `path` is None.
    pub fn chromsizes_to_file(&self, sizes: &ChromSizes, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self.create_temp_file()?,
        };
        sizes.write_to(&path)?;
        Ok(path)
    }
}

fn trim_blank_boundaries(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => {
            let mut body = lines[first..=last].join("\n");
            body.push('\n');
            body
        }
        _ => String::new(),
    }
}

/// Path of a bundled example file such as `a.bed`.
pub fn example_bed_fn(name: &str) -> Result<PathBuf> {
    let path = Path::new(EXAMPLE_DIR).join(name);
    if name.contains(std::path::is_separator) || !path.is_file() {
        return Err(BedToolsError::Configuration(format!(
            "no example file named '{name}'"
        )));
    }
    Ok(path)
}

/// Names of the bundled example files.
pub fn list_example_beds() -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(EXAMPLE_DIR)?
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
