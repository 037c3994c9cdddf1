//! Dataset handles and the operation dispatcher.
//!
//! A [`BedTool`] wraps one interval file inside a [`Session`]. Every operation
//! runs the corresponding whitelisted bedtools program with the handle's file
//! as input and wraps the output in a new handle, recording lineage as it
//! goes. Handles are cheap to clone; clones share the same backing file.

use crate::error::{BedToolsError, Result};
use crate::feature::{DataLines, Feature, FeatureFormat, Features};
use crate::genome::{ChromSizes, Genome};
use crate::lineage::{DatasetId, HistoryStep};
use crate::operations::{self, Inputs, Operation};
use crate::options::Options;
use crate::registry::{BackingFile, Tracking};
use crate::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::ops::{Add, Sub};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const COMPARE_CHUNK: usize = 64 * 1024;

/// Handle on one interval dataset.
#[derive(Clone)]
pub struct BedTool {
    session: Session,
    id: DatasetId,
    backing: Arc<BackingFile>,
    chrom_sizes: Option<Arc<ChromSizes>>,
    sequence: Option<Arc<BackingFile>>,
}

/// Second operand of a two-input operation.
#[derive(Debug, Clone)]
pub enum Input<'a> {
    Dataset(&'a BedTool),
    /// A file used as-is; it does not join the lineage
    Path(PathBuf),
}

impl<'a> From<&'a BedTool> for Input<'a> {
    fn from(dataset: &'a BedTool) -> Self {
        Input::Dataset(dataset)
    }
}

impl From<&Path> for Input<'_> {
    fn from(path: &Path) -> Self {
        Input::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Input<'_> {
    fn from(path: PathBuf) -> Self {
        Input::Path(path)
    }
}

impl From<&PathBuf> for Input<'_> {
    fn from(path: &PathBuf) -> Self {
        Input::Path(path.clone())
    }
}

impl From<&str> for Input<'_> {
    fn from(path: &str) -> Self {
        Input::Path(PathBuf::from(path))
    }
}

impl Input<'_> {
    fn resolve(&self) -> Result<(PathBuf, Option<DatasetId>)> {
        match self {
            Input::Dataset(other) => {
                other.ensure_present()?;
                Ok((other.path().to_path_buf(), Some(other.id)))
            }
            Input::Path(path) if path.exists() => Ok((path.clone(), None)),
            Input::Path(path) => Err(BedToolsError::MissingFile(path.clone())),
        }
    }
}

// Output of one external program run, before it is wrapped in a handle.
struct Execution {
    output: Arc<BackingFile>,
    parents: Vec<DatasetId>,
    chrom_sizes: Option<Arc<ChromSizes>>,
}

impl BedTool {
    pub(crate) fn from_parts(
        session: Session,
        id: DatasetId,
        backing: Arc<BackingFile>,
        chrom_sizes: Option<Arc<ChromSizes>>,
    ) -> Self {
        BedTool {
            session,
            id,
            backing,
            chrom_sizes,
            sequence: None,
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.backing.path
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True if the backing file was created by the session.
    pub fn is_temporary(&self) -> bool {
        self.backing.temporary
    }

    /// True if the backing file no longer exists on disk.
    pub fn is_missing(&self) -> bool {
        !self.backing.path.exists()
    }

    fn ensure_present(&self) -> Result<()> {
        if self.is_missing() {
            return Err(BedToolsError::MissingFile(self.backing.path.clone()));
        }
        Ok(())
    }

    /// Every operation that led to this dataset, oldest first.
    pub fn history(&self) -> Vec<HistoryStep> {
        self.session.lineage().history(self.id)
    }

    pub fn chrom_sizes(&self) -> Option<&ChromSizes> {
        self.chrom_sizes.as_deref()
    }

    /// Attach chromosome sizes used by later genome-aware operations.
    pub fn set_chrom_sizes(&mut self, genome: impl Into<Genome>) -> Result<()> {
        let sizes = self.session.resolve_genome(genome.into())?;
        self.chrom_sizes = Some(Arc::new(sizes));
        Ok(())
    }

    /// FASTA produced by [`sequence`](Self::sequence), if any.
    pub fn sequence_path(&self) -> Option<&Path> {
        self.sequence.as_deref().map(|s| s.path.as_path())
    }

    /// Lazily iterate the features of the backing file.
    pub fn features(&self) -> Result<Features> {
        Features::open(self.path())
    }

    /// Number of features.
    pub fn count(&self) -> Result<usize> {
        let mut n = 0;
        for line in DataLines::open(self.path())? {
            line?;
            n += 1;
        }
        Ok(n)
    }

    /// Length of every feature, in file order.
    pub fn lengths(&self) -> Result<Vec<u64>> {
        self.features()?.map(|f| f.map(|f| f.length())).collect()
    }

    /// First `n` retained lines, tab-delimited, each ending in a newline.
    pub fn head(&self, n: usize) -> Result<String> {
        let mut out = String::new();
        for line in DataLines::open(self.path())?.take(n) {
            out.push_str(&line?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Byte-for-byte comparison of the two backing files.
    pub fn content_eq(&self, other: &BedTool) -> Result<bool> {
        self.ensure_present()?;
        other.ensure_present()?;
        if self.path() == other.path() {
            return Ok(true);
        }
        if std::fs::metadata(self.path())?.len() != std::fs::metadata(other.path())?.len() {
            return Ok(false);
        }

        let mut a = File::open(self.path())?;
        let mut b = File::open(other.path())?;
        let mut buf_a = vec![0u8; COMPARE_CHUNK];
        let mut buf_b = vec![0u8; COMPARE_CHUNK];
        loop {
            let n = read_full(&mut a, &mut buf_a)?;
            let m = read_full(&mut b, &mut buf_b)?;
            if buf_a[..n] != buf_b[..m] {
                return Ok(false);
            }
            if n == 0 {
                return Ok(true);
            }
        }
    }

    /// Report overlaps between `self` and `other` (`intersectBed`).
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use bedtools_rs::{Options, Session};
    ///
    /// let session = Session::default();
    /// let a = session.example_bedtool("a.bed")?;
    /// let b = session.example_bedtool("b.bed")?;
    /// let overlapping = a.intersect(&b, Options::new().flag("u"))?;
    /// println!("{}", overlapping.head(5)?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn intersect<'a>(&self, other: impl Into<Input<'a>>, options: Options) -> Result<BedTool> {
        self.derive(operation("intersect")?, Some(other.into()), options, None)
    }

    /// Remove the parts of `self` covered by `other` (`subtractBed`).
    pub fn subtract<'a>(&self, other: impl Into<Input<'a>>, options: Options) -> Result<BedTool> {
        self.derive(operation("subtract")?, Some(other.into()), options, None)
    }

    pub fn closest<'a>(&self, other: impl Into<Input<'a>>, options: Options) -> Result<BedTool> {
        self.derive(operation("closest")?, Some(other.into()), options, None)
    }

    pub fn window<'a>(&self, other: impl Into<Input<'a>>, options: Options) -> Result<BedTool> {
        self.derive(operation("window")?, Some(other.into()), options, None)
    }

    pub fn coverage<'a>(&self, other: impl Into<Input<'a>>, options: Options) -> Result<BedTool> {
        self.derive(operation("coverage")?, Some(other.into()), options, None)
    }

    /// Combine overlapping or nearby features (`mergeBed`).
    pub fn merge(&self, options: Options) -> Result<BedTool> {
        self.derive(operation("merge")?, None, options, None)
    }

    pub fn sort(&self, options: Options) -> Result<BedTool> {
        self.derive(operation("sort")?, None, options, None)
    }

    pub fn cluster(&self, options: Options) -> Result<BedTool> {
        self.derive(operation("cluster")?, None, options, None)
    }

    /// Extend each feature, clipped to the chromosome bounds (`slopBed`).
    ///
    /// Chromosome sizes come from `genome` or, failing that, from sizes
    /// attached to this dataset. Explicit sizes are attached to the result.
    pub fn slop(&self, options: Options, genome: Option<Genome>) -> Result<BedTool> {
        self.derive(operation("slop")?, None, options, genome)
    }

    pub fn flank(&self, options: Options, genome: Option<Genome>) -> Result<BedTool> {
        self.derive(operation("flank")?, None, options, genome)
    }

    pub fn complement(&self, options: Options, genome: Option<Genome>) -> Result<BedTool> {
        self.derive(operation("complement")?, None, options, genome)
    }

    pub fn shuffle(&self, options: Options, genome: Option<Genome>) -> Result<BedTool> {
        self.derive(operation("shuffle")?, None, options, genome)
    }

    /// Extract the sequences of this dataset's intervals from `fasta`.
    ///
    /// The returned handle keeps the same intervals and backing file as
    /// `self`; the FASTA output is available from
    /// [`sequence_path`](Self::sequence_path).
    pub fn sequence(&self, fasta: impl AsRef<Path>, options: Options) -> Result<BedTool> {
        let op = operation("sequence")?;
        let fasta = fasta.as_ref();
        if !fasta.is_file() {
            return Err(BedToolsError::MissingFile(fasta.to_path_buf()));
        }
        let prefix = vec![OsString::from("-fi"), fasta.as_os_str().to_os_string()];
        let exec = self.execute(op, None, prefix, &options, None)?;

        let id = self.session.lineage().add_derived(
            self.path(),
            self.is_temporary(),
            op.name,
            options,
            exec.parents,
        );
        Ok(BedTool {
            session: self.session.clone(),
            id,
            backing: Arc::clone(&self.backing),
            chrom_sizes: self.chrom_sizes.clone(),
            sequence: Some(exec.output),
        })
    }

    /// Keep `n` randomly chosen features, in their original order.
    ///
    /// The same `seed` always selects the same features.
    pub fn random_subset(&self, n: usize, seed: Option<u64>) -> Result<BedTool> {
        let total = self.count()?;
        if n > total {
            return Err(BedToolsError::Configuration(format!(
                "cannot sample {n} features from a dataset of {total}"
            )));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut picked = rand::seq::index::sample(&mut rng, total, n).into_vec();
        picked.sort_unstable();

        let mut options = Options::new().set("n", n);
        if let Some(seed) = seed {
            options.insert("seed", seed);
        }

        let path = self.path().to_path_buf();
        self.derive_internal(operation("random_subset")?, options, move |out| {
            let mut wanted = picked.into_iter().peekable();
            for (i, line) in DataLines::open(&path)?.enumerate() {
                let line = line?;
                match wanted.peek() {
                    Some(&next) if next == i => {
                        writeln!(out, "{line}")?;
                        wanted.next();
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            Ok(())
        })
    }

    /// Replace each feature with a `width`-bp interval at its midpoint.
    pub fn feature_centers(&self, width: u64) -> Result<BedTool> {
        let features = self.features()?;
        self.derive_internal(
            operation("feature_centers")?,
            Options::new().set("n", width),
            move |out| {
                for feature in features {
                    writeln!(out, "{}", centered(&feature?, width))?;
                }
                Ok(())
            },
        )
    }

    /// Run an operation by method name.
    ///
    /// Only external operations that yield a new interval dataset can be run
    /// this way. A genome file may be passed as the `g` option.
    pub fn run<'a>(
        &self,
        name: &str,
        other: Option<Input<'a>>,
        options: Options,
    ) -> Result<BedTool> {
        let op = operation(name)?;
        if op.inputs == Inputs::Internal || !op.returns_new_dataset {
            return Err(BedToolsError::Configuration(format!(
                "'{name}' needs its dedicated method"
            )));
        }
        self.derive(op, other, options, None)
    }

    fn derive(
        &self,
        op: &'static Operation,
        other: Option<Input<'_>>,
        options: Options,
        genome: Option<Genome>,
    ) -> Result<BedTool> {
        let exec = self.execute(op, other, Vec::new(), &options, genome)?;
        Ok(self.session.adopt_derived(
            exec.output,
            op.name,
            options,
            exec.parents,
            exec.chrom_sizes,
        ))
    }

    fn execute(
        &self,
        op: &'static Operation,
        other: Option<Input<'_>>,
        mut args: Vec<OsString>,
        options: &Options,
        genome: Option<Genome>,
    ) -> Result<Execution> {
        self.ensure_present()?;
        let mut parents = vec![self.id];

        match op.inputs {
            Inputs::Single(flag) => {
                args.push(flag.into());
                args.push(self.path().into());
            }
            Inputs::Pair(flag_a, flag_b) => {
                let other = other.ok_or_else(|| {
                    BedToolsError::Configuration(format!("{} requires a second dataset", op.name))
                })?;
                let (other_path, other_id) = other.resolve()?;
                args.push(flag_a.into());
                args.push(self.path().into());
                args.push(flag_b.into());
                args.push(other_path.into());
                parents.extend(other_id);
            }
            Inputs::Internal => {
                return Err(BedToolsError::Other(format!(
                    "{} does not run an external program",
                    op.name
                )))
            }
        }

        let chrom_sizes = match genome {
            Some(genome) => Some(Arc::new(self.session.resolve_genome(genome)?)),
            None => self.chrom_sizes.clone(),
        };

        let mut scratch = Vec::new();
        if op.needs_genome && !options.contains("g") {
            let sizes = chrom_sizes
                .as_deref()
                .filter(|sizes| !sizes.is_empty())
                .ok_or_else(|| BedToolsError::MissingGenome(op.name.to_string()))?;
            let genome_file = self.session.create_backed_file()?;
            scratch.push(Arc::clone(&genome_file));
            if let Err(e) = sizes.write_to(&genome_file.path) {
                self.session.discard(&genome_file.path);
                return Err(e);
            }
            args.push("-g".into());
            args.push(genome_file.path.clone().into());
        }

        let output = self.session.create_backed_file()?;
        let result = self
            .session
            .invoker()
            .invoke(op.program, &args, options, &output.path);
        for file in &scratch {
            self.session.discard(&file.path);
        }
        if let Err(e) = result {
            self.session.discard(&output.path);
            return Err(e);
        }

        Ok(Execution {
            output,
            parents,
            chrom_sizes,
        })
    }

    fn derive_internal<F>(&self, op: &'static Operation, options: Options, write: F) -> Result<BedTool>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        self.ensure_present()?;
        let output = self.session.create_backed_file()?;
        if let Err(e) = write_output(&output.path, write) {
            self.session.discard(&output.path);
            return Err(e);
        }
        Ok(self.session.adopt_derived(
            output,
            op.name,
            options,
            vec![self.id],
            self.chrom_sizes.clone(),
        ))
    }

    /// Delete the backing files of temporary ancestors.
    ///
    /// `confirm` is asked once per file (see
    /// [`confirm_on_stdin`](crate::confirm_on_stdin)); without it every
    /// eligible file is deleted. Files created outside the session are never
    /// candidates. Returns the paths that were removed.
    pub fn delete_temporary_history(
        &self,
        confirm: Option<&dyn Fn(&Path) -> bool>,
    ) -> Result<Vec<PathBuf>> {
        let candidates = self.session.lineage().temporary_ancestors(self.id);
        let mut removed = Vec::new();
        for path in candidates {
            if self.session.tracking(&path) != Tracking::Temporary {
                continue;
            }
            if let Some(confirm) = confirm {
                if !confirm(&path) {
                    log::debug!("Keeping {}", path.display());
                    continue;
                }
            }
            if self.session.registry().remove_temporary(&path)? {
                log::info!("Deleted {}", path.display());
                removed.push(path);
            }
        }
        Ok(removed)
    }
}

fn operation(name: &str) -> Result<&'static Operation> {
    operations::lookup(name).ok_or_else(|| BedToolsError::DisallowedProgram(name.to_string()))
}

fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    Ok(())
}

// Fill `buf` as far as the reader allows; 0 means end of file.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn centered(feature: &Feature, width: u64) -> String {
    let center = feature.start() + feature.length() / 2;
    let start = center.saturating_sub(width / 2);
    let stop = start + width;
    let mut fields = vec![
        feature.chrom().to_string(),
        start.to_string(),
        stop.to_string(),
    ];
    match feature.format() {
        FeatureFormat::Bed => fields.extend(feature.fields()[3..].iter().cloned()),
        FeatureFormat::Gff | FeatureFormat::Vcf => {
            for value in [feature.name(), feature.score(), feature.strand()] {
                fields.push(value.unwrap_or(".").to_string());
            }
        }
    }
    fields.join("\t")
}

/// `a + b`: features of `a` overlapping `b` (intersect `-u`).
impl Add<&BedTool> for &BedTool {
    type Output = Result<BedTool>;

    fn add(self, other: &BedTool) -> Result<BedTool> {
        self.intersect(other, Options::new().flag("u"))
    }
}

/// `a - b`: features of `a` not overlapping `b` (intersect `-v`).
impl Sub<&BedTool> for &BedTool {
    type Output = Result<BedTool>;

    fn sub(self, other: &BedTool) -> Result<BedTool> {
        self.intersect(other, Options::new().flag("v"))
    }
}

/// Content equality; a missing or unreadable file is never equal.
impl PartialEq for BedTool {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other).unwrap_or(false)
    }
}

impl fmt::Display for BedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return write!(f, "MISSING FILE: {}", self.path().display());
        }
        let file = File::open(self.path()).map_err(|_| fmt::Error)?;
        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).map_err(|_| fmt::Error)? == 0 {
                return Ok(());
            }
            f.write_str(&String::from_utf8_lossy(&line))?;
        }
    }
}

impl fmt::Debug for BedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            write!(f, "<BedTool(MISSING FILE: {})>", self.path().display())
        } else {
            write!(f, "<BedTool({})>", self.path().display())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn session_in(dir: &Path) -> Session {
        Session::new(
            Config::builder()
                .temp_dir(dir)
                .executable("no-such-bedtools-here")
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_helpers_run_in_process() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();

        assert_eq!(a.count().unwrap(), 4);
        assert_eq!(a.lengths().unwrap(), vec![99, 100, 350, 50]);
        assert_eq!(a.head(1).unwrap(), "chr1\t1\t100\tfeature1\t0\t+\n");
        let names: Vec<String> = a
            .features()
            .unwrap()
            .map(|f| f.unwrap().name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["feature1", "feature2", "feature3", "feature4"]);
    }

    #[test]
    fn test_feature_centers() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.from_string("chr1 1 100\nchr5 3000 4000\n").unwrap();
        let centers = a.feature_centers(1).unwrap();
        assert_eq!(centers.to_string(), "chr1\t50\t51\nchr5\t3500\t3501\n");
        assert!(centers.is_temporary());

        let history = centers.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, "feature_centers");
        assert_eq!(history[0].parents, vec![a.id()]);
    }

    #[test]
    fn test_random_subset_is_reproducible_and_ordered() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();

        let first = a.random_subset(2, Some(42)).unwrap();
        let second = a.random_subset(2, Some(42)).unwrap();
        assert_eq!(first.count().unwrap(), 2);
        assert!(first == second);

        let starts: Vec<u64> = first.features().unwrap().map(|f| f.unwrap().start()).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);

        assert_eq!(a.random_subset(4, None).unwrap(), a);
        assert!(matches!(
            a.random_subset(5, Some(1)),
            Err(BedToolsError::Configuration(_))
        ));
    }

    #[test]
    fn test_equality_is_by_content() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();
        let text = std::fs::read_to_string(a.path()).unwrap();
        let copy = session.from_string(&text).unwrap();
        let other = session.example_bedtool("b.bed").unwrap();

        assert!(a == copy);
        assert!(a != other);
        assert!(a == a.clone());
    }

    #[test]
    fn test_missing_backing_file() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let lit = session.from_string("chr1\t1\t100\n").unwrap();
        std::fs::remove_file(lit.path()).unwrap();

        assert!(lit.is_missing());
        assert!(lit.to_string().starts_with("MISSING FILE:"));
        assert!(format!("{lit:?}").starts_with("<BedTool(MISSING FILE:"));
        assert!(matches!(lit.count(), Err(BedToolsError::MissingFile(_))));
        assert!(matches!(lit.merge(Options::new()), Err(BedToolsError::MissingFile(_))));
        assert!(lit != lit.clone());
    }

    #[test]
    fn test_display_is_file_content() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let lit = session.from_string("track name=x\nchr1 1 2\n# note\nchr1\t5\t9\n").unwrap();
        assert_eq!(lit.to_string(), "track name=x\nchr1 1 2\n# note\nchr1\t5\t9\n");
        assert_eq!(lit.to_string(), std::fs::read_to_string(lit.path()).unwrap());
        assert_eq!(lit.head(5).unwrap(), "chr1\t1\t2\nchr1\t5\t9\n");

        let a = session.example_bedtool("a.bed").unwrap();
        let spaced = session
            .from_string(&std::fs::read_to_string(a.path()).unwrap().replace('\t', " "))
            .unwrap();
        assert!(a != spaced);
        assert_ne!(a.to_string(), spaced.to_string());
    }

    #[test]
    fn test_count_matches_iteration() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        for text in ["", "\n\n", "# comment\ntrack name=x\nbrowser position chr1\n"] {
            let bt = session.from_string(text).unwrap();
            assert_eq!(bt.count().unwrap(), 0, "{text:?}");
            assert_eq!(bt.features().unwrap().count(), 0, "{text:?}");
            assert_eq!(bt.to_string(), std::fs::read_to_string(bt.path()).unwrap());
        }

        let a = session.example_bedtool("a.bed").unwrap();
        assert_eq!(a.count().unwrap(), a.features().unwrap().count());
        assert_eq!(a.count().unwrap(), 4);
    }

    #[test]
    fn test_genome_required_before_running() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();
        let before = session.tracked_files().len();

        let err = a.slop(Options::new().set("b", 100), None).unwrap_err();
        assert!(matches!(err, BedToolsError::MissingGenome(ref op) if op == "slop"));
        assert_eq!(session.tracked_files().len(), before);
    }

    #[test]
    fn test_empty_genome_is_rejected() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();

        let err = a
            .slop(Options::new().set("b", 100), Some(Genome::from(ChromSizes::new())))
            .unwrap_err();
        assert!(matches!(err, BedToolsError::MissingGenome(ref op) if op == "slop"));
        assert!(session.tracked_files().is_empty());

        let empty = dir.path().join("empty.genome");
        std::fs::write(&empty, "").unwrap();
        let mut b = session.example_bedtool("b.bed").unwrap();
        b.set_chrom_sizes(empty).unwrap();
        assert!(matches!(
            b.complement(Options::new(), None),
            Err(BedToolsError::MissingGenome(_))
        ));
        assert!(session.tracked_files().is_empty());
    }

    #[test]
    fn test_failed_run_leaves_no_output() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();

        let err = a.merge(Options::new()).unwrap_err();
        assert!(matches!(err, BedToolsError::Installation { .. }));
        assert!(session.tracked_files().is_empty());
    }

    #[test]
    fn test_run_by_name() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());
        let a = session.example_bedtool("a.bed").unwrap();

        assert!(matches!(
            a.run("rm", None, Options::new()),
            Err(BedToolsError::DisallowedProgram(_))
        ));
        assert!(matches!(
            a.run("feature_centers", None, Options::new()),
            Err(BedToolsError::Configuration(_))
        ));
        assert!(matches!(
            a.run("intersect", None, Options::new()),
            Err(BedToolsError::Configuration(_))
        ));
    }

    #[test]
    fn test_centered_non_bed_formats() {
        let gff = Feature::parse("chr2L\tFlyBase\tgene\t101\t200\t.\t+\t.\tName=abc").unwrap();
        assert_eq!(centered(&gff, 10), "chr2L\t145\t155\tabc\t.\t+");
    }
}
