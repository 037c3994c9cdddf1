//! Chromosome sizes and the genome-size provider seam.
//!
//! Operations such as `slop` and `flank` need contig bounds. They are carried
//! as [`ChromSizes`], looked up through a [`GenomeSizeProvider`] and handed to
//! bedtools as a two-column genome file.

use crate::error::{BedToolsError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Ordered mapping from contig name to `(start, end)`.
///
/// Preserves insertion order, which is the order written to genome files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromSizes {
    sizes: HashMap<String, (u64, u64)>,
    order: Vec<String>,
}

impl ChromSizes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a contig (appends to order if new).
    pub fn insert(&mut self, chrom: impl Into<String>, start: u64, end: u64) {
        let chrom = chrom.into();
        if !self.sizes.contains_key(&chrom) {
            self.order.push(chrom.clone());
        }
        self.sizes.insert(chrom, (start, end));
    }

    pub fn get(&self, chrom: &str) -> Option<(u64, u64)> {
        self.sizes.get(chrom).copied()
    }

    /// The contig length as written to genome files.
    pub fn length(&self, chrom: &str) -> Option<u64> {
        self.get(chrom).map(|(_, end)| end)
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Load a genome file.
    ///
    /// Two columns (`chrom size`) give `(0, size)`; three columns give
    /// `(start, end)`. Blank and `#` lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut sizes = ChromSizes::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let parse = |s: &str| {
                s.parse::<u64>().map_err(|_| BedToolsError::Parse {
                    path: path.to_path_buf(),
                    line: line_num + 1,
                    message: format!("invalid chromosome size '{s}'"),
                })
            };
            match fields.as_slice() {
                [chrom, size] => sizes.insert(*chrom, 0, parse(size)?),
                [chrom, start, end, ..] => sizes.insert(*chrom, parse(start)?, parse(end)?),
                _ => {
                    return Err(BedToolsError::Parse {
                        path: path.to_path_buf(),
                        line: line_num + 1,
                        message: "genome file requires chrom and size columns".to_string(),
                    })
                }
            }
        }

        Ok(sizes)
    }

    /// Write as a bedtools genome file (`chrom<TAB>length`).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for chrom in &self.order {
            let (_, end) = self.sizes[chrom];
            writeln!(out, "{chrom}\t{end}")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ChromSizes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut sizes = ChromSizes::new();
        for (chrom, len) in iter {
            sizes.insert(chrom, 0, len);
        }
        sizes
    }
}

/// Source of chromosome sizes for a named assembly.
pub trait GenomeSizeProvider: Send + Sync {
    /// Sizes for `genome` (e.g. `"hg19"`); fails with `GenomeLookup`.
    fn chrom_sizes(&self, genome: &str) -> Result<ChromSizes>;
}

/// Reads `<dir>/<genome>.genome` or `<dir>/<genome>.chrom.sizes`.
#[derive(Debug, Clone)]
pub struct GenomeFileCache {
    dir: PathBuf,
}

impl GenomeFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, genome: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{genome}.genome")),
            self.dir.join(format!("{genome}.chrom.sizes")),
        ]
    }
}

impl GenomeSizeProvider for GenomeFileCache {
    fn chrom_sizes(&self, genome: &str) -> Result<ChromSizes> {
        let lookup_error = |reason: String| BedToolsError::GenomeLookup {
            genome: genome.to_string(),
            reason,
        };
        if genome.is_empty() || genome.contains(|c| c == '/' || c == '\\') {
            return Err(lookup_error("invalid genome identifier".to_string()));
        }

        let path = self
            .candidates(genome)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                lookup_error(format!("no cached sizes under {}", self.dir.display()))
            })?;

        let sizes = ChromSizes::from_file(&path).map_err(|e| lookup_error(e.to_string()))?;
        if sizes.is_empty() {
            return Err(lookup_error(format!("{} lists no contigs", path.display())));
        }
        Ok(sizes)
    }
}

/// Genome argument accepted by operations that need contig bounds.
#[derive(Debug, Clone)]
pub enum Genome {
    /// Assembly name resolved through the session's provider
    Named(String),
    Sizes(ChromSizes),
    /// Existing genome file
    File(PathBuf),
}

impl From<ChromSizes> for Genome {
    fn from(sizes: ChromSizes) -> Self {
        Genome::Sizes(sizes)
    }
}

impl From<&str> for Genome {
    fn from(name: &str) -> Self {
        Genome::Named(name.to_string())
    }
}

impl From<&Path> for Genome {
    fn from(path: &Path) -> Self {
        Genome::File(path.to_path_buf())
    }
}

impl From<PathBuf> for Genome {
    fn from(path: PathBuf) -> Self {
        Genome::File(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let mut sizes = ChromSizes::new();
        sizes.insert("chr2", 0, 243199373);
        sizes.insert("chr1", 1, 249250621);
        let path = dir.path().join("hg19.genome");
        sizes.write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "chr2\t243199373\nchr1\t249250621\n");

        let back = ChromSizes::from_file(&path).unwrap();
        assert_eq!(back.chromosomes().collect::<Vec<_>>(), vec!["chr2", "chr1"]);
        assert_eq!(back.get("chr1"), Some((0, 249250621)));
    }

    #[test]
    fn test_three_column_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hg17.genome");
        std::fs::write(&path, "# hg17\nchr1 1 245522847\n\n").unwrap();
        let sizes = ChromSizes::from_file(&path).unwrap();
        assert_eq!(sizes.get("chr1"), Some((1, 245522847)));
        assert_eq!(sizes.length("chr1"), Some(245522847));
    }

    #[test]
    fn test_bad_size_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.genome");
        std::fs::write(&path, "chr1\tlots\n").unwrap();
        assert!(matches!(
            ChromSizes::from_file(&path),
            Err(BedToolsError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_file_cache_lookup() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("dm3.chrom.sizes"), "chr2L\t23011544\n").unwrap();
        let cache = GenomeFileCache::new(dir.path());

        let dm3 = cache.chrom_sizes("dm3").unwrap();
        assert_eq!(dm3.length("chr2L"), Some(23011544));

        for genome in ["hg38", "../dm3", ""] {
            assert!(matches!(
                cache.chrom_sizes(genome),
                Err(BedToolsError::GenomeLookup { .. })
            ));
        }
    }
}
