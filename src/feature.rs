//! Record Iterator / Parser
//!
//! Reads a dataset's backing file lazily, line by line. Blank lines, comment
//! lines and UCSC `track`/`browser` directives are skipped; every other line is
//! split on whitespace runs and parsed into a [`Feature`].

use crate::error::{BedToolsError, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Layout a feature line was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFormat {
    /// 0-based half-open `chrom start stop [name score strand ...]`
    Bed,
    /// 9-column GFF/GTF with 1-based inclusive coordinates
    Gff,
    /// `chrom pos id ref alt ...` with a 1-based position
    Vcf,
}

/// One genomic interval record.
///
/// Coordinates are always exposed 0-based half-open regardless of the file
/// format; the original fields are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    fields: Vec<String>,
    format: FeatureFormat,
    start: u64,
    stop: u64,
}

impl Feature {
    /// Parse one data line.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if fields.len() < 3 {
            return Err(format!(
                "expected at least 3 fields, found {}",
                fields.len()
            ));
        }

        let int = |i: usize| fields.get(i).and_then(|f| f.parse::<u64>().ok());

        if fields.len() >= 9 && is_strand(&fields[6]) {
            if let (Some(start), Some(stop)) = (int(3), int(4)) {
                return Ok(Feature {
                    start: start.saturating_sub(1),
                    stop,
                    format: FeatureFormat::Gff,
                    fields,
                });
            }
        }

        if fields.len() >= 5 && int(2).is_none() {
            if let Some(pos) = int(1) {
                let start = pos.saturating_sub(1);
                return Ok(Feature {
                    start,
                    stop: start + fields[3].len() as u64,
                    format: FeatureFormat::Vcf,
                    fields,
                });
            }
        }

        let start = int(1).ok_or_else(|| format!("invalid start '{}'", fields[1]))?;
        let stop = int(2).ok_or_else(|| format!("invalid stop '{}'", fields[2]))?;
        Ok(Feature {
            fields,
            format: FeatureFormat::Bed,
            start,
            stop,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.fields[0]
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn length(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    pub fn format(&self) -> FeatureFormat {
        self.format
    }

    pub fn name(&self) -> Option<&str> {
        match self.format {
            FeatureFormat::Bed => self.field(3),
            FeatureFormat::Gff => self.attribute("Name").or_else(|| self.attribute("ID")),
            FeatureFormat::Vcf => self.field(2),
        }
    }

    pub fn score(&self) -> Option<&str> {
        match self.format {
            FeatureFormat::Bed => self.field(4),
            FeatureFormat::Gff | FeatureFormat::Vcf => self.field(5),
        }
    }

    pub fn strand(&self) -> Option<&str> {
        match self.format {
            FeatureFormat::Bed => self.field(5),
            FeatureFormat::Gff => self.field(6),
            FeatureFormat::Vcf => None,
        }
    }

    /// Raw field by 0-based column.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    // GFF3 `key=value;` or GTF `key "value";`
    fn attribute(&self, key: &str) -> Option<&str> {
        let attrs = self.field(8)?;
        attrs.split(';').map(str::trim).find_map(|kv| {
            let (k, v) = kv.split_once('=').or_else(|| kv.split_once(' '))?;
            (k.trim() == key).then(|| v.trim().trim_matches('"'))
        })
    }
}

fn is_strand(s: &str) -> bool {
    matches!(s, "+" | "-" | "." | "?")
}

/// Tab-delimited rendering of the fields, without a trailing newline.
impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join("\t"))
    }
}

/// True for lines that carry a record.
pub fn is_data_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        None => false,
        Some(first) => !(first.starts_with('#') || first == "track" || first == "browser"),
    }
}

/// Collapse whitespace runs into single tabs.
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join("\t")
}

/// Retained lines of a file, normalised, in file order.
pub struct DataLines {
    reader: BufReader<File>,
    path: PathBuf,
    line_no: usize,
    buf: String,
}

impl DataLines {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BedToolsError::MissingFile(path.to_path_buf()),
            _ => BedToolsError::IoError(e),
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            line_no: 0,
            buf: String::new(),
        })
    }

    fn next_line(&mut self) -> Option<Result<(usize, String)>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    if is_data_line(&self.buf) {
                        return Some(Ok((self.line_no, normalize_line(&self.buf))));
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

impl Iterator for DataLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().map(|r| r.map(|(_, line)| line))
    }
}

/// Lazy iterator over the features of a file.
///
/// Yields one item per retained line; a line that fails to parse yields an
/// `Err` rather than ending the iteration.
pub struct Features {
    lines: DataLines,
}

impl Features {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            lines: DataLines::open(path)?,
        })
    }
}

impl Iterator for Features {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line_no, line) = match self.lines.next_line()? {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        Some(Feature::parse(&line).map_err(|message| BedToolsError::Parse {
            path: self.lines.path.clone(),
            line: line_no,
            message,
        }))
    }
}
