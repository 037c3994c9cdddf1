//! Lineage Tracker
//!
//! An append-only arena of dataset records. Each record stores the file it
//! refers to, whether that file is temporary, and (for derived datasets) the
//! operation, options and parent handles that produced it. Parents are always
//! created before their children, so handles only ever point backwards.

use crate::options::Options;
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Identity of a dataset within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetId(usize);

impl DatasetId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One operation in a dataset's history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStep {
    pub operation: String,
    pub options: Options,
    pub parents: Vec<DatasetId>,
    pub result: DatasetId,
    /// Backing file of the result at the time it was created
    pub path: PathBuf,
}

impl fmt::Display for HistoryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parents: Vec<String> = self.parents.iter().map(|p| p.to_string()).collect();
        write!(f, "{} = {}({})", self.result, self.operation, parents.join(", "))?;
        if !self.options.is_empty() {
            write!(f, " [{}]", self.options)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Node {
    path: PathBuf,
    temporary: bool,
    step: Option<(String, Options)>,
    parents: Vec<DatasetId>,
}

/// Arena of every dataset record created in a session.
#[derive(Debug, Default)]
pub struct Lineage {
    nodes: Vec<Node>,
}

impl Lineage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dataset that no operation produced (a file or literal input).
    pub fn add_root(&mut self, path: &Path, temporary: bool) -> DatasetId {
        self.push(Node {
            path: path.to_path_buf(),
            temporary,
            step: None,
            parents: Vec::new(),
        })
    }

    /// Record a dataset produced by `operation` from `parents`.
    pub fn add_derived(
        &mut self,
        path: &Path,
        temporary: bool,
        operation: &str,
        options: Options,
        parents: Vec<DatasetId>,
    ) -> DatasetId {
        let next = self.nodes.len();
        let parents = parents.into_iter().filter(|p| p.0 < next).collect();
        self.push(Node {
            path: path.to_path_buf(),
            temporary,
            step: Some((operation.to_string(), options)),
            parents,
        })
    }

    fn push(&mut self, node: Node) -> DatasetId {
        self.nodes.push(node);
        DatasetId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn path(&self, id: DatasetId) -> Option<&Path> {
        self.nodes.get(id.0).map(|n| n.path.as_path())
    }

    pub fn parents(&self, id: DatasetId) -> &[DatasetId] {
        self.nodes.get(id.0).map(|n| n.parents.as_slice()).unwrap_or(&[])
    }

    /// `id` and everything it descends from.
    ///
    /// The walk visits each record at most once and only follows handles that
    /// point to older records, so it terminates even on a corrupted arena.
    fn reachable(&self, id: DatasetId) -> BTreeSet<DatasetId> {
        let mut seen = BTreeSet::new();
        if id.0 >= self.nodes.len() {
            return seen;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for parent in &self.nodes[current.0].parents {
                if parent.0 < current.0 {
                    stack.push(*parent);
                }
            }
        }
        seen
    }

    /// Every operation that contributed to `id`, oldest first, ending with the
    /// step that created `id` itself.
    pub fn history(&self, id: DatasetId) -> Vec<HistoryStep> {
        self.reachable(id)
            .into_iter()
            .filter_map(|node_id| {
                let node = &self.nodes[node_id.0];
                node.step.as_ref().map(|(operation, options)| HistoryStep {
                    operation: operation.clone(),
                    options: options.clone(),
                    parents: node.parents.clone(),
                    result: node_id,
                    path: node.path.clone(),
                })
            })
            .collect()
    }

    /// Backing files of temporary ancestors of `id`, newest first.
    ///
    /// `id` itself is excluded, and so is any ancestor sharing its path.
    pub fn temporary_ancestors(&self, id: DatasetId) -> Vec<PathBuf> {
        let Some(own) = self.nodes.get(id.0) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = Vec::new();
        for ancestor in self.reachable(id).into_iter().rev() {
            if ancestor == id {
                continue;
            }
            let node = &self.nodes[ancestor.0];
            if node.temporary && node.path != own.path && !paths.contains(&node.path) {
                paths.push(node.path.clone());
            }
        }
        paths
    }
}

/// Ask on the terminal whether `path` may be deleted.
///
/// Suitable as the confirmation function for
/// [`BedTool::delete_temporary_history`](crate::BedTool::delete_temporary_history).
/// Anything starting with `y` or `Y` counts as yes.
pub fn confirm_on_stdin(path: &Path) -> bool {
    eprint!("Delete temporary file {}? (y/N) ", path.display());
    let _ = io::stderr().flush();
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    answer
        .trim_start()
        .starts_with(|c: char| c.eq_ignore_ascii_case(&'y'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_accumulates_across_chain() {
        let mut lineage = Lineage::new();
        let a = lineage.add_root(Path::new("a.bed"), false);
        let b = lineage.add_root(Path::new("b.bed"), false);
        let c = lineage.add_derived(Path::new("c.tmp"), true, "intersect", Options::new(), vec![a, b]);
        let d = lineage.add_derived(Path::new("d.tmp"), true, "subtract", Options::new(), vec![c, a]);

        assert!(lineage.history(a).is_empty());
        assert_eq!(lineage.history(c).len(), 1);

        let history = lineage.history(d);
        let ops: Vec<&str> = history.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(ops, vec!["intersect", "subtract"]);
        assert_eq!(history[1].parents, vec![c, a]);
        assert_eq!(history[1].result, d);
    }

    #[test]
    fn test_shared_ancestor_counted_once() {
        let mut lineage = Lineage::new();
        let a = lineage.add_root(Path::new("a.bed"), false);
        let m = lineage.add_derived(Path::new("m.tmp"), true, "merge", Options::new(), vec![a]);
        let left = lineage.add_derived(Path::new("l.tmp"), true, "slop", Options::new(), vec![m]);
        let right = lineage.add_derived(Path::new("r.tmp"), true, "flank", Options::new(), vec![m]);
        let joined = lineage.add_derived(Path::new("j.tmp"), true, "intersect", Options::new(), vec![left, right]);

        assert_eq!(lineage.history(joined).len(), 4);
        assert_eq!(
            lineage.temporary_ancestors(joined),
            vec![PathBuf::from("r.tmp"), PathBuf::from("l.tmp"), PathBuf::from("m.tmp")]
        );
    }

    #[test]
    fn test_temporary_ancestors_skip_roots_and_self() {
        let mut lineage = Lineage::new();
        let a = lineage.add_root(Path::new("a.bed"), false);
        let lit = lineage.add_root(Path::new("lit.tmp"), true);
        let c = lineage.add_derived(Path::new("c.tmp"), true, "intersect", Options::new(), vec![a, lit]);
        let same = lineage.add_derived(Path::new("c.tmp"), true, "sequence", Options::new(), vec![c]);

        assert_eq!(lineage.temporary_ancestors(c), vec![PathBuf::from("lit.tmp")]);
        assert_eq!(lineage.temporary_ancestors(same), vec![PathBuf::from("lit.tmp")]);
    }

    #[test]
    fn test_forward_parent_handles_are_ignored() {
        let mut lineage = Lineage::new();
        let a = lineage.add_root(Path::new("a.bed"), false);
        let bogus = DatasetId(5);
        let c = lineage.add_derived(Path::new("c.tmp"), true, "merge", Options::new(), vec![a, bogus]);
        assert_eq!(lineage.parents(c), &[a]);
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes("Yes"));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }
}
