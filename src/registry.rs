//! Temp Resource Registry
//!
//! Tracks every temporary file a session creates, in creation order, and the
//! caller-owned inputs it has seen. Only files tagged as created here are ever
//! deleted.
//!
//! Liveness is answered through weak references: a live [`BedTool`] owns an
//! `Arc<BackingFile>` and the registry keeps a `Weak` to it, so a file is in
//! use exactly as long as some handle (or clone of one) still exists.
//!
//! Every temp path a registry tracks is also claimed in a process-wide set, so
//! the stray sweep of one session never touches files another live session
//! in the same process still tracks.
//!
//! [`BedTool`]: crate::BedTool

use crate::error::{BedToolsError, Result};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

// Temp paths tracked by any registry alive in this process.
fn claimed_paths() -> MutexGuard<'static, HashSet<PathBuf>> {
    static CLAIMED: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    CLAIMED
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// A file backing one or more dataset handles.
#[derive(Debug)]
pub struct BackingFile {
    pub path: PathBuf,
    pub temporary: bool,
}

/// How the registry knows a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Created by this registry, eligible for deletion
    Temporary,
    /// Supplied by the caller, never deleted
    External,
    Untracked,
}

#[derive(Debug)]
struct TempEntry {
    path: PathBuf,
    order: u64,
    owner: Weak<BackingFile>,
}

/// Session-scoped record of temporary files.
#[derive(Debug)]
pub struct TempRegistry {
    dir: Option<PathBuf>,
    prefix: String,
    suffix: String,
    entries: Vec<TempEntry>,
    external: HashSet<PathBuf>,
    next_order: u64,
}

impl TempRegistry {
    /// Create a registry. `dir` is validated lazily unless set through
    /// [`set_temp_dir`](Self::set_temp_dir).
    pub fn new(dir: Option<PathBuf>, prefix: &str, suffix: &str) -> Self {
        Self {
            dir,
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            entries: Vec::new(),
            external: HashSet::new(),
            next_order: 0,
        }
    }

    /// Point future temp files at `path`, which must already exist.
    pub fn set_temp_dir(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(BedToolsError::Configuration(format!(
                "temp directory {} does not exist",
                path.display()
            )));
        }
        self.dir = Some(std::fs::canonicalize(path)?);
        Ok(())
    }

    /// The session temp directory, established on first need.
    pub fn temp_dir(&mut self) -> Result<PathBuf> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::temp_dir(),
        };
        if !dir.is_dir() {
            return Err(BedToolsError::Configuration(format!(
                "temp directory {} does not exist",
                dir.display()
            )));
        }
        let dir = std::fs::canonicalize(&dir)?;
        self.dir = Some(dir.clone());
        Ok(dir)
    }

    /// Atomically create a uniquely named empty file and record it.
    pub fn create_temp_file(&mut self) -> Result<PathBuf> {
        let dir = self.temp_dir()?;
        let file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(&self.suffix)
            .rand_bytes(12)
            .tempfile_in(&dir)?;
        let (_, path) = file.keep()?;
        claimed_paths().insert(path.clone());

        self.entries.push(TempEntry {
            path: path.clone(),
            order: self.next_order,
            owner: Weak::new(),
        });
        self.next_order += 1;
        log::debug!("Created temp file {}", path.display());
        Ok(path)
    }

    /// Create a temp file and hand out its backing handle in one step.
    ///
    /// The file is live from the moment it exists, so a concurrent
    /// `cleanup(false)` cannot remove it while a program is still writing it.
    pub(crate) fn create_backed_file(&mut self) -> Result<Arc<BackingFile>> {
        let path = self.create_temp_file()?;
        Ok(self.backing_for(&path))
    }

    /// Record a caller-owned path. It is never deleted by this registry.
    pub fn register_external(&mut self, path: &Path) {
        if self.tracking(path) != Tracking::Temporary {
            self.external.insert(path.to_path_buf());
        }
    }

    pub fn tracking(&self, path: &Path) -> Tracking {
        if self.entries.iter().any(|e| e.path == path) {
            Tracking::Temporary
        } else if self.external.contains(path) {
            Tracking::External
        } else {
            Tracking::Untracked
        }
    }

    /// Hand out the shared backing handle for `path`, creating and recording
    /// one if no live handle exists yet.
    pub(crate) fn backing_for(&mut self, path: &Path) -> Arc<BackingFile> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            if let Some(live) = entry.owner.upgrade() {
                return live;
            }
            let backing = Arc::new(BackingFile {
                path: path.to_path_buf(),
                temporary: true,
            });
            entry.owner = Arc::downgrade(&backing);
            return backing;
        }

        self.register_external(path);
        Arc::new(BackingFile {
            path: path.to_path_buf(),
            temporary: false,
        })
    }

    /// True if a live dataset handle still points at `path`.
    pub fn is_live(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == path && e.owner.strong_count() > 0)
    }

    /// Temp files in creation order.
    pub fn tracked_files(&self) -> Vec<PathBuf> {
        let mut entries: Vec<&TempEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.order);
        entries.into_iter().map(|e| e.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete one temp file and forget it.
    ///
    /// Refuses any path not created by this registry. Returns whether a file
    /// was actually removed from disk.
    pub fn remove_temporary(&mut self, path: &Path) -> Result<bool> {
        let Some(pos) = self.entries.iter().position(|e| e.path == path) else {
            return Err(BedToolsError::Configuration(format!(
                "refusing to delete {}: not a temp file of this session",
                path.display()
            )));
        };
        let entry = self.entries.remove(pos);
        claimed_paths().remove(&entry.path);
        remove_quietly(&entry.path)
    }

    /// Delete temp files.
    ///
    /// With `remove_all == false` only files no live handle points at are
    /// removed. With `remove_all == true` every tracked temp file goes, plus
    /// stray files in the temp directory that follow this session's naming
    /// convention and are not tracked by another live registry. Caller-supplied
    /// files are never touched.
    ///
    /// Returns the paths removed from disk.
    pub fn cleanup(&mut self, remove_all: bool) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        let mut kept = Vec::new();

        self.entries.sort_by_key(|e| e.order);
        for entry in std::mem::take(&mut self.entries) {
            if !remove_all && entry.owner.strong_count() > 0 {
                kept.push(entry);
                continue;
            }
            claimed_paths().remove(&entry.path);
            if remove_quietly(&entry.path)? {
                removed.push(entry.path);
            }
        }
        self.entries = kept;

        if remove_all {
            let dir = self.temp_dir()?;
            for entry in std::fs::read_dir(&dir)?.flatten() {
                let path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if !name.starts_with(&self.prefix) || !name.ends_with(&self.suffix) {
                    continue;
                }
                if self.external.contains(&path) || !path.is_file() {
                    continue;
                }
                if claimed_paths().contains(&path) {
                    continue;
                }
                if remove_quietly(&path)? {
                    log::debug!("Removed stray temp file {}", path.display());
                    removed.push(path);
                }
            }
        }

        log::debug!("Cleanup removed {} file(s)", removed.len());
        Ok(removed)
    }
}

impl Drop for TempRegistry {
    fn drop(&mut self) {
        // Files left behind (e.g. `keep_tempfiles`) become strays for later sweeps
        let mut claimed = claimed_paths();
        for entry in &self.entries {
            claimed.remove(&entry.path);
        }
    }
}

fn remove_quietly(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry_in(dir: &Path) -> TempRegistry {
        let mut registry = TempRegistry::new(None, "unit.", ".tmp");
        registry.set_temp_dir(dir).unwrap();
        registry
    }

    #[test]
    fn test_set_temp_dir_must_exist() {
        let mut registry = TempRegistry::new(None, "unit.", ".tmp");
        let err = registry.set_temp_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, BedToolsError::Configuration(_)));
    }

    #[test]
    fn test_temp_files_are_unique_and_follow_naming() {
        let dir = tempdir().unwrap();
        let mut registry = registry_in(dir.path());

        let a = registry.create_temp_file().unwrap();
        let b = registry.create_temp_file().unwrap();
        assert_ne!(a, b);
        for p in [&a, &b] {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("unit.") && name.ends_with(".tmp"), "{name}");
            assert!(p.exists());
        }
        assert_eq!(registry.tracked_files(), vec![a, b]);
    }

    #[test]
    fn test_cleanup_respects_liveness() {
        let dir = tempdir().unwrap();
        let mut registry = registry_in(dir.path());

        let held = registry.create_temp_file().unwrap();
        let dropped = registry.create_temp_file().unwrap();
        let handle = registry.backing_for(&held);
        drop(registry.backing_for(&dropped));

        let removed = registry.cleanup(false).unwrap();
        assert_eq!(removed, vec![dropped.clone()]);
        assert!(held.exists());
        assert!(!dropped.exists());
        assert_eq!(registry.tracking(&held), Tracking::Temporary);

        drop(handle);
        registry.cleanup(false).unwrap();
        assert!(!held.exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_all_sweeps_strays_but_not_external() {
        let dir = tempdir().unwrap();
        let mut registry = registry_in(dir.path());
        let canon = std::fs::canonicalize(dir.path()).unwrap();

        let stray = canon.join("unit.TESTING.tmp");
        std::fs::write(&stray, "").unwrap();
        let unrelated = canon.join("keep.me.tmp");
        std::fs::write(&unrelated, "").unwrap();
        let caller = canon.join("unit.caller.tmp");
        std::fs::write(&caller, "chr1\t1\t2\n").unwrap();
        let _caller_handle = registry.backing_for(&caller);

        let tmp = registry.create_temp_file().unwrap();
        let _live = registry.backing_for(&tmp);

        registry.cleanup(false).unwrap();
        assert!(stray.exists());
        assert!(tmp.exists());

        registry.cleanup(true).unwrap();
        assert!(!stray.exists());
        assert!(!tmp.exists());
        assert!(unrelated.exists());
        assert!(caller.exists());
    }

    #[test]
    fn test_sweep_spares_files_of_other_live_registries() {
        let dir = tempdir().unwrap();
        let mut first = registry_in(dir.path());
        let mut second = registry_in(dir.path());

        let theirs = second.create_temp_file().unwrap();
        let _handle = second.backing_for(&theirs);
        let ours = first.create_temp_file().unwrap();

        first.cleanup(true).unwrap();
        assert!(!ours.exists());
        assert!(theirs.exists());
        assert_eq!(second.tracking(&theirs), Tracking::Temporary);

        // Once its owner is gone the file is an ordinary stray
        drop(second);
        first.cleanup(true).unwrap();
        assert!(!theirs.exists());
    }

    #[test]
    fn test_backed_file_is_live_from_creation() {
        let dir = tempdir().unwrap();
        let mut registry = registry_in(dir.path());

        let backing = registry.create_backed_file().unwrap();
        assert!(backing.temporary);
        assert!(registry.is_live(&backing.path));
        registry.cleanup(false).unwrap();
        assert!(backing.path.exists());

        let path = backing.path.clone();
        drop(backing);
        assert_eq!(registry.cleanup(false).unwrap(), vec![path]);
    }

    #[test]
    fn test_remove_temporary_refuses_external() {
        let dir = tempdir().unwrap();
        let mut registry = registry_in(dir.path());
        let input = dir.path().join("input.bed");
        std::fs::write(&input, "chr1\t1\t2\n").unwrap();
        registry.register_external(&input);

        assert!(registry.remove_temporary(&input).is_err());
        assert!(input.exists());

        let tmp = registry.create_temp_file().unwrap();
        std::fs::remove_file(&tmp).unwrap();
        // already gone is fine
        assert!(!registry.remove_temporary(&tmp).unwrap());
    }
}
