#![allow(dead_code)]

use bedtools_rs::{Config, Session};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

// Stand-in for the real toolkit: echoes its input file, fails on `-fail`
// and touches the path after `-touch` so tests can see whether it ran.
const FAKE_BEDTOOLS: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "bedtools v2.31.1"; exit 0; fi
sub="$1"; shift
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    -fail) echo "***** ERROR: simulated $sub failure" >&2; exit 1 ;;
    -touch) touch "$2"; shift ;;
    -a|-i|-bed) input="$2"; shift ;;
  esac
  shift
done
if [ -n "$input" ]; then cat "$input"; fi
"#;

static FAKE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Directory holding the fake `bedtools`, written once per test binary.
#[cfg(unix)]
pub fn fake_bedtools_dir() -> &'static Path {
    FAKE_DIR.get_or_init(|| {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("fake-bedtools-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let script = dir.join("bedtools");
        std::fs::write(&script, FAKE_BEDTOOLS).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        dir
    })
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A session running the fake toolkit with temp files in a fresh directory.
#[cfg(unix)]
pub fn fake_session() -> (Session, TempDir) {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::builder()
        .temp_dir(dir.path())
        .bedtools_dir(fake_bedtools_dir())
        .build();
    (Session::new(config).unwrap(), dir)
}

/// A session using whatever `bedtools` is on `PATH`, or None if there is none.
pub fn real_session() -> Option<(Session, TempDir)> {
    init_logging();
    if which::which("bedtools").is_err() {
        eprintln!("bedtools not found on PATH, skipping");
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = Config::builder().temp_dir(dir.path()).build();
    Some((Session::new(config).unwrap(), dir))
}

pub fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}
