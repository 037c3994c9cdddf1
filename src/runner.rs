//! Subprocess runner for bedtools programs
//!
//! The [`Invoker`] validates a program name against the whitelist, marshals
//! options into flags, runs `bedtools <subcommand> ...` with stdout redirected
//! into the output file and classifies failures.

use crate::binary_finder::find_binary;
use crate::config::Config;
use crate::error::{BedToolsError, Result};
use crate::options::Options;
use crate::programs;
use std::ffi::OsString;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

/// Location and version of a verified toolkit installation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitInfo {
    pub path: PathBuf,
    pub version: Option<String>,
}

/// Validates, marshals and executes whitelisted bedtools programs.
///
/// The installation is checked on first use and cached; call
/// [`check_installation`](Invoker::check_installation) with `force` to
/// re-check.
#[derive(Debug)]
pub struct Invoker {
    executable: String,
    search_dir: Option<PathBuf>,
    verbose: bool,
    installation: Mutex<Option<ToolkitInfo>>,
}

impl Invoker {
    pub fn new(config: &Config) -> Self {
        Self {
            executable: config.executable.clone(),
            search_dir: config.bedtools_dir.clone(),
            verbose: config.verbose,
            installation: Mutex::new(None),
        }
    }

    /// Locate the toolkit and confirm it starts.
    ///
    /// The result is cached; `force` discards the cache first.
    pub fn check_installation(&self, force: bool) -> Result<ToolkitInfo> {
        let mut cached = self
            .installation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !force {
            if let Some(info) = cached.as_ref() {
                return Ok(info.clone());
            }
        }
        *cached = None;

        let path = find_binary(&self.executable, self.search_dir.as_deref())?;
        let output = Command::new(&path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BedToolsError::Installation {
                toolkit: self.executable.clone(),
                reason: format!("failed to start {}: {e}", path.display()),
            })?;

        if !output.status.success() {
            return Err(BedToolsError::Installation {
                toolkit: self.executable.clone(),
                reason: format!(
                    "{} --version exited with {:?}",
                    path.display(),
                    output.status.code()
                ),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        log::debug!("Using {} ({:?})", path.display(), version);

        let info = ToolkitInfo { path, version };
        *cached = Some(info.clone());
        Ok(info)
    }

    /// Build the argument vector for a call without running it.
    ///
    /// Fails with `DisallowedProgram` for names outside the whitelist.
    pub fn command_line(
        &self,
        program: &str,
        args: &[OsString],
        options: &Options,
    ) -> Result<Vec<OsString>> {
        let subcommand = programs::resolve(program)
            .ok_or_else(|| BedToolsError::DisallowedProgram(program.to_string()))?;
        let mut argv = Vec::with_capacity(1 + args.len() + options.len() * 2);
        argv.push(OsString::from(subcommand));
        argv.extend(args.iter().cloned());
        argv.extend(options.to_os_args());
        Ok(argv)
    }

    /// Run `program` with stdout written to `output`.
    ///
    /// # Errors
    /// - `DisallowedProgram` before anything is spawned
    /// - `Installation` if the toolkit cannot be found or started
    /// - `CommandExecution` on a nonzero exit, carrying argv and stderr
    pub fn invoke(
        &self,
        program: &str,
        args: &[OsString],
        options: &Options,
        output: &Path,
    ) -> Result<PathBuf> {
        let argv = self.command_line(program, args, options)?;
        let toolkit = self.check_installation(false)?;

        let stdout = File::create(output)?;
        let mut cmd = Command::new(&toolkit.path);
        cmd.args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped());

        if self.verbose {
            log::info!("Executing: {cmd:?} > {}", output.display());
        } else {
            log::debug!("Executing: {cmd:?} > {}", output.display());
        }

        let result = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => BedToolsError::Installation {
                toolkit: self.executable.clone(),
                reason: format!("failed to run {}: {e}", toolkit.path.display()),
            },
            _ => BedToolsError::IoError(e),
        })?;

        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
        if !result.status.success() {
            let mut args = vec![toolkit.path.to_string_lossy().into_owned()];
            args.extend(argv.iter().map(|a| a.to_string_lossy().into_owned()));
            return Err(BedToolsError::CommandExecution {
                program: program.to_string(),
                args,
                code: result.status.code(),
                stderr,
            });
        }

        if !stderr.trim().is_empty() {
            log::warn!("{program}: {}", stderr.trim());
        }

        Ok(output.to_path_buf())
    }
}
