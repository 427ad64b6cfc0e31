//! Install target resolution: prefix, interpreter and Python version.
//!
//! Explicit flags (or their `WHEELHOUSE_*` env fallbacks) win; otherwise the
//! active virtualenv and the `python3` on `PATH` decide.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use wheelhouse_core::paths::default_prefix;

/// Where and for which Python a wheel is installed.
#[derive(Debug, Clone)]
pub struct InstallTarget {
    pub prefix: PathBuf,
    pub interpreter: String,
    pub python_version: String,
}

impl InstallTarget {
    /// Fill in whatever the caller left unset.
    pub fn resolve(
        prefix: Option<PathBuf>,
        interpreter: Option<String>,
        python_version: Option<String>,
    ) -> Result<Self> {
        let prefix = std::path::absolute(prefix.unwrap_or_else(default_prefix))
            .context("Failed to resolve install prefix")?;

        let interpreter = match interpreter {
            Some(interpreter) => interpreter,
            None => find_interpreter(&prefix)?,
        };

        let python_version = match python_version {
            Some(version) => version,
            None => query_python_version(&interpreter)?,
        };
        if !is_major_minor(&python_version) {
            bail!("Invalid Python version '{python_version}', expected X.Y (e.g. 3.12)");
        }

        tracing::debug!(
            prefix = %prefix.display(),
            interpreter = %interpreter,
            python_version = %python_version,
            "Resolved install target"
        );

        Ok(Self {
            prefix,
            interpreter,
            python_version,
        })
    }
}

/// The prefix's own `bin/python` if it has one, else `python3` on `PATH`.
fn find_interpreter(prefix: &Path) -> Result<String> {
    let local = prefix.join("bin").join("python");
    if local.is_file() {
        return Ok(local.to_string_lossy().into_owned());
    }
    let found = which::which("python3")
        .or_else(|_| which::which("python"))
        .context("No Python interpreter found. Pass --interpreter or set WHEELHOUSE_INTERPRETER")?;
    Ok(found.to_string_lossy().into_owned())
}

fn query_python_version(interpreter: &str) -> Result<String> {
    let output = Command::new(interpreter)
        .args([
            "-c",
            "import sys; print('{}.{}'.format(*sys.version_info[:2]))",
        ])
        .output()
        .with_context(|| format!("Failed to run {interpreter}"))?;
    if !output.status.success() {
        bail!(
            "{interpreter} exited with {} while querying its version. Pass --python-version",
            output.status
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn is_major_minor(version: &str) -> bool {
    version.split_once('.').is_some_and(|(major, minor)| {
        !major.is_empty()
            && !minor.is_empty()
            && major.chars().all(|c| c.is_ascii_digit())
            && minor.chars().all(|c| c.is_ascii_digit())
    })
}
