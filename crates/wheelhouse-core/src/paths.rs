//! Scheme directory layouts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use wheelhouse_schema::Scheme;

/// Prefix used when no virtual environment is active.
pub const SYSTEM_PREFIX: &str = "/usr/local";

/// Directory for each scheme an installation may write to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeLayout {
    dirs: BTreeMap<Scheme, PathBuf>,
}

impl SchemeLayout {
    /// An empty layout; add schemes with [`with_override`](Self::with_override).
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard POSIX layout below `prefix`.
    ///
    /// `python_version` is the `X.Y` form (`3.12`). `distribution` names the
    /// headers subdirectory.
    pub fn for_prefix(prefix: &Path, python_version: &str, distribution: &str) -> Self {
        let site_packages = prefix
            .join("lib")
            .join(format!("python{python_version}"))
            .join("site-packages");

        Self::new()
            .with_override(Scheme::PURELIB, site_packages.clone())
            .with_override(Scheme::PLATLIB, site_packages)
            .with_override(
                Scheme::HEADERS,
                prefix
                    .join("include")
                    .join(format!("python{python_version}"))
                    .join(distribution),
            )
            .with_override(Scheme::SCRIPTS, prefix.join("bin"))
            .with_override(Scheme::DATA, prefix.to_path_buf())
    }

    /// Set (or add) the directory for `scheme`.
    #[must_use]
    pub fn with_override(mut self, scheme: Scheme, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(scheme, dir.into());
        self
    }

    /// Directory for `scheme`, if configured.
    pub fn get(&self, scheme: &Scheme) -> Option<&Path> {
        self.dirs.get(scheme).map(PathBuf::as_path)
    }

    /// Configured schemes, sorted by name.
    pub fn schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.dirs.keys()
    }
}

/// Default install prefix: the active virtualenv, else [`SYSTEM_PREFIX`].
pub fn default_prefix() -> PathBuf {
    match std::env::var_os("VIRTUAL_ENV") {
        Some(venv) if !venv.is_empty() => PathBuf::from(venv),
        _ => PathBuf::from(SYSTEM_PREFIX),
    }
}

/// Lexical path from `from_dir` to `to_path`.
///
/// Neither path is touched on disk; both should be absolute or both
/// relative to the same base.
pub fn relative_path(from_dir: &Path, to_path: &Path) -> PathBuf {
    let from_components: Vec<_> = from_dir.components().collect();
    let to_components: Vec<_> = to_path.components().collect();

    let common_len = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common_len..from_components.len() {
        result.push("..");
    }
    for part in &to_components[common_len..] {
        result.push(part);
    }
    result
}
