//! Install into real directories, one per scheme.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use wheelhouse_schema::{
    EntryPoint, HashAlgorithm, HashingReader, RecordEntry, Scheme, write_record_file,
};

use crate::destination::WheelDestination;
use crate::install::InstallRecord;
use crate::paths::{SchemeLayout, relative_path};
use crate::script::{fix_shebang, generate_script};
use crate::{Error, Result};

/// Writes files below the directories of a [`SchemeLayout`].
#[derive(Debug, Clone)]
pub struct SchemeDictionaryDestination {
    layout: SchemeLayout,
    interpreter: String,
    hash_algorithm: HashAlgorithm,
    destdir: Option<PathBuf>,
    overwrite_existing: bool,
    installed: Vec<PathBuf>,
    records: Vec<InstallRecord>,
}

impl SchemeDictionaryDestination {
    /// Destination for `layout`; launchers and `#!python` scripts will run
    /// `interpreter`.
    pub fn new(layout: SchemeLayout, interpreter: impl Into<String>) -> Self {
        Self {
            layout,
            interpreter: interpreter.into(),
            hash_algorithm: HashAlgorithm::default(),
            destdir: None,
            overwrite_existing: false,
            installed: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Hash written files with `algorithm` instead of sha256.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Re-root every target path under `destdir` (staged installs).
    ///
    /// RECORD and shebangs still refer to the un-staged locations.
    #[must_use]
    pub fn with_destdir(mut self, destdir: impl Into<PathBuf>) -> Self {
        self.destdir = Some(destdir.into());
        self
    }

    /// Replace files that already exist instead of failing.
    #[must_use]
    pub fn overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Every file written so far, as on-disk paths.
    pub fn installed_paths(&self) -> &[PathBuf] {
        &self.installed
    }

    /// Records written to RECORD by the last finalize, in installation order.
    pub fn records(&self) -> &[InstallRecord] {
        &self.records
    }

    fn scheme_dir(&self, scheme: &Scheme) -> Result<&Path> {
        self.layout
            .get(scheme)
            .ok_or_else(|| Error::UnknownScheme(scheme.clone()))
    }

    fn target_path(&self, scheme: &Scheme, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = path.is_empty()
            || path.contains('\\')
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let target = self.scheme_dir(scheme)?.join(relative);
        Ok(match &self.destdir {
            Some(destdir) => destdir.join(target.strip_prefix("/").unwrap_or(target.as_path())),
            None => target,
        })
    }

    fn write_to_fs(
        &mut self,
        scheme: &Scheme,
        path: &str,
        reader: &mut dyn Read,
        is_executable: bool,
    ) -> Result<RecordEntry> {
        let target = self.target_path(scheme, path)?;
        if target.exists() {
            if !self.overwrite_existing {
                return Err(Error::FileExists(target));
            }
            warn!(path = %target.display(), "Overwriting existing file");
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut hashing = HashingReader::new(reader, self.hash_algorithm);
        let mut out = BufWriter::new(File::create(&target)?);
        io::copy(&mut hashing, &mut out)?;
        out.flush()?;
        let (hash, size) = hashing.finish();

        if is_executable {
            make_executable(&target)?;
        }

        debug!(scheme = %scheme, path = %target.display(), size, "Wrote file");
        self.installed.push(target);
        Ok(RecordEntry::new(path, Some(hash), Some(size)))
    }

    /// RECORD path prefix for files of `scheme`, relative to the root scheme.
    fn record_prefix(&self, root_dir: &Path, scheme: &Scheme) -> Result<String> {
        let dir = self.scheme_dir(scheme)?;
        let components: Vec<String> = relative_path(root_dir, dir)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(components.join("/"))
    }
}

impl WheelDestination for SchemeDictionaryDestination {
    fn scheme_names(&self) -> Vec<Scheme> {
        self.layout.schemes().cloned().collect()
    }

    fn write_script(&mut self, entry_point: &EntryPoint) -> Result<RecordEntry> {
        let script = generate_script(entry_point, &self.interpreter)?;
        self.write_to_fs(&Scheme::SCRIPTS, &entry_point.name, &mut script.as_slice(), true)
    }

    fn write_file(
        &mut self,
        scheme: &Scheme,
        path: &str,
        reader: &mut dyn Read,
        is_executable: bool,
    ) -> Result<RecordEntry> {
        if *scheme == Scheme::SCRIPTS {
            let mut fixed = fix_shebang(reader, &self.interpreter)?;
            return self.write_to_fs(scheme, path, &mut fixed, is_executable);
        }
        self.write_to_fs(scheme, path, reader, is_executable)
    }

    fn finalize_installation(
        &mut self,
        root_scheme: &Scheme,
        record_file_path: &str,
        records: Vec<InstallRecord>,
    ) -> Result<()> {
        let root_dir = self.scheme_dir(root_scheme)?.to_path_buf();

        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            let prefix = if record.scheme == *root_scheme {
                None
            } else {
                Some(self.record_prefix(&root_dir, &record.scheme)?)
            };
            rows.push(record.entry.to_row(prefix.as_deref()));
        }

        let contents = write_record_file(rows);
        self.write_to_fs(root_scheme, record_file_path, &mut contents.as_bytes(), false)?;

        info!(
            files = records.len(),
            record = %record_file_path,
            "Wrote RECORD"
        );
        self.records = records;
        Ok(())
    }
}

/// Add execute permission wherever read permission is set.
#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    fs::set_permissions(path, fs::Permissions::from_mode(mode | ((mode & 0o444) >> 2)))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
