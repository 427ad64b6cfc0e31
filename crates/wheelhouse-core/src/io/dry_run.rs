//! A destination that writes nothing.

use std::io::{self, Read};

use tracing::debug;
use wheelhouse_schema::{EntryPoint, HashAlgorithm, HashingReader, RecordEntry, Scheme};

use crate::destination::WheelDestination;
use crate::install::InstallRecord;
use crate::script::generate_script;
use crate::Result;

/// Reads and hashes every file, keeping only the resulting records.
///
/// Useful for previewing an install: the records are exactly what a real
/// destination would put in RECORD, minus the scheme-relative prefixes.
#[derive(Debug, Clone)]
pub struct DryRunDestination {
    schemes: Vec<Scheme>,
    interpreter: String,
    hash_algorithm: HashAlgorithm,
    root_scheme: Option<Scheme>,
    records: Vec<InstallRecord>,
}

impl DryRunDestination {
    /// Accept files for `schemes`; launchers are generated for `interpreter`.
    pub fn new(schemes: impl IntoIterator<Item = Scheme>, interpreter: impl Into<String>) -> Self {
        Self {
            schemes: schemes.into_iter().collect(),
            interpreter: interpreter.into(),
            hash_algorithm: HashAlgorithm::default(),
            root_scheme: None,
            records: Vec::new(),
        }
    }

    /// Hash with `algorithm` instead of sha256.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Root scheme reported at finalize, if finalized.
    pub fn root_scheme(&self) -> Option<&Scheme> {
        self.root_scheme.as_ref()
    }

    /// Records reported at finalize, in installation order.
    pub fn records(&self) -> &[InstallRecord] {
        &self.records
    }

    fn consume(&self, reader: &mut dyn Read, path: &str) -> Result<RecordEntry> {
        let mut hashing = HashingReader::new(reader, self.hash_algorithm);
        io::copy(&mut hashing, &mut io::sink())?;
        let (hash, size) = hashing.finish();
        Ok(RecordEntry::new(path, Some(hash), Some(size)))
    }
}

impl WheelDestination for DryRunDestination {
    fn scheme_names(&self) -> Vec<Scheme> {
        self.schemes.clone()
    }

    fn write_script(&mut self, entry_point: &EntryPoint) -> Result<RecordEntry> {
        let script = generate_script(entry_point, &self.interpreter)?;
        debug!(name = %entry_point.name, "Would write launcher");
        self.consume(&mut script.as_slice(), &entry_point.name)
    }

    fn write_file(
        &mut self,
        scheme: &Scheme,
        path: &str,
        reader: &mut dyn Read,
        _is_executable: bool,
    ) -> Result<RecordEntry> {
        debug!(scheme = %scheme, path, "Would write file");
        self.consume(reader, path)
    }

    fn finalize_installation(
        &mut self,
        root_scheme: &Scheme,
        _record_file_path: &str,
        records: Vec<InstallRecord>,
    ) -> Result<()> {
        self.root_scheme = Some(root_scheme.clone());
        self.records = records;
        Ok(())
    }
}
