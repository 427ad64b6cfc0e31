//! The write side of an installation.

use std::io::Read;

use wheelhouse_schema::{EntryPoint, RecordEntry, Scheme};

use crate::Result;
use crate::install::InstallRecord;

/// Where an installation's files end up.
///
/// The install driver calls [`write_script`](Self::write_script) and
/// [`write_file`](Self::write_file) once per installed file and then
/// [`finalize_installation`](Self::finalize_installation) exactly once with
/// everything that was written. Rollback on failure, if any, is up to the
/// implementation.
pub trait WheelDestination {
    /// Scheme names this destination can place files in.
    ///
    /// Paths under the wheel's `.data` directory must name one of these.
    fn scheme_names(&self) -> Vec<Scheme> {
        Scheme::DEFAULTS.to_vec()
    }

    /// Create a launcher for an entry point in the `scripts` scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if the launcher cannot be generated or written.
    fn write_script(&mut self, entry_point: &EntryPoint) -> Result<RecordEntry>;

    /// Write `reader` to `path` within `scheme`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid for the scheme or the write
    /// fails.
    fn write_file(
        &mut self,
        scheme: &Scheme,
        path: &str,
        reader: &mut dyn Read,
        is_executable: bool,
    ) -> Result<RecordEntry>;

    /// Persist the RECORD manifest for everything written.
    ///
    /// `records` is in installation order and ends with the entry for
    /// `record_file_path` itself, which has no hash or size.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    fn finalize_installation(
        &mut self,
        root_scheme: &Scheme,
        record_file_path: &str,
        records: Vec<InstallRecord>,
    ) -> Result<()>;
}
