//! The read side of an installation.

use std::io::Read;

use wheelhouse_schema::RecordEntry;

use crate::Result;

/// One archived file, handed to a [`WheelSource::visit_contents`] visitor.
pub struct WheelContent<'a> {
    /// The file's RECORD entry as listed in the archive.
    pub record: RecordEntry,
    /// The file's bytes. Read at most once.
    pub reader: &'a mut dyn Read,
    /// Whether the archive marks the file executable.
    pub is_executable: bool,
}

impl std::fmt::Debug for WheelContent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelContent")
            .field("record", &self.record)
            .field("is_executable", &self.is_executable)
            .finish_non_exhaustive()
    }
}

/// A wheel to install, as seen by the install driver.
///
/// Implementations own the archive; the driver only asks for metadata files
/// and for one ordered pass over the contents.
pub trait WheelSource {
    /// Distribution name, as spelled in the wheel filename.
    fn distribution(&self) -> &str;

    /// Version string.
    fn version(&self) -> &str;

    /// The `{distribution}-{version}.dist-info` directory.
    fn dist_info_dir(&self) -> &str;

    /// The `{distribution}-{version}.data` directory prefix.
    fn data_dir(&self) -> &str;

    /// Names of the files in the `.dist-info` directory, relative to it.
    fn dist_info_filenames(&self) -> Vec<String>;

    /// Read one file from the `.dist-info` directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the file is
    /// absent, or a source-specific read error.
    fn read_dist_info(&mut self, filename: &str) -> Result<Vec<u8>>;

    /// Walk every file in the archive once, in archive order.
    ///
    /// The first error returned by `visitor` stops the walk and is
    /// propagated unchanged.
    ///
    /// # Errors
    ///
    /// Returns source read errors, or whatever `visitor` returns.
    fn visit_contents(
        &mut self,
        visitor: &mut dyn FnMut(WheelContent<'_>) -> Result<()>,
    ) -> Result<()>;
}
