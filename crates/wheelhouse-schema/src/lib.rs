//! Shared types and text formats for installing Python wheels.
//!
//! Everything in this crate is pure: parsing and formatting of the metadata
//! files found in a `.dist-info` directory, plus the value types exchanged
//! between a wheel source, the install core and a destination.

pub mod entry_points;
pub mod hash;
pub mod metadata;
pub mod record;
pub mod scheme;

// Re-exports
pub use entry_points::{
    EntryPoint, EntryPointError, ScriptSection, parse_entry_points, parse_entry_points_bytes,
};
pub use hash::{HashAlgorithm, HashingReader, RecordHash};
pub use metadata::{MetadataError, MetadataRecord, WheelFilename};
pub use record::{RecordEntry, RecordError, parse_record_file, write_record_file};
pub use scheme::Scheme;

/// Name of the manifest file inside the `.dist-info` directory.
pub const RECORD_FILENAME: &str = "RECORD";

/// Name of the wheel metadata file inside the `.dist-info` directory.
pub const WHEEL_FILENAME: &str = "WHEEL";

/// Name of the entry point declarations inside the `.dist-info` directory.
pub const ENTRY_POINTS_FILENAME: &str = "entry_points.txt";
