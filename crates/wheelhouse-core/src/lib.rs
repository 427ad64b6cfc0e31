//! wheelhouse core: install a wheel into a set of scheme directories.
//!
//! The install driver ([`install`]) never touches the filesystem itself. It
//! reads from a [`WheelSource`], decides where every file belongs, and hands
//! each file to a [`WheelDestination`], collecting the returned RECORD
//! entries for one final manifest write.
//!
//! # Architecture
//!
//! - [`install::resolve_root_scheme`]: `WHEEL` metadata → `purelib`/`platlib`.
//! - [`install::classify`]: archive path → `(scheme, scheme-relative path)`.
//! - [`install::install`]: the driver tying both to a source and destination.
//! - [`io`]: concrete collaborators (zip source, filesystem and dry-run
//!   destinations).

pub mod destination;
mod error;
pub mod install;
pub mod io;
pub mod paths;
pub mod script;
pub mod source;

pub use destination::WheelDestination;
pub use error::{Error, Result};
pub use install::{InstallRecord, classify, install, resolve_root_scheme};
pub use io::dry_run::DryRunDestination;
pub use io::scheme_dict::SchemeDictionaryDestination;
pub use io::wheel_file::{ValidationMode, WheelFile};
pub use paths::SchemeLayout;
pub use source::{WheelContent, WheelSource};

pub use wheelhouse_schema as schema;

/// Identifies this installer in the `INSTALLER` metadata file.
pub const INSTALLER_NAME: &str = "wheelhouse";
