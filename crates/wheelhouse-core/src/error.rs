//! Errors for wheel installation

use std::path::PathBuf;

use thiserror::Error;
use wheelhouse_schema::{EntryPointError, MetadataError, RecordError, Scheme};

/// Everything that can abort an installation.
#[derive(Error, Debug)]
pub enum Error {
    /// `Wheel-Version` is missing or not 1.x.
    #[error(
        "Incompatible Wheel-Version {}, only support version 1.x wheels",
        .version.as_deref().unwrap_or("<missing>")
    )]
    IncompatibleSource {
        /// The offending value, if the key was present at all.
        version: Option<String>,
    },

    /// The archive breaks the wheel layout conventions.
    #[error("Invalid wheel source {source_name}: {message}")]
    InvalidSource {
        /// Archive the problem was found in.
        source_name: String,
        /// What is wrong, naming the offending path or field.
        message: String,
    },

    /// An entry point cannot be turned into a launcher.
    #[error("Invalid script '{name}': {reason}")]
    InvalidScript {
        /// Entry point name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A path would escape its scheme directory.
    #[error("Refusing to write '{0}' outside of the target directory")]
    InvalidPath(String),

    /// A destination was asked for a scheme it has no directory for.
    #[error("No directory configured for scheme '{0}'")]
    UnknownScheme(Scheme),

    /// Target file exists and overwriting is disabled.
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// A `.dist-info` file was requested but is not in the archive.
    #[error("{0} not found in archive")]
    NotFound(String),

    /// RECORD does not describe the archive contents.
    #[error("RECORD validation failed for {wheel}:\n  {}", .issues.join("\n  "))]
    RecordValidation {
        /// Archive being validated.
        wheel: String,
        /// One line per problem found.
        issues: Vec<String>,
    },

    /// Filesystem or stream failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// RECORD could not be parsed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// `WHEEL` metadata or the wheel filename could not be parsed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// `entry_points.txt` could not be parsed.
    #[error(transparent)]
    EntryPoints(#[from] EntryPointError),
}

impl Error {
    /// Shorthand for [`Error::InvalidSource`].
    pub fn invalid_source(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidSource {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
