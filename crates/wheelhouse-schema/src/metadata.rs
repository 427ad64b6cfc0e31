//! `WHEEL` metadata headers and wheel filenames.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors from parsing metadata text or wheel filenames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The metadata file is not valid UTF-8.
    #[error("Metadata is not valid UTF-8")]
    Encoding,

    /// A header line has no `:` separator.
    #[error("Malformed metadata header on line {line}: '{content}'")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// The filename does not follow `{dist}-{version}(-{build})?-{tag}.whl`.
    #[error("Not a valid wheel filename: '{0}'")]
    InvalidFilename(String),
}

/// Parsed `Key: Value` headers, in file order.
///
/// Lookups are case-insensitive, like mail headers. When a key repeats,
/// [`get`](Self::get) returns the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    headers: Vec<(String, String)>,
}

impl MetadataRecord {
    /// Parse header text. Parsing stops at the first blank line; anything
    /// after it is a message body and is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MalformedHeader`] for a line that is neither
    /// a header nor a continuation.
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        let mut headers: Vec<(String, String)> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = headers.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                    continue;
                }
            }

            let (key, value) =
                line.split_once(':')
                    .ok_or_else(|| MetadataError::MalformedHeader {
                        line: index + 1,
                        content: line.to_string(),
                    })?;
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }

        Ok(Self { headers })
    }

    /// Parse raw bytes as read from an archive.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Encoding`] for non-UTF-8 input, otherwise as
    /// [`parse`](Self::parse).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
        let text = std::str::from_utf8(bytes).map_err(|_| MetadataError::Encoding)?;
        Self::parse(text)
    }

    /// First value for `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in file order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Number of header lines.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// True if no headers were parsed.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

static WHEEL_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<distribution>.+?)-(?P<version>.*?)(?:-(?P<build>\d[^-]*?))?-(?P<tag>.+?-.+?-.+?)\.whl$",
    )
    .expect("wheel filename pattern is valid")
});

/// The components of a `.whl` filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    /// Distribution name, as spelled in the filename.
    pub distribution: String,
    /// Version string.
    pub version: String,
    /// Optional build tag (always starts with a digit).
    pub build_tag: Option<String>,
    /// Compatibility tag triple, `{python}-{abi}-{platform}`.
    pub tag: String,
}

impl WheelFilename {
    /// Parse a filename such as `mypkg-1.0-py3-none-any.whl`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidFilename`] if it does not match the
    /// wheel naming convention.
    pub fn parse(filename: &str) -> Result<Self, MetadataError> {
        let caps = WHEEL_FILENAME_RE
            .captures(filename)
            .ok_or_else(|| MetadataError::InvalidFilename(filename.to_string()))?;

        Ok(Self {
            distribution: caps["distribution"].to_string(),
            version: caps["version"].to_string(),
            build_tag: caps.name("build").map(|m| m.as_str().to_string()),
            tag: caps["tag"].to_string(),
        })
    }
}
