//! Installation schemes.
//!
//! A scheme names one installation directory category. The five standard
//! names come from the wheel `.data` convention; destinations may declare
//! more, so `Scheme` is a validated string rather than a closed enum.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};

/// A named installation directory category (`purelib`, `scripts`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scheme(Cow<'static, str>);

impl Scheme {
    /// Pure-Python modules.
    pub const PURELIB: Scheme = Scheme(Cow::Borrowed("purelib"));
    /// Platform-specific modules and extensions.
    pub const PLATLIB: Scheme = Scheme(Cow::Borrowed("platlib"));
    /// C headers.
    pub const HEADERS: Scheme = Scheme(Cow::Borrowed("headers"));
    /// Executables and launcher scripts.
    pub const SCRIPTS: Scheme = Scheme(Cow::Borrowed("scripts"));
    /// Arbitrary data, installed relative to the prefix.
    pub const DATA: Scheme = Scheme(Cow::Borrowed("data"));

    /// The standard scheme names every destination understands.
    pub const DEFAULTS: [Scheme; 5] = [
        Self::PURELIB,
        Self::PLATLIB,
        Self::HEADERS,
        Self::SCRIPTS,
        Self::DATA,
    ];

    /// Create a scheme from a name.
    ///
    /// # Errors
    ///
    /// Returns an error string if `name` is empty or contains a path separator.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Scheme name must not be empty".to_string());
        }
        if name.contains('/') || name.contains('\\') {
            return Err(format!("Scheme name must not contain a path separator: '{name}'"));
        }

        // Reuse the static spelling for the standard names.
        if let Some(known) = Self::DEFAULTS.iter().find(|s| s.as_str() == name) {
            return Ok(known.clone());
        }
        Ok(Self(Cow::Owned(name)))
    }

    /// Return the scheme name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Scheme {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        scheme.0.into_owned()
    }
}

impl AsRef<str> for Scheme {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Scheme {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Scheme {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Scheme {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
