//! RECORD hashes: `name=value` digests, computed one-shot or while streaming.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::io::{self, Read};

/// Digest algorithms accepted in RECORD files.
///
/// Only the SHA-2 family is supported; wheels built by any current tool use
/// `sha256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// SHA-224
    Sha224,
    /// SHA-256 (the default for newly written RECORD files)
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// The name used in `name=value` RECORD hashes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(format!("Unsupported hash algorithm: {s}")),
        }
    }
}

/// Incremental digest over one of the supported algorithms.
enum Hasher {
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha224 => Self::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha224(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha384(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// A `name=value` hash as it appears in the second column of RECORD.
///
/// The value is the URL-safe base64 encoding of the raw digest with the
/// trailing `=` padding removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHash {
    /// Algorithm name (e.g. `sha256`). Kept verbatim so unknown algorithms
    /// survive a parse/format cycle.
    pub name: String,
    /// Encoded digest.
    pub value: String,
}

impl RecordHash {
    /// Create a hash from an algorithm name and an already-encoded value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the `name=value` form.
    ///
    /// # Errors
    ///
    /// Returns an error string if there is no `=` separator.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid hash '{s}': expected 'algorithm=value'"))?;
        Ok(Self::new(name, value))
    }

    /// Hash `data` with `algorithm`.
    pub fn compute(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let mut hasher = Hasher::new(algorithm);
        hasher.update(data);
        Self::from_digest(algorithm, &hasher.finalize())
    }

    fn from_digest(algorithm: HashAlgorithm, digest: &[u8]) -> Self {
        Self::new(algorithm.as_str(), URL_SAFE_NO_PAD.encode(digest))
    }

    /// The algorithm, if it is one we can compute.
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        self.name.parse().ok()
    }

    /// Check `data` against this hash.
    ///
    /// An unsupported algorithm never validates.
    pub fn validate(&self, data: &[u8]) -> bool {
        self.algorithm()
            .is_some_and(|algorithm| Self::compute(algorithm, data).value == self.value)
    }
}

impl std::fmt::Display for RecordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl std::str::FromStr for RecordHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A reader adapter that hashes and counts every byte read through it.
///
/// Destinations wrap the incoming stream in this while copying so the file
/// is read exactly once.
pub struct HashingReader<R> {
    inner: R,
    algorithm: HashAlgorithm,
    hasher: Hasher,
    size: u64,
}

impl<R: Read> HashingReader<R> {
    /// Wrap `inner`, hashing with `algorithm`.
    pub fn new(inner: R, algorithm: HashAlgorithm) -> Self {
        Self {
            inner,
            algorithm,
            hasher: Hasher::new(algorithm),
            size: 0,
        }
    }

    /// Number of bytes read so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the reader, returning the hash and total size of what was read.
    pub fn finish(self) -> (RecordHash, u64) {
        let digest = self.hasher.finalize();
        (RecordHash::from_digest(self.algorithm, &digest), self.size)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.size += n as u64;
        Ok(n)
    }
}

impl<R> std::fmt::Debug for HashingReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingReader")
            .field("algorithm", &self.algorithm)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256(b"hello") encoded as RECORD expects.
    const HELLO_SHA256: &str = "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ";

    #[test]
    fn compute_matches_known_digest() {
        let hash = RecordHash::compute(HashAlgorithm::Sha256, b"hello");
        assert_eq!(hash.name, "sha256");
        assert_eq!(hash.value, HELLO_SHA256);
        assert_eq!(hash.to_string(), format!("sha256={HELLO_SHA256}"));
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let hash = RecordHash::parse("sha256=abc=def").unwrap();
        assert_eq!(hash.name, "sha256");
        assert_eq!(hash.value, "abc=def");
        assert!(RecordHash::parse("sha256").is_err());
    }

    #[test]
    fn validate_checks_content() {
        let hash = RecordHash::compute(HashAlgorithm::Sha512, b"data");
        assert!(hash.validate(b"data"));
        assert!(!hash.validate(b"other"));
    }

    #[test]
    fn unknown_algorithm_never_validates() {
        let hash = RecordHash::new("md5", "whatever");
        assert_eq!(hash.algorithm(), None);
        assert!(!hash.validate(b"data"));
    }

    #[test]
    fn hashing_reader_matches_one_shot_hash() {
        let data = vec![7u8; 100_000];
        let mut reader = HashingReader::new(&data[..], HashAlgorithm::Sha256);
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).unwrap();
        let (hash, size) = reader.finish();

        assert_eq!(size, 100_000);
        assert_eq!(hash, RecordHash::compute(HashAlgorithm::Sha256, &data));
        assert_eq!(sink, data);
    }
}
