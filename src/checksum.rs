//! Content hashing utilities.
//!
//! MD5 and SHA-256 digests of file contents, rendered as lower-case hex.
//! Files are streamed through a fixed buffer, never read whole.
//!
//! # Example
//!
//! ```rust
//! use fsx::checksum::{Checksum, Md5, Sha256};
//!
//! let mut sha = Sha256::new();
//! sha.update(b"hello ");
//! sha.update(b"world");
//! assert_eq!(
//!     sha.finalize(),
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//!
//! assert_eq!(Md5::compute(b""), "d41d8cd98f00b204e9800998ecf8427e");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Digest;

use crate::{Error, READ_BUFFER_SIZE, Result};

/// Common trait for digest computation.
pub trait Checksum: Default + Clone {
    /// Creates a new digest calculator.
    fn new() -> Self;

    /// Feeds more data into the digest.
    fn update(&mut self, data: &[u8]);

    /// Returns the digest of everything fed so far as lower-case hex.
    ///
    /// Does not consume or reset the calculator.
    fn finalize(&self) -> String;

    /// Resets the calculator to its initial state.
    fn reset(&mut self);

    /// Computes the digest of a single slice in one call.
    fn compute(data: &[u8]) -> String {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Computes the digest by reading a reader to the end.
    ///
    /// Read errors are propagated, never folded into the digest.
    fn compute_reader<R: Read>(reader: &mut R) -> io::Result<String> {
        let mut hasher = Self::new();
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }
        Ok(hasher.finalize())
    }

    /// Computes the digest of a file's contents.
    fn compute_file(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| Error::from_io(e, path))?;
        Self::compute_reader(&mut file).map_err(|e| Error::from_io(e, path))
    }
}

/// MD5 digest calculator.
///
/// Not collision resistant; use it for change detection and compatibility
/// with existing manifests only.
#[derive(Clone, Default)]
pub struct Md5 {
    hasher: md5::Md5,
}

impl fmt::Debug for Md5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Md5")
            .field("current", &self.finalize())
            .finish()
    }
}

impl Checksum for Md5 {
    fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(&self) -> String {
        format!("{:x}", self.hasher.clone().finalize())
    }

    fn reset(&mut self) {
        self.hasher = md5::Md5::new();
    }
}

/// SHA-256 digest calculator.
#[derive(Clone, Default)]
pub struct Sha256 {
    hasher: sha2::Sha256,
}

impl fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha256")
            .field("current", &self.finalize())
            .finish()
    }
}

impl Checksum for Sha256 {
    fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, data: &[u8]) {
        sha2::Digest::update(&mut self.hasher, data);
    }

    fn finalize(&self) -> String {
        format!("{:x}", sha2::Digest::finalize(self.hasher.clone()))
    }

    fn reset(&mut self) {
        self.hasher = sha2::Sha256::default();
    }
}

/// Digest algorithms selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// MD5 (128-bit).
    Md5,
    /// SHA-256 (256-bit).
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Hashes a file with this algorithm.
    pub fn hash_file(self, path: impl AsRef<Path>) -> Result<String> {
        match self {
            Self::Md5 => Md5::compute_file(path),
            Self::Sha256 => Sha256::compute_file(path),
        }
    }

    /// Returns the canonical lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(Error::UnsupportedFeature {
                feature: "hash algorithm (expected md5 or sha256)",
            }),
        }
    }
}
