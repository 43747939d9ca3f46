//! Error types for path handle and archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when querying paths, creating archives, or extracting them,
//! along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Failures
//! are never retried internally; retry policy belongs to the caller.
//!
//! ```rust,no_run
//! use fsx::{Error, PathHandle};
//!
//! fn archive_logs() -> fsx::Result<()> {
//!     let logs = PathHandle::new("/var/log/myapp")?;
//!     match logs.zip("/tmp/logs.zip") {
//!         Ok(result) => {
//!             println!("archived {} files", result.entries_written);
//!             Ok(())
//!         }
//!         Err(Error::AlreadyExists { path }) => {
//!             eprintln!("refusing to overwrite {}", path.display());
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! ## Security Errors
//!
//! Extraction of untrusted archives may fail with [`Error::PathTraversal`],
//! [`Error::SymlinkTargetEscape`] or [`Error::EntryTooLarge`]. These are
//! grouped by [`Error::is_security_violation`].

use std::io;
use std::path::{Path, PathBuf};

/// Coarse classification of an [`Error`].
///
/// Mirrors the taxonomy callers typically branch on without matching every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A source path or archive does not exist.
    NotFound,
    /// The destination already exists.
    AlreadyExists,
    /// The operating system denied access.
    PermissionDenied,
    /// Any other read or write failure.
    Io,
    /// An archive entry would be written outside the destination.
    PathTraversal,
    /// An archive entry exceeded a configured size limit.
    EntryTooLarge,
    /// The archive or an entry in it is malformed.
    InvalidArchive,
    /// The caller supplied an invalid argument or option.
    InvalidInput,
    /// The operation is not available on this platform.
    Unsupported,
}

/// The main error type for this crate.
///
/// # Error Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Filesystem | [`NotFound`][Self::NotFound], [`AlreadyExists`][Self::AlreadyExists], [`PermissionDenied`][Self::PermissionDenied], [`NotADirectory`][Self::NotADirectory], [`Io`][Self::Io] |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`InvalidArchivePath`][Self::InvalidArchivePath] |
/// | Security | [`PathTraversal`][Self::PathTraversal], [`SymlinkTargetEscape`][Self::SymlinkTargetEscape], [`EntryTooLarge`][Self::EntryTooLarge], [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] |
/// | Caller | [`InvalidCompressionLevel`][Self::InvalidCompressionLevel], [`UnsupportedFeature`][Self::UnsupportedFeature] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error that does not map onto a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The path does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The destination already exists and will not be overwritten.
    #[error("already exists: {}", path.display())]
    AlreadyExists {
        /// The existing path.
        path: PathBuf,
    },

    /// The operating system refused access to the path.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// A directory was required but the path is something else.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The file is not a readable zip archive.
    #[error("invalid archive: {0}")]
    InvalidFormat(String),

    /// An entry name failed validation.
    #[error("invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// An entry would be extracted outside the destination directory.
    ///
    /// Raised for names containing `..` components, absolute names, and names
    /// that resolve outside the canonical destination (e.g. through an
    /// existing symlink).
    #[error("path traversal detected in entry {entry_index}: {path}")]
    PathTraversal {
        /// Index of the offending entry in the archive.
        entry_index: usize,
        /// The entry name as stored in the archive.
        path: String,
    },

    /// A symlink entry points outside the destination directory.
    #[error("symlink target escapes destination in entry {entry_index}: {path} -> {target}")]
    SymlinkTargetEscape {
        /// Index of the offending entry in the archive.
        entry_index: usize,
        /// The entry name as stored in the archive.
        path: String,
        /// The link target stored in the entry.
        target: String,
    },

    /// An entry exceeded the configured size, ratio, or total limit.
    #[error("entry {entry_index} ({path}) too large: {reason}")]
    EntryTooLarge {
        /// Index of the offending entry in the archive.
        entry_index: usize,
        /// The entry name as stored in the archive.
        path: String,
        /// Which limit was exceeded.
        reason: String,
    },

    /// An archive-wide limit (such as the entry count) was exceeded.
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// An invalid compression level was provided.
    ///
    /// ```rust
    /// use fsx::{Error, WriteOptions};
    ///
    /// assert!(WriteOptions::new().level(6).is_ok());
    /// assert!(matches!(
    ///     WriteOptions::new().level(15),
    ///     Err(Error::InvalidCompressionLevel { level: 15 })
    /// ));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },

    /// The operation is not available on this platform.
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },
}

impl Error {
    /// Converts an I/O error on `path` into the matching path-carrying variant.
    ///
    /// `NotFound`, `AlreadyExists` and `PermissionDenied` kinds keep the path
    /// for context; any other kind is wrapped as [`Error::Io`]. An
    /// [`io::Error`] that carries one of our own errors (as produced by
    /// [`LimitedReader`](crate::safety::LimitedReader)) is unwrapped first.
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path },
            io::ErrorKind::AlreadyExists => Error::AlreadyExists { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
            _ => unwrap_io(err),
        }
    }

    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::NotADirectory { .. } => ErrorKind::InvalidInput,
            Error::InvalidFormat(_) | Error::InvalidArchivePath(_) => ErrorKind::InvalidArchive,
            Error::PathTraversal { .. } | Error::SymlinkTargetEscape { .. } => {
                ErrorKind::PathTraversal
            }
            Error::EntryTooLarge { .. } | Error::ResourceLimitExceeded(_) => {
                ErrorKind::EntryTooLarge
            }
            Error::InvalidCompressionLevel { .. } => ErrorKind::InvalidInput,
            Error::UnsupportedFeature { .. } => ErrorKind::Unsupported,
        }
    }

    /// Returns `true` if this error was raised by an extraction safety check.
    ///
    /// Security errors mean the archive is hostile or at least untrustworthy;
    /// the extraction should not be retried with relaxed settings unless the
    /// archive source is fully trusted.
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Error::PathTraversal { .. }
                | Error::SymlinkTargetEscape { .. }
                | Error::EntryTooLarge { .. }
                | Error::ResourceLimitExceeded(_)
        )
    }

    /// Returns the entry index associated with this error, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Error::PathTraversal { entry_index, .. }
            | Error::SymlinkTargetEscape { entry_index, .. }
            | Error::EntryTooLarge { entry_index, .. } => Some(*entry_index),
            _ => None,
        }
    }

    /// Returns the filesystem path associated with this error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::NotFound { path }
            | Error::AlreadyExists { path }
            | Error::PermissionDenied { path }
            | Error::NotADirectory { path } => Some(path.as_path()),
            _ => None,
        }
    }
}

/// Recovers an [`Error`] that was smuggled through an [`io::Error`].
///
/// [`std::io::Read`] implementations can only return `io::Error`, so the
/// limit checks in [`LimitedReader`](crate::safety::LimitedReader) box our
/// error inside one. This undoes that wrapping.
pub(crate) fn unwrap_io(err: io::Error) -> Error {
    if !err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
        return Error::Io(err);
    }
    let kind = err.kind();
    let Some(inner) = err.into_inner() else {
        return Error::Io(io::Error::from(kind));
    };
    match inner.downcast::<Error>() {
        Ok(ours) => *ours,
        Err(inner) => Error::Io(io::Error::new(kind, inner)),
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        use zip::result::ZipError;
        match err {
            ZipError::Io(e) => unwrap_io(e),
            ZipError::FileNotFound => Error::InvalidFormat("entry not found in archive".into()),
            other => Error::InvalidFormat(other.to_string()),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let err = Error::from_io(io::Error::from(io::ErrorKind::NotFound), "/missing");
        assert!(matches!(err, Error::NotFound { ref path } if path == Path::new("/missing")));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = Error::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "/a.zip");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = Error::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "/root");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.path(), Some(Path::new("/root")));

        let err = Error::from_io(io::Error::from(io::ErrorKind::WriteZero), "/full");
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_unwrap_io_recovers_inner_error() {
        let inner = Error::EntryTooLarge {
            entry_index: 3,
            path: "big.bin".into(),
            reason: "size 10 exceeds limit 5".into(),
        };
        let wrapped = io::Error::other(inner);
        match unwrap_io(wrapped) {
            Error::EntryTooLarge { entry_index, .. } => assert_eq!(entry_index, 3),
            other => panic!("expected EntryTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_io_passes_plain_errors() {
        let err = unwrap_io(io::Error::other("disk on fire"));
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_path_traversal_message() {
        let err = Error::PathTraversal {
            entry_index: 42,
            path: "../../etc/passwd".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("../../etc/passwd"));
        assert!(err.is_security_violation());
        assert_eq!(err.entry_index(), Some(42));
    }

    #[test]
    fn test_security_classification() {
        assert!(
            Error::EntryTooLarge {
                entry_index: 0,
                path: "x".into(),
                reason: "r".into(),
            }
            .is_security_violation()
        );
        assert!(
            Error::SymlinkTargetEscape {
                entry_index: 0,
                path: "link".into(),
                target: "/etc".into(),
            }
            .is_security_violation()
        );
        assert!(!Error::InvalidFormat("bad".into()).is_security_violation());
        assert!(
            !Error::AlreadyExists {
                path: "a.zip".into()
            }
            .is_security_violation()
        );
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad magic").into();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("bad magic")));

        let err: Error = zip::result::ZipError::Io(io::Error::other("boom")).into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_compression_level() {
        let err = Error::InvalidCompressionLevel { level: 12 };
        assert_eq!(err.to_string(), "invalid compression level 12: must be 0-9");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
