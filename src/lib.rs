//! # fsx
//!
//! Filesystem path handles and safe zip archiving.
//!
//! The crate has two halves that meet in [`PathHandle`]:
//!
//! - a path handle with a lazily cached metadata snapshot, type and
//!   permission queries, and the usual file operations
//! - [`create`] and [`extract`], which turn a directory tree into a zip file
//!   and back again, guarding extraction against path traversal and
//!   decompression bombs
//!
//! ## Quick Start
//!
//! ### Archiving a Directory
//!
//! ```rust,no_run
//! use fsx::{WriteOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let result = fsx::create("./project", "project.zip", &WriteOptions::default())?;
//!     println!(
//!         "Wrote {} entries ({:.1}% smaller)",
//!         result.entries_written,
//!         result.space_savings() * 100.0
//!     );
//!     Ok(())
//! }
//! ```
//!
//! `create` never replaces an existing file: a second call with the same
//! destination fails with [`Error::AlreadyExists`].
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use fsx::{ExtractOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let result = fsx::extract("project.zip", "./restored", &ExtractOptions::default())?;
//!     println!("{} files, {} bytes", result.entries_extracted, result.bytes_extracted);
//!     Ok(())
//! }
//! ```
//!
//! ### Working With Paths
//!
//! ```rust,no_run
//! use fsx::PathHandle;
//!
//! # fn main() -> fsx::Result<()> {
//! let handle = PathHandle::new("notes.txt")?;
//! if handle.is_regular() {
//!     println!("{} {:o} {}", handle.base(), handle.permissions()?, handle.md5()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety and Resource Limits
//!
//! Extraction treats every archive as untrusted:
//!
//! - **Path traversal protection**: entries with `..` components, absolute
//!   names, or names that resolve outside the destination through existing
//!   symlinks fail with [`Error::PathTraversal`]
//! - **Resource limits**: per-entry size, total size, entry count and an
//!   opt-in compression ratio, checked against declared sizes up front and against
//!   the bytes actually produced while decompressing
//! - **Symlinks**: not created unless [`LinkPolicy`] allows it
//!
//! ```rust
//! use fsx::{ExtractOptions, LinkPolicy, PathSafety, ResourceLimits};
//!
//! let options = ExtractOptions::new()
//!     .path_safety(PathSafety::Strict)
//!     .link_policy(LinkPolicy::ValidateTargets)
//!     .limits(ResourceLimits::new().max_entry_unpacked(100 * 1024 * 1024));
//! ```
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade and never prints. Install any
//! logger (the `fsx` binary uses `env_logger`) to see per-entry progress at
//! `debug` level.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod archive_path;
pub mod checksum;
pub mod error;
pub mod fs;
pub mod ownership;
pub mod read;
pub mod safety;
pub mod write;

pub use archive_path::ArchivePath;
pub use checksum::HashAlgorithm;
pub use error::{Error, ErrorKind, Result};
pub use fs::PathHandle;
pub use ownership::UnixOwnership;
pub use read::{
    Archive, ArchiveEntry, ExtractOptions, ExtractResult, LinkPolicy, OverwritePolicy, extract,
};
pub use safety::{
    LimitMode, LimitedReader, PathSafety, RatioLimit, ResourceLimits, validate_extract_path,
};
pub use write::{CompressionMethod, SymlinkPolicy, WriteOptions, WriteResult, Writer, create};
