//! Write options and configuration for archive creation.

use zip::write::FileOptions;

use crate::{Error, Result};

/// Compression applied to file entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// No compression; data is stored verbatim.
    Stored,
    /// DEFLATE, readable by every zip tool.
    #[default]
    Deflated,
}

impl CompressionMethod {
    /// Returns the canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Deflated => "deflated",
        }
    }

    fn to_zip(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// How symbolic links found while walking a source tree are archived.
///
/// Only meaningful on Unix; elsewhere links are always skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Leave symlinks out of the archive (counted as skipped).
    #[default]
    Skip,
    /// Archive what the link points at, as if it were a regular file or
    /// directory.
    Follow,
    /// Store the link itself as a symlink entry holding its target path.
    Store,
}

/// Options for creating archives.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compression method to use.
    pub method: CompressionMethod,
    /// Compression level (0-9). Ignored for [`CompressionMethod::Stored`].
    pub level: u32,
    /// Symlink handling while walking the source tree.
    pub symlinks: SymlinkPolicy,
    /// Record Unix permission bits of each file in its entry.
    pub preserve_permissions: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            method: CompressionMethod::Deflated,
            level: 6,
            symlinks: SymlinkPolicy::Skip,
            preserve_permissions: true,
        }
    }
}

impl WriteOptions {
    /// Creates new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method.
    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the compression level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if `level` is above 9.
    pub fn level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the symlink policy.
    pub fn symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    /// Sets whether Unix permission bits are recorded.
    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Builds per-entry options for the zip writer.
    ///
    /// `mode` is recorded only when permissions are preserved. `size` decides
    /// whether the entry needs zip64 extensions.
    pub(crate) fn file_options(&self, mode: Option<u32>, size: u64) -> FileOptions {
        let mut options = FileOptions::default()
            .compression_method(self.method.to_zip())
            .large_file(size >= u32::MAX as u64);
        // zip rejects any level on stored entries
        if self.method == CompressionMethod::Deflated {
            options = options.compression_level(Some(self.level as i32));
        }
        match mode {
            Some(mode) if self.preserve_permissions => options.unix_permissions(mode & 0o7777),
            _ => options,
        }
    }
}

/// Result of a write operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of file entries written.
    pub entries_written: usize,
    /// Number of symlink entries written.
    pub symlinks_written: usize,
    /// Number of source paths left out (special files, skipped symlinks).
    pub entries_skipped: usize,
    /// Total uncompressed bytes of file entries.
    pub total_size: u64,
    /// Size of the finished archive file in bytes.
    pub compressed_size: u64,
}

impl WriteResult {
    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings as a fraction.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}
