//! Safety and resource limit utilities.
//!
//! This module holds everything [`extract`](crate::extract) uses to defend
//! against hostile archives: path validation (traversal and symlink escapes)
//! and decompression-bomb limits (per-entry size, compression ratio and total
//! size).

use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Result};

/// Policy for validating extraction paths.
///
/// The default is `Strict`, which blocks every form of path traversal,
/// including escapes through symlinks that already exist under the
/// destination.
///
/// # Examples
///
/// ```rust
/// use fsx::safety::PathSafety;
///
/// let policy = PathSafety::default();
/// assert_eq!(policy, PathSafety::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSafety {
    /// Strict validation: block any potential path traversal.
    ///
    /// - Rejects names containing `..` components
    /// - Rejects absolute names (`/x`; on Windows also `\x` and `C:\x`)
    /// - Verifies that the canonical target stays within the canonical
    ///   destination directory
    #[default]
    Strict,
    /// Reject `..` components and absolute names, but skip canonicalization.
    ///
    /// Cheaper than `Strict`, but does not notice symlinks inside the
    /// destination that point elsewhere.
    Relaxed,
    /// Disables all path validation (DANGEROUS).
    ///
    /// Entry names are joined to the destination verbatim. A hostile archive
    /// can overwrite any file the process can write. Only use this for
    /// archives you produced yourself.
    Disabled,
}

/// Characters that separate entry name segments on this platform.
///
/// On Unix a `\` is an ordinary file name character, so names written by
/// [`create`](crate::create) from a Unix tree extract to the same files.
#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

/// Splits an entry name into segments, dropping empty and `.` segments.
fn name_segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(SEPARATORS)
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

fn is_absolute_name(name: &str) -> bool {
    if name.starts_with(SEPARATORS) {
        return true;
    }
    let bytes = name.as_bytes();
    cfg!(windows) && bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Resolves `path` through the filesystem as far as it exists.
///
/// The deepest existing prefix is canonicalized (following every symlink in
/// it) and the remaining components are applied lexically. Returns `None`
/// when no prefix exists or the deepest one is a dangling symlink.
fn resolve_existing(path: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        if prefix.symlink_metadata().is_err() {
            continue;
        }
        let mut resolved = prefix.canonicalize().ok()?;
        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => resolved.push(name),
                _ => {}
            }
        }
        return Some(resolved);
    }
    None
}

/// Validates an extraction path against the given safety policy.
///
/// # Arguments
///
/// * `entry_name` - The raw entry name stored in the archive
/// * `dest_root` - The destination directory; must exist for `Strict`
/// * `policy` - The path safety policy to enforce
/// * `entry_index` - Index of the entry (for error reporting)
///
/// # Returns
///
/// The full path to write the entry to, or [`Error::PathTraversal`].
///
/// # Examples
///
/// ```rust
/// use fsx::Error;
/// use fsx::safety::{PathSafety, validate_extract_path};
///
/// let dest = std::env::temp_dir();
/// let ok = validate_extract_path("sub/b.txt", &dest, PathSafety::Strict, 0).unwrap();
/// assert!(ok.ends_with("sub/b.txt"));
///
/// let err = validate_extract_path("../../etc/passwd", &dest, PathSafety::Strict, 1);
/// assert!(matches!(err, Err(Error::PathTraversal { entry_index: 1, .. })));
/// ```
pub fn validate_extract_path(
    entry_name: &str,
    dest_root: &Path,
    policy: PathSafety,
    entry_index: usize,
) -> Result<PathBuf> {
    let traversal = || Error::PathTraversal {
        entry_index,
        path: entry_name.to_string(),
    };

    if policy == PathSafety::Disabled {
        return Ok(dest_root.join(entry_name));
    }

    if entry_name.contains('\0') {
        return Err(Error::InvalidArchivePath(format!(
            "entry {} name contains NUL byte",
            entry_index
        )));
    }

    if is_absolute_name(entry_name) || name_segments(entry_name).any(|s| s == "..") {
        return Err(traversal());
    }

    let mut full_path = dest_root.to_path_buf();
    let mut depth = 0usize;
    for segment in name_segments(entry_name) {
        full_path.push(segment);
        depth += 1;
    }
    if depth == 0 {
        return Err(Error::InvalidArchivePath(format!(
            "entry {} has an empty name",
            entry_index
        )));
    }

    if policy == PathSafety::Relaxed {
        return Ok(full_path);
    }

    // The destination root MUST be canonicalizable; propagate the I/O error.
    let canonical_dest = dest_root
        .canonicalize()
        .map_err(|e| Error::from_io(e, dest_root))?;

    // A dangling symlink cannot be canonicalized; containment is unprovable.
    let resolved = resolve_existing(&full_path).ok_or_else(traversal)?;

    // Final containment check; this MUST NOT be bypassed.
    if !resolved.starts_with(&canonical_dest) {
        return Err(traversal());
    }

    Ok(full_path)
}

/// Validates that a symlink target doesn't escape the extraction directory.
///
/// `entry_name` is the link's own name inside the archive and `link_path`
/// the place it will be created (as returned by [`validate_extract_path`]).
///
/// Two checks run. Lexically, `..` may only lead the target and may not
/// climb above the link's depth in the archive; a `..` after a named
/// segment would be resolved through whatever that segment is on disk,
/// possibly a link created by an earlier entry. On the filesystem, the
/// target is resolved from the link's real parent directory, following
/// links that already exist, and must stay under the canonical
/// `dest_root`.
///
/// # Errors
///
/// Returns [`Error::SymlinkTargetEscape`] if either check fails, or an I/O
/// error if `dest_root` cannot be canonicalized.
pub fn validate_symlink_target(
    entry_index: usize,
    entry_name: &str,
    target: &str,
    link_path: &Path,
    dest_root: &Path,
) -> Result<()> {
    let escape = || Error::SymlinkTargetEscape {
        entry_index,
        path: entry_name.to_string(),
        target: target.to_string(),
    };

    if target.is_empty() || is_absolute_name(target) {
        return Err(escape());
    }

    let mut depth = name_segments(entry_name).count() as i64 - 1;
    let mut named = false;
    for segment in name_segments(target) {
        if segment == ".." {
            depth -= 1;
            if named || depth < 0 {
                return Err(escape());
            }
        } else {
            named = true;
            depth += 1;
        }
    }

    let canonical_dest = dest_root
        .canonicalize()
        .map_err(|e| Error::from_io(e, dest_root))?;
    let parent = link_path.parent().unwrap_or(dest_root);
    let mut candidate = parent.to_path_buf();
    for segment in name_segments(target) {
        candidate.push(segment);
    }
    match resolve_existing(&candidate) {
        Some(resolved) if resolved.starts_with(&canonical_dest) => Ok(()),
        _ => Err(escape()),
    }
}

/// Mode for handling resource limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitMode {
    /// Return an error when the limit is exceeded.
    #[default]
    HardError,
    /// Log a warning but continue.
    Warn,
    /// Ignore the limit.
    Ignore,
}

/// Compression ratio limit configuration.
#[derive(Debug, Clone)]
pub struct RatioLimit {
    /// Maximum allowed compression ratio (uncompressed / compressed).
    pub max_ratio: u32,
    /// How to handle limit violations.
    pub mode: LimitMode,
}

impl Default for RatioLimit {
    fn default() -> Self {
        Self {
            max_ratio: 1000,
            mode: LimitMode::HardError,
        }
    }
}

impl RatioLimit {
    /// Creates a new ratio limit.
    pub fn new(max_ratio: u32) -> Self {
        Self {
            max_ratio,
            mode: LimitMode::HardError,
        }
    }

    /// Sets the mode for handling violations.
    pub fn mode(mut self, mode: LimitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks a compressed/uncompressed size pair against the limit.
    ///
    /// Returns a description of the violation, or `None` when the pair is
    /// acceptable (or the mode says to let it through).
    ///
    /// # Edge Cases
    ///
    /// - Both sizes 0: acceptable (empty file)
    /// - Compressed 0, uncompressed > 0: infinite ratio, a violation
    /// - Compressed > 0, uncompressed 0: acceptable
    pub fn check(&self, compressed_size: u64, uncompressed_size: u64) -> Option<String> {
        let violation = if compressed_size == 0 {
            (uncompressed_size > 0).then(|| {
                format!(
                    "infinite compression ratio ({} bytes from 0 compressed)",
                    uncompressed_size
                )
            })
        } else {
            // Multiply instead of dividing so fractional ratios are not truncated.
            let max_uncompressed = (self.max_ratio as u64).saturating_mul(compressed_size);
            (uncompressed_size > max_uncompressed).then(|| {
                format!(
                    "compression ratio {}:1 exceeds limit {}:1 (compressed: {}, uncompressed: {})",
                    uncompressed_size / compressed_size,
                    self.max_ratio,
                    compressed_size,
                    uncompressed_size
                )
            })
        };

        match (violation, self.mode) {
            (Some(reason), LimitMode::HardError) => Some(reason),
            (Some(reason), LimitMode::Warn) => {
                log::warn!("{}", reason);
                None
            }
            _ => None,
        }
    }
}

/// Resource limits for extraction.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum number of entries in one archive.
    pub max_entries: usize,
    /// Maximum total unpacked size for all entries.
    pub max_total_unpacked: u64,
    /// Maximum unpacked size for a single entry.
    pub max_entry_unpacked: u64,
    /// Compression ratio limit (for bomb protection).
    pub ratio_limit: Option<RatioLimit>,
}

impl Default for ResourceLimits {
    /// Creates resource limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_entries` | 1,000,000 |
    /// | `max_total_unpacked` | 1 TiB |
    /// | `max_entry_unpacked` | 64 GiB |
    /// | `ratio_limit` | none |
    ///
    /// DEFLATE output of a single repeated byte compresses about 1000:1, so a
    /// ratio limit would reject archives `create` writes. Opt in with
    /// [`ResourceLimits::ratio_limit`] when extracting untrusted input.
    ///
    /// Use [`ResourceLimits::unlimited()`] to disable all limits.
    fn default() -> Self {
        Self {
            max_entries: 1_000_000,
            max_total_unpacked: 1 << 40,
            max_entry_unpacked: 64 << 30,
            ratio_limit: None,
        }
    }
}

impl ResourceLimits {
    /// Creates new resource limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates resource limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_entries: usize::MAX,
            max_total_unpacked: u64::MAX,
            max_entry_unpacked: u64::MAX,
            ratio_limit: None,
        }
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Sets the maximum total unpacked size.
    pub fn max_total_unpacked(mut self, max: u64) -> Self {
        self.max_total_unpacked = max;
        self
    }

    /// Sets the maximum entry unpacked size.
    pub fn max_entry_unpacked(mut self, max: u64) -> Self {
        self.max_entry_unpacked = max;
        self
    }

    /// Sets the compression ratio limit.
    pub fn ratio_limit(mut self, limit: Option<RatioLimit>) -> Self {
        self.ratio_limit = limit;
        self
    }
}

/// A reader wrapper that enforces resource limits while decompressing.
///
/// The limits are checked against bytes actually produced, so an archive
/// that lies about sizes in its directory cannot slip past them. Violations
/// surface as an [`io::Error`] wrapping [`Error::EntryTooLarge`]; callers in
/// this crate unwrap it back into the typed error.
pub struct LimitedReader<R> {
    inner: R,
    entry_index: usize,
    entry_name: String,
    max_entry_bytes: u64,
    bytes_read: u64,
    compressed_size: u64,
    ratio_limit: Option<RatioLimit>,
    total_tracker: Option<Arc<AtomicU64>>,
    max_total_bytes: u64,
}

impl<R> LimitedReader<R> {
    /// Creates a new limited reader for the given entry.
    pub fn new(inner: R, entry_index: usize, entry_name: impl Into<String>) -> Self {
        Self {
            inner,
            entry_index,
            entry_name: entry_name.into(),
            max_entry_bytes: u64::MAX,
            bytes_read: 0,
            compressed_size: 0,
            ratio_limit: None,
            total_tracker: None,
            max_total_bytes: u64::MAX,
        }
    }

    /// Sets the maximum bytes for this entry.
    pub fn max_entry_bytes(mut self, max: u64) -> Self {
        self.max_entry_bytes = max;
        self
    }

    /// Sets the compressed size and ratio limit for ratio checking.
    pub fn ratio_limit(mut self, compressed_size: u64, limit: RatioLimit) -> Self {
        self.compressed_size = compressed_size;
        self.ratio_limit = Some(limit);
        self
    }

    /// Sets a shared tracker for total bytes.
    pub fn total_tracker(mut self, tracker: Arc<AtomicU64>, max_total: u64) -> Self {
        self.total_tracker = Some(tracker);
        self.max_total_bytes = max_total;
        self
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn too_large(&self, reason: String) -> io::Error {
        io::Error::other(Error::EntryTooLarge {
            entry_index: self.entry_index,
            path: self.entry_name.clone(),
            reason,
        })
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            return Ok(0);
        }

        self.bytes_read += n as u64;

        if self.bytes_read > self.max_entry_bytes {
            return Err(self.too_large(format!(
                "entry size {} exceeds limit {}",
                self.bytes_read, self.max_entry_bytes
            )));
        }

        if let Some(ref limit) = self.ratio_limit {
            if limit.mode == LimitMode::HardError {
                if let Some(reason) = limit.check(self.compressed_size, self.bytes_read) {
                    return Err(self.too_large(reason));
                }
            }
        }

        if let Some(ref tracker) = self.total_tracker {
            let total = tracker.fetch_add(n as u64, Ordering::Relaxed) + n as u64;
            if total > self.max_total_bytes {
                return Err(self.too_large(format!(
                    "total extracted size {} exceeds limit {}",
                    total, self.max_total_bytes
                )));
            }
        }

        Ok(n)
    }
}

impl<R> std::fmt::Debug for LimitedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitedReader")
            .field("entry_index", &self.entry_index)
            .field("entry_name", &self.entry_name)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("bytes_read", &self.bytes_read)
            .field("compressed_size", &self.compressed_size)
            .field("ratio_limit", &self.ratio_limit)
            .finish_non_exhaustive()
    }
}
