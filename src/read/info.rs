//! Extraction statistics.

/// Result of an extraction operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractResult {
    /// Number of file entries written.
    pub entries_extracted: usize,
    /// Number of entries left alone (existing files under
    /// [`OverwritePolicy::Skip`](super::OverwritePolicy::Skip), forbidden
    /// symlinks).
    pub entries_skipped: usize,
    /// Number of symbolic links created.
    pub symlinks_created: usize,
    /// Total decompressed bytes written.
    pub bytes_extracted: u64,
}

impl ExtractResult {
    /// Returns the number of filesystem objects created (files and links).
    pub fn total_created(&self) -> usize {
        self.entries_extracted + self.symlinks_created
    }
}
