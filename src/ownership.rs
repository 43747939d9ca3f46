//! Unix file ownership support.
//!
//! Reading and changing the owning user and group of a path. On non-Unix
//! platforms queries return `None` and changes fail with
//! [`Error::UnsupportedFeature`].

use std::path::Path;

use crate::{Error, Result};

/// Unix file ownership information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnixOwnership {
    /// User ID (UID).
    pub uid: Option<u32>,
    /// Group ID (GID).
    pub gid: Option<u32>,
}

impl UnixOwnership {
    /// Creates ownership from UID and GID.
    pub fn from_ids(uid: u32, gid: u32) -> Self {
        Self {
            uid: Some(uid),
            gid: Some(gid),
        }
    }

    /// Changes only the owning user; the group is left as is.
    pub fn user(uid: u32) -> Self {
        Self {
            uid: Some(uid),
            gid: None,
        }
    }

    /// Returns true if any ownership information is present.
    pub fn is_present(&self) -> bool {
        self.uid.is_some() || self.gid.is_some()
    }

    /// Reads ownership from file metadata.
    #[cfg(unix)]
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        Some(Self::from_ids(metadata.uid(), metadata.gid()))
    }

    /// Reads ownership from file metadata.
    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &std::fs::Metadata) -> Option<Self> {
        None
    }

    /// Applies ownership to a path, following symlinks.
    ///
    /// Fields that are `None` are left unchanged. Requires the usual
    /// privileges for `chown(2)`.
    #[cfg(unix)]
    pub fn apply_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !self.is_present() {
            return Ok(());
        }
        std::os::unix::fs::chown(path, self.uid, self.gid).map_err(|e| Error::from_io(e, path))
    }

    /// Applies ownership to a path.
    #[cfg(not(unix))]
    pub fn apply_to_path(&self, _path: impl AsRef<Path>) -> Result<()> {
        Err(Error::UnsupportedFeature {
            feature: "file ownership on this platform",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let both = UnixOwnership::from_ids(1000, 100);
        assert_eq!(both.uid, Some(1000));
        assert_eq!(both.gid, Some(100));
        assert!(both.is_present());

        let user = UnixOwnership::user(0);
        assert_eq!(user.gid, None);
        assert!(!UnixOwnership::default().is_present());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_metadata_matches_process_owner_for_new_file() {
        use std::os::unix::fs::MetadataExt;

        let file = tempfile::NamedTempFile::new().unwrap();
        let meta = std::fs::metadata(file.path()).unwrap();
        let owner = UnixOwnership::from_metadata(&meta).unwrap();
        assert_eq!(owner.uid, Some(meta.uid()));
        assert_eq!(owner.gid, Some(meta.gid()));
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_same_owner_is_noop() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let meta = std::fs::metadata(file.path()).unwrap();
        let owner = UnixOwnership::from_metadata(&meta).unwrap();
        // chown to the current owner never needs privileges.
        owner.apply_to_path(file.path()).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = UnixOwnership::user(0)
            .apply_to_path(dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
