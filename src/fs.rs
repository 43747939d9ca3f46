//! Path handles with cached metadata.
//!
//! A [`PathHandle`] is an absolute, lexically cleaned path plus a metadata
//! snapshot fetched on first use. Type and permission queries read the
//! snapshot; filesystem operations (mkdir, remove, chmod, ...) act on the
//! live path and never touch the snapshot. Call [`PathHandle::refresh`] to
//! drop a snapshot that may have gone stale.
//!
//! # Example
//!
//! ```rust,no_run
//! use fsx::PathHandle;
//!
//! let logs = PathHandle::new("logs")?;
//! if logs.is_dir() {
//!     let result = logs.zip("logs.zip")?;
//!     println!("{} files archived", result.entries_written);
//! }
//!
//! let archive = PathHandle::new("logs.zip")?;
//! println!("sha256 {}", archive.sha256()?);
//! archive.unzip("restored")?;
//! # Ok::<(), fsx::Error>(())
//! ```
//!
//! # Symlinks
//!
//! The snapshot is taken with [`std::fs::symlink_metadata`], so a symlink is
//! reported as a symlink rather than as whatever it points at.

use std::cell::OnceCell;
use std::fs::{self, File, Metadata, OpenOptions};
use std::path::{Component, Path, PathBuf};

use crate::checksum::{Checksum, Md5, Sha256};
use crate::ownership::UnixOwnership;
use crate::read::{ExtractOptions, ExtractResult};
use crate::write::{WriteOptions, WriteResult};
use crate::{Error, Result};

#[cfg(unix)]
const S_ISUID: u32 = 0o4000;
#[cfg(unix)]
const S_ISGID: u32 = 0o2000;
#[cfg(unix)]
const S_ISVTX: u32 = 0o1000;

/// An absolute filesystem path with a lazily cached metadata snapshot.
#[derive(Debug, Clone)]
pub struct PathHandle {
    path: PathBuf,
    metadata: OnceCell<Metadata>,
}

impl PathHandle {
    /// Creates a handle, resolving relative paths against the current
    /// directory.
    ///
    /// `.` and `..` components are removed lexically; symlinks are not
    /// resolved. No filesystem access happens here beyond reading the
    /// current directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|e| Error::from_io(e, path))?;
        Ok(Self {
            path: clean(&absolute),
            metadata: OnceCell::new(),
        })
    }

    /// Returns the absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last path component, or the path itself for a root.
    pub fn base(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.path.to_string_lossy().into_owned(),
        }
    }

    /// Returns the extension of the last component, without the dot.
    pub fn ext(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Returns the metadata snapshot, fetching it on first call.
    ///
    /// Failures are not cached: a path that does not exist yet is looked up
    /// again on the next call.
    pub fn metadata(&self) -> Result<&Metadata> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let fetched = fs::symlink_metadata(&self.path).map_err(|e| self.err(e))?;
        Ok(self.metadata.get_or_init(|| fetched))
    }

    /// Drops the metadata snapshot so the next query re-reads it.
    pub fn refresh(&mut self) {
        self.metadata.take();
    }

    /// Returns true if the path exists.
    pub fn exists(&self) -> bool {
        self.metadata().is_ok()
    }

    /// Returns true if the path is a directory.
    pub fn is_dir(&self) -> bool {
        self.metadata().is_ok_and(|m| m.is_dir())
    }

    /// Returns true if the path exists and is not a directory.
    ///
    /// This includes symlinks and special files; see
    /// [`is_regular`](Self::is_regular) for plain files only.
    pub fn is_file(&self) -> bool {
        self.metadata().is_ok_and(|m| !m.is_dir())
    }

    /// Returns true if the path is a regular file.
    pub fn is_regular(&self) -> bool {
        self.metadata().is_ok_and(|m| m.file_type().is_file())
    }

    /// Returns true if the path itself is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.metadata().is_ok_and(|m| m.file_type().is_symlink())
    }

    /// Returns true if the path is a Unix domain socket.
    pub fn is_socket(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            self.metadata().is_ok_and(|m| m.file_type().is_socket())
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the path is a named pipe (FIFO).
    pub fn is_named_pipe(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            self.metadata().is_ok_and(|m| m.file_type().is_fifo())
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the path is a character device.
    pub fn is_char_device(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            self.metadata().is_ok_and(|m| m.file_type().is_char_device())
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the path is a block device.
    pub fn is_block_device(&self) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            self.metadata().is_ok_and(|m| m.file_type().is_block_device())
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the path is a character or block device.
    pub fn is_device(&self) -> bool {
        self.is_char_device() || self.is_block_device()
    }

    /// Returns true if the set-user-ID bit is set.
    pub fn is_setuid(&self) -> bool {
        #[cfg(unix)]
        {
            self.mode_has(S_ISUID)
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the set-group-ID bit is set.
    pub fn is_setgid(&self) -> bool {
        #[cfg(unix)]
        {
            self.mode_has(S_ISGID)
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Returns true if the sticky bit is set.
    pub fn is_sticky(&self) -> bool {
        #[cfg(unix)]
        {
            self.mode_has(S_ISVTX)
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    #[cfg(unix)]
    fn mode_has(&self, bit: u32) -> bool {
        self.permissions().is_ok_and(|mode| mode & bit != 0)
    }

    /// Returns the permission bits (including setuid/setgid/sticky).
    ///
    /// On non-Unix platforms this is synthesized from the read-only flag.
    pub fn permissions(&self) -> Result<u32> {
        let metadata = self.metadata()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Ok(metadata.permissions().mode() & 0o7777)
        }
        #[cfg(not(unix))]
        {
            Ok(if metadata.permissions().readonly() {
                0o444
            } else {
                0o644
            })
        }
    }

    /// Returns the owning user and group, if the platform has them.
    pub fn owner(&self) -> Result<Option<UnixOwnership>> {
        Ok(UnixOwnership::from_metadata(self.metadata()?))
    }

    /// Creates the directory and any missing parents with the given mode.
    ///
    /// Succeeds if the directory already exists.
    pub fn mkdir(&self, mode: u32) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(&self.path).map_err(|e| self.err(e))
    }

    /// Opens the file read-only.
    pub fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| self.err(e))
    }

    /// Creates or truncates the file for writing.
    ///
    /// `mode` applies only when the file is newly created.
    pub fn create_file(&self, mode: u32) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        self.open_with(&options)
    }

    /// Opens the file with caller-supplied options.
    pub fn open_with(&self, options: &OpenOptions) -> Result<File> {
        options.open(&self.path).map_err(|e| self.err(e))
    }

    /// Removes a file, symlink, or empty directory.
    pub fn remove(&self) -> Result<()> {
        let live = fs::symlink_metadata(&self.path).map_err(|e| self.err(e))?;
        if live.is_dir() {
            fs::remove_dir(&self.path)
        } else {
            fs::remove_file(&self.path)
        }
        .map_err(|e| self.err(e))
    }

    /// Removes the path and everything below it.
    ///
    /// A path that does not exist is not an error.
    pub fn remove_all(&self) -> Result<()> {
        let live = match fs::symlink_metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(self.err(e)),
        };
        if live.is_dir() {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_file(&self.path)
        }
        .map_err(|e| self.err(e))
    }

    /// Renames the path and returns a handle to the new location.
    ///
    /// The returned handle starts with no metadata snapshot.
    pub fn rename(self, to: impl AsRef<Path>) -> Result<PathHandle> {
        let target = PathHandle::new(to)?;
        fs::rename(&self.path, &target.path).map_err(|e| self.err(e))?;
        Ok(target)
    }

    /// Alias of [`rename`](Self::rename).
    pub fn move_to(self, to: impl AsRef<Path>) -> Result<PathHandle> {
        self.rename(to)
    }

    /// Truncates or extends the file to `size` bytes.
    pub fn truncate(&self, size: u64) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| self.err(e))?;
        file.set_len(size).map_err(|e| self.err(e))
    }

    /// Sets the permission bits.
    ///
    /// On non-Unix platforms only the owner write bit is honored (it maps to
    /// the read-only flag).
    pub fn chmod(&self, mode: u32) -> Result<()> {
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode)
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut permissions = fs::metadata(&self.path)
                .map_err(|e| self.err(e))?
                .permissions();
            permissions.set_readonly(mode & 0o200 == 0);
            permissions
        };
        fs::set_permissions(&self.path, permissions).map_err(|e| self.err(e))
    }

    /// Changes the owning user and group.
    pub fn chown(&self, uid: u32, gid: u32) -> Result<()> {
        UnixOwnership::from_ids(uid, gid).apply_to_path(&self.path)
    }

    /// Changes the owning user, leaving the group unchanged.
    pub fn chown_uid(&self, uid: u32) -> Result<()> {
        UnixOwnership::user(uid).apply_to_path(&self.path)
    }

    /// Returns the MD5 digest of the file contents as lower-case hex.
    pub fn md5(&self) -> Result<String> {
        Md5::compute_file(&self.path)
    }

    /// Returns the SHA-256 digest of the file contents as lower-case hex.
    pub fn sha256(&self) -> Result<String> {
        Sha256::compute_file(&self.path)
    }

    /// Archives this directory into a new zip file at `dest`.
    ///
    /// See [`create`](crate::create).
    pub fn zip(&self, dest: impl AsRef<Path>) -> Result<WriteResult> {
        self.zip_with(dest, &WriteOptions::default())
    }

    /// Archives this directory with explicit options.
    pub fn zip_with(&self, dest: impl AsRef<Path>, options: &WriteOptions) -> Result<WriteResult> {
        crate::write::create(&self.path, dest, options)
    }

    /// Extracts this zip file under `dest`.
    ///
    /// See [`extract`](crate::extract).
    pub fn unzip(&self, dest: impl AsRef<Path>) -> Result<ExtractResult> {
        self.unzip_with(dest, &ExtractOptions::default())
    }

    /// Extracts this zip file with explicit options.
    pub fn unzip_with(
        &self,
        dest: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        crate::read::extract(&self.path, dest, options)
    }

    fn err(&self, e: std::io::Error) -> Error {
        Error::from_io(e, &self.path)
    }
}

impl AsRef<Path> for PathHandle {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Removes `.` and `..` components lexically.
///
/// `..` at the root stays at the root, as on every Unix.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    cleaned.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_makes_absolute() {
        let handle = PathHandle::new("some/relative/file.txt").unwrap();
        assert!(handle.path().is_absolute());
        assert!(handle.path().ends_with("some/relative/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(clean(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn test_base_and_ext() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PathHandle::new(dir.path().join("report.tar.gz")).unwrap();
        assert_eq!(handle.base(), "report.tar.gz");
        assert_eq!(handle.ext(), Some("gz"));

        let handle = PathHandle::new(dir.path().join("Makefile")).unwrap();
        assert_eq!(handle.ext(), None);
    }

    #[test]
    fn test_missing_path_queries_are_false() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PathHandle::new(dir.path().join("missing")).unwrap();
        assert!(!handle.exists());
        assert!(!handle.is_dir());
        assert!(!handle.is_file());
        assert!(!handle.is_regular());
        assert!(!handle.is_symlink());
        assert!(!handle.is_setuid());
        assert!(matches!(handle.metadata(), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_snapshot_is_cached_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();

        let mut handle = PathHandle::new(&file).unwrap();
        assert_eq!(handle.metadata().unwrap().len(), 5);

        fs::write(&file, b"hello world").unwrap();
        assert_eq!(handle.metadata().unwrap().len(), 5);

        handle.refresh();
        assert_eq!(handle.metadata().unwrap().len(), 11);
    }

    #[test]
    fn test_missing_path_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PathHandle::new(dir.path().join("later")).unwrap();
        assert!(!handle.exists());
        handle.mkdir(0o755).unwrap();
        assert!(handle.exists());
        assert!(handle.is_dir());
    }

    #[test]
    fn test_regular_file_queries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();
        let handle = PathHandle::new(&file).unwrap();
        assert!(handle.exists());
        assert!(handle.is_file());
        assert!(handle.is_regular());
        assert!(!handle.is_dir());
        assert!(!handle.is_symlink());
        assert!(!handle.is_device());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_reported_as_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let handle = PathHandle::new(&link).unwrap();
        assert!(handle.is_symlink());
        assert!(!handle.is_dir());
        assert!(handle.is_file());
        assert!(!handle.is_regular());
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_bits() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.sh");
        fs::write(&file, b"#!/bin/sh\n").unwrap();

        let mut handle = PathHandle::new(&file).unwrap();
        handle.chmod(0o1755).unwrap();
        handle.refresh();
        assert_eq!(handle.permissions().unwrap() & 0o777, 0o755);

        handle.chmod(0o2750).unwrap();
        handle.refresh();
        assert!(handle.is_setgid());
        assert!(!handle.is_setuid());
    }

    #[cfg(unix)]
    #[test]
    fn test_sticky_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        let mut handle = PathHandle::new(&shared).unwrap();
        handle.mkdir(0o755).unwrap();
        handle.chmod(0o1777).unwrap();
        handle.refresh();
        assert!(handle.is_sticky());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_matches_metadata() {
        use std::os::unix::fs::MetadataExt;

        let file = tempfile::NamedTempFile::new().unwrap();
        let handle = PathHandle::new(file.path()).unwrap();
        let owner = handle.owner().unwrap().unwrap();
        let meta = fs::metadata(file.path()).unwrap();
        assert_eq!(owner.uid, Some(meta.uid()));
        // Re-chowning to ourselves needs no privileges.
        handle.chown(meta.uid(), meta.gid()).unwrap();
        handle.chown_uid(meta.uid()).unwrap();
    }

    #[test]
    fn test_create_write_truncate() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut handle = PathHandle::new(dir.path().join("data.bin")).unwrap();
        {
            let mut file = handle.create_file(0o600).unwrap();
            file.write_all(b"0123456789").unwrap();
        }
        handle.truncate(4).unwrap();
        handle.refresh();
        assert_eq!(handle.metadata().unwrap().len(), 4);
        assert_eq!(fs::read(handle.path()).unwrap(), b"0123");

        let mut options = OpenOptions::new();
        options.append(true);
        handle.open_with(&options).unwrap().write_all(b"xy").unwrap();
        assert_eq!(fs::read(handle.path()).unwrap(), b"0123xy");
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PathHandle::new(dir.path().join("missing.txt")).unwrap();
        assert!(matches!(handle.open(), Err(Error::NotFound { .. })));
        assert!(matches!(handle.truncate(0), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_rename_returns_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("old.txt");
        fs::write(&from, b"payload").unwrap();

        let handle = PathHandle::new(&from).unwrap();
        let moved = handle.rename(dir.path().join("new.txt")).unwrap();
        assert_eq!(moved.base(), "new.txt");
        assert!(moved.exists());
        assert!(!from.exists());

        let back = moved.move_to(&from).unwrap();
        assert!(back.is_regular());
    }

    #[test]
    fn test_remove_and_remove_all() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("a/b/c.txt"), b"x").unwrap();

        let handle = PathHandle::new(&tree).unwrap();
        // Non-empty directory cannot be removed with remove()
        assert!(handle.remove().is_err());
        handle.remove_all().unwrap();
        assert!(!tree.exists());
        // Second remove_all on a missing path is fine
        handle.remove_all().unwrap();

        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        PathHandle::new(&file).unwrap().remove().unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hello.txt");
        fs::write(&file, b"hello").unwrap();
        let handle = PathHandle::new(&file).unwrap();
        assert_eq!(handle.md5().unwrap(), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(
            handle.sha256().unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hash_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PathHandle::new(dir.path().join("nope")).unwrap();
        assert!(matches!(handle.md5(), Err(Error::NotFound { .. })));
    }
}
