//! Validated entry names for archives.
//!
//! Every entry written by this crate goes through [`ArchivePath`], so an
//! archive produced by [`create`](crate::create) never contains names that
//! [`extract`](crate::extract) would refuse.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path};

/// Maximum length for entry names (in bytes).
const MAX_PATH_LENGTH: usize = 32 * 1024;

/// Windows reserved device names.
///
/// [`ArchivePath::new`] rejects them on all platforms so hand-built names
/// extract cleanly on Windows. Names taken from files that already exist on
/// disk are accepted.
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Case-insensitive; `CON.txt` is reserved too.
fn is_windows_reserved(name: &str) -> bool {
    let base = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
}

/// A relative, `/`-separated entry name.
///
/// `ArchivePath` guarantees that:
/// - the name is non-empty and contains no NUL bytes
/// - the name is not absolute (does not start with `/`)
/// - there are no empty segments (no `//` or trailing `/`)
/// - there are no `.` or `..` segments
/// - the name is at most 32 KiB long
/// - on Windows, the name has no `\` and no drive prefix
///
/// [`ArchivePath::new`] also rejects Windows reserved device names such as
/// `CON` or `nul.txt`. [`ArchivePath::from_relative`] does not, since the
/// file it names exists and extracts back to the same place.
///
/// # Examples
///
/// ```
/// use fsx::ArchivePath;
///
/// let path = ArchivePath::new("sub/b.txt").unwrap();
/// assert_eq!(path.as_str(), "sub/b.txt");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchivePath`] if the name breaks any of the
    /// rules listed on the type.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Self::reject_reserved(s)?;
        Ok(Self(s.to_string()))
    }

    /// Builds an entry name from a path relative to a walked root.
    ///
    /// Platform separators are normalized to `/`. Non-UTF-8 components are
    /// rejected rather than lossily converted, since a lossy name would not
    /// round-trip. Reserved device names are kept: on Unix `con.txt` is an
    /// ordinary file.
    ///
    /// ```
    /// use fsx::ArchivePath;
    /// use std::path::Path;
    ///
    /// let name = ArchivePath::from_relative(Path::new("sub").join("b.txt").as_path()).unwrap();
    /// assert_eq!(name.as_str(), "sub/b.txt");
    /// ```
    pub fn from_relative(path: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| {
                        Error::InvalidArchivePath(format!(
                            "non UTF-8 component in '{}'",
                            path.display()
                        ))
                    })?;
                    segments.push(name);
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidArchivePath(format!(
                        "'{}' is not a plain relative path",
                        path.display()
                    )));
                }
            }
        }
        let name = segments.join("/");
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn reject_reserved(s: &str) -> Result<()> {
        match s.split('/').find(|segment| is_windows_reserved(segment)) {
            Some(segment) => Err(Error::InvalidArchivePath(format!(
                "Windows reserved filename '{}' not allowed",
                segment
            ))),
            None => Ok(()),
        }
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        #[cfg(windows)]
        {
            let bytes = s.as_bytes();
            if s.contains('\\') || (bytes.len() >= 2 && bytes[1] == b':') {
                return Err(Error::InvalidArchivePath(
                    "backslash or drive prefix not allowed".into(),
                ));
            }
        }

        if s.ends_with('/') {
            return Err(Error::InvalidArchivePath(
                "trailing slash not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the name.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the parent entry name, if this name has more than one segment.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns an iterator over the `/`-separated segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Self::reject_reserved(&s)?;
        Ok(Self(s))
    }
}
