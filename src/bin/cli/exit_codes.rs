//! Exit codes for the CLI tool.

use fsx::{Error, ErrorKind};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Destination already exists
pub const ALREADY_EXISTS: i32 = 6;
/// Archive tried to escape the destination or exceeded a limit
pub const UNSAFE_ARCHIVE: i32 = 7;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    IoError,
    AlreadyExists,
    UnsafeArchive,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::AlreadyExists => ALREADY_EXISTS,
            Self::UnsafeArchive => UNSAFE_ARCHIVE,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an fsx error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_security_violation() {
        return ExitCode::UnsafeArchive;
    }
    match error.kind() {
        ErrorKind::AlreadyExists => ExitCode::AlreadyExists,
        ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::Io => ExitCode::IoError,
        ErrorKind::InvalidArchive => ExitCode::BadArchive,
        ErrorKind::InvalidInput => ExitCode::BadArgs,
        // Unsupported plus future kinds - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
