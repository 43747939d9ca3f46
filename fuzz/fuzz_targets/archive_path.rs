//! Fuzz target for entry name validation with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Key security properties being tested:
//! - Path traversal rejection (../)
//! - Absolute path rejection
//! - NUL byte handling
//! - Extraction targets always resolve under the destination

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    let Ok(path_str) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(path) = fsx::ArchivePath::new(path_str) {
        let normalized = path.as_str();

        assert!(
            !normalized.split('/').any(|seg| seg == ".."),
            "Path traversal found in normalized path: {:?}",
            normalized
        );
        assert!(
            !normalized.starts_with('/'),
            "Absolute path accepted: {:?}",
            normalized
        );
        assert!(
            !normalized.contains('\0'),
            "NUL byte in normalized path: {:?}",
            normalized
        );
    }

    let dest = Path::new("/fuzz/dest");
    for policy in [fsx::PathSafety::Strict, fsx::PathSafety::Relaxed] {
        if let Ok(target) = fsx::validate_extract_path(path_str, dest, policy, 0) {
            assert!(
                target.starts_with(dest),
                "{:?} resolved outside destination: {:?}",
                path_str,
                target
            );
        }
    }
});
