//! Fuzz target for opening and extracting arbitrary bytes as a zip archive.
//!
//! Run with: cargo +nightly fuzz run extract
//!
//! Whatever the input, extraction must not panic and must never create
//! anything next to the destination directory.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let Ok(mut archive) = fsx::Archive::open(Cursor::new(data)) else {
        return;
    };
    for entry in archive.entries() {
        let _ = entry.name.as_str();
        let _ = entry.permissions();
        let _ = entry.is_file();
    }

    let Ok(scratch) = tempfile::tempdir() else {
        return;
    };
    let dest = scratch.path().join("dest");
    let options = fsx::ExtractOptions::new()
        .link_policy(fsx::LinkPolicy::ValidateTargets)
        .limits(
            fsx::ResourceLimits::new()
                .max_entries(1024)
                .max_total_unpacked(16 << 20),
        );
    let _ = archive.extract(&dest, &options);

    // Only the destination itself may exist beside it.
    if let Ok(siblings) = std::fs::read_dir(scratch.path()) {
        for sibling in siblings.flatten() {
            assert_eq!(
                sibling.file_name(),
                "dest",
                "extraction escaped into {:?}",
                sibling.path()
            );
        }
    }
});
