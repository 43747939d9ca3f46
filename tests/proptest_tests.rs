//! Property-based tests using proptest.
//!
//! These tests verify invariants of entry-name validation and the
//! create/extract round trip using randomly generated inputs.

mod common;

use std::collections::BTreeMap;

use fsx::{ArchivePath, Error, ExtractOptions, PathSafety, WriteOptions, validate_extract_path};
use proptest::prelude::*;

/// Windows reserved device names (case-insensitive).
/// `ArchivePath::new` rejects them; names of files walked by `create` keep them.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks if a path segment is a Windows reserved name (case-insensitive).
fn is_windows_reserved(segment: &str) -> bool {
    let base = segment.split('.').next().unwrap_or(segment);
    WINDOWS_RESERVED
        .iter()
        .any(|r| r.eq_ignore_ascii_case(base))
}

/// Strategy for generating valid archive path strings.
///
/// - 1-4 path components separated by '/'
/// - Each component is 1-10 alphanumeric characters with optional underscores/dots/dashes
/// - Excludes "." and ".." segments and Windows reserved device names
fn valid_path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,9}", 1..4)
        .prop_map(|parts| parts.join("/"))
        .prop_filter("must not contain invalid segments", |s| {
            !s.split('/')
                .any(|seg| seg == "." || seg == ".." || is_windows_reserved(seg))
        })
}

/// Characters allowed in generated file names. On Unix a `\` is an ordinary
/// name character and must survive the round trip.
#[cfg(unix)]
const FILE_NAME_PATTERN: &str = "[a-z\\\\]{1,6}";
#[cfg(not(unix))]
const FILE_NAME_PATTERN: &str = "[a-z]{1,6}";

/// A name segment, sometimes a reserved device name.
fn segment_strategy(pattern: &'static str) -> impl Strategy<Value = String> {
    prop_oneof![
        4 => proptest::string::string_regex(pattern).unwrap(),
        1 => proptest::sample::select(vec!["con", "aux", "nul", "prn", "com1", "lpt9"])
            .prop_map(String::from),
    ]
}

/// File contents: random bytes, or a long run of one byte that compresses
/// about as well as DEFLATE allows.
fn content_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        3 => proptest::collection::vec(any::<u8>(), 0..2048),
        1 => (any::<u8>(), 0..300_000usize).prop_map(|(byte, len)| vec![byte; len]),
    ]
}

/// Strategy for file trees whose names never collide with each other.
///
/// Directory segments have no dot and file names always end in `.txt`, so a
/// file can never share a name with a directory.
fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    let name = (
        proptest::collection::vec(segment_strategy("[a-z]{1,6}"), 0..3),
        segment_strategy(FILE_NAME_PATTERN),
    )
        .prop_map(|(dirs, file)| {
            let mut parts = dirs;
            parts.push(format!("{file}.txt"));
            parts.join("/")
        });
    proptest::collection::btree_map(name, content_strategy(), 0..12)
}

/// Entry name separators on this platform.
#[cfg(windows)]
fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("/"), Just("\\")]
}

#[cfg(not(windows))]
fn separator_strategy() -> impl Strategy<Value = &'static str> {
    Just("/")
}

proptest! {
    /// Valid paths should always parse successfully.
    #[test]
    fn valid_paths_parse_successfully(path in valid_path_strategy()) {
        let result = ArchivePath::new(&path);
        prop_assert!(result.is_ok(), "Valid path '{}' failed to parse: {:?}", path, result);

        let parsed = result.unwrap();
        prop_assert_eq!(parsed.as_str(), &path);
    }

    /// Paths with NUL bytes should always be rejected.
    #[test]
    fn nul_bytes_rejected(
        prefix in "[a-zA-Z0-9]{0,5}",
        suffix in "[a-zA-Z0-9]{0,5}"
    ) {
        let path = format!("{}\0{}", prefix, suffix);
        prop_assert!(ArchivePath::new(&path).is_err());
    }

    /// Any name with a `..` segment is refused by extraction, whatever surrounds it.
    #[test]
    fn dot_dot_never_extracts(
        before in proptest::collection::vec("[a-z]{1,5}", 0..3),
        after in proptest::collection::vec("[a-z]{1,5}", 0..3),
        separator in separator_strategy(),
    ) {
        let mut parts = before;
        parts.push("..".to_string());
        parts.extend(after);
        let name = parts.join(separator);

        let dest = tempfile::tempdir().unwrap();
        for policy in [PathSafety::Strict, PathSafety::Relaxed] {
            let result = validate_extract_path(&name, dest.path(), policy, 0);
            prop_assert!(
                matches!(result, Err(Error::PathTraversal { .. })),
                "'{}' was accepted under {:?}",
                name,
                policy
            );
        }
    }

    /// Valid names always resolve to a path inside the destination.
    #[test]
    fn valid_names_stay_inside(path in valid_path_strategy()) {
        let dest = tempfile::tempdir().unwrap();
        let resolved = validate_extract_path(&path, dest.path(), PathSafety::Strict, 0).unwrap();
        prop_assert!(resolved.starts_with(dest.path()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Extracting a created archive with default options reproduces the tree
    /// exactly, whatever the names and however well the contents compress.
    #[test]
    fn create_extract_round_trip(tree in tree_strategy()) {
        let src = tempfile::tempdir().unwrap();
        let files: Vec<(&str, &[u8])> = tree
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
            .collect();
        common::write_tree(src.path(), &files);

        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("prop.zip");
        let written = fsx::create(src.path(), &archive, &WriteOptions::default()).unwrap();
        prop_assert_eq!(written.entries_written, tree.len());

        let dest = work.path().join("out");
        fsx::extract(&archive, &dest, &ExtractOptions::default()).unwrap();
        prop_assert_eq!(common::read_tree(&dest), tree);
    }
}
