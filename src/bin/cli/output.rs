//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;

use fsx::{ArchiveEntry, ExtractResult, HashAlgorithm, PathHandle, WriteResult};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a list of entries
    fn format_list(&self, entries: &[ArchiveEntry]) -> String;

    /// Formats archive creation results
    fn format_zip_result(&self, archive: &Path, result: &WriteResult) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;

    /// Formats a file digest
    fn format_hash(&self, path: &Path, algo: HashAlgorithm, digest: &str) -> String;

    /// Formats a path snapshot
    fn format_stat(&self, handle: &PathHandle) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[ArchiveEntry]) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:>12} {:>12} {:>6} {}\n", "Size", "Packed", "Mode", "Name"));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let mut total_size: u64 = 0;
        let mut file_count = 0;
        let mut dir_count = 0;

        for entry in entries {
            if entry.is_dir {
                dir_count += 1;
            } else {
                file_count += 1;
                total_size = total_size.saturating_add(entry.size);
            }

            let size_str = if entry.is_dir {
                String::new()
            } else {
                humanize_bytes(entry.size)
            };
            let mode_str = entry
                .permissions()
                .map(|m| format!("{:o}", m))
                .unwrap_or_else(|| "-".to_string());
            let type_indicator = if entry.is_symlink { " @" } else { "" };

            output.push_str(&format!(
                "{:>12} {:>12} {:>6} {}{}\n",
                size_str,
                humanize_bytes(entry.compressed_size),
                mode_str,
                entry.name,
                type_indicator
            ));
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} directories, {} total\n",
            file_count,
            dir_count,
            humanize_bytes(total_size)
        ));

        output
    }

    fn format_zip_result(&self, archive: &Path, result: &WriteResult) -> String {
        let mut output = format!(
            "Created {} with {} files ({} -> {})\n",
            archive.display(),
            result.entries_written,
            humanize_bytes(result.total_size),
            humanize_bytes(result.compressed_size)
        );
        output.push_str(&format!(
            "Compression ratio: {:.1}% (saved {:.1}%)\n",
            result.compression_ratio() * 100.0,
            result.space_savings() * 100.0
        ));
        if result.entries_skipped > 0 {
            output.push_str(&format!("Skipped {} entries\n", result.entries_skipped));
        }
        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = format!(
            "Extracted {} files ({})\n",
            result.entries_extracted,
            humanize_bytes(result.bytes_extracted)
        );
        if result.symlinks_created > 0 {
            output.push_str(&format!("Created {} symlinks\n", result.symlinks_created));
        }
        if result.entries_skipped > 0 {
            output.push_str(&format!("Skipped {} entries\n", result.entries_skipped));
        }
        output
    }

    fn format_hash(&self, path: &Path, _algo: HashAlgorithm, digest: &str) -> String {
        format!("{}  {}\n", digest, path.display())
    }

    fn format_stat(&self, handle: &PathHandle) -> String {
        let mut output = String::new();

        output.push_str(&format!("  Path:     {}\n", handle.path().display()));
        output.push_str(&format!("  Type:     {}\n", file_type(handle)));
        if let Ok(meta) = handle.metadata() {
            output.push_str(&format!(
                "  Size:     {} ({} bytes)\n",
                humanize_bytes(meta.len()),
                meta.len()
            ));
        }
        if let Ok(mode) = handle.permissions() {
            output.push_str(&format!("  Mode:     {:04o}\n", mode));
        }
        if let Ok(Some(owner)) = handle.owner() {
            output.push_str(&format!(
                "  Owner:    {}:{}\n",
                owner.uid.map_or_else(|| "-".to_string(), |u| u.to_string()),
                owner.gid.map_or_else(|| "-".to_string(), |g| g.to_string())
            ));
        }

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[ArchiveEntry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "size": e.size,
                    "compressed_size": e.compressed_size,
                    "is_directory": e.is_dir,
                    "is_symlink": e.is_symlink,
                    "mode": e.permissions(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_zip_result(&self, archive: &Path, result: &WriteResult) -> String {
        let obj = json!({
            "archive": archive.display().to_string(),
            "entries_written": result.entries_written,
            "symlinks_written": result.symlinks_written,
            "entries_skipped": result.entries_skipped,
            "total_size": result.total_size,
            "compressed_size": result.compressed_size,
            "compression_ratio": result.compression_ratio(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "entries_extracted": result.entries_extracted,
            "entries_skipped": result.entries_skipped,
            "symlinks_created": result.symlinks_created,
            "bytes_extracted": result.bytes_extracted,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_hash(&self, path: &Path, algo: HashAlgorithm, digest: &str) -> String {
        let obj = json!({
            "path": path.display().to_string(),
            "algorithm": algo.name(),
            "digest": digest,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_stat(&self, handle: &PathHandle) -> String {
        let owner = handle.owner().ok().flatten();
        let obj = json!({
            "path": handle.path().display().to_string(),
            "type": file_type(handle),
            "size": handle.metadata().ok().map(|m| m.len()),
            "mode": handle.permissions().ok(),
            "uid": owner.and_then(|o| o.uid),
            "gid": owner.and_then(|o| o.gid),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Names the kind of filesystem object a handle points at.
fn file_type(handle: &PathHandle) -> &'static str {
    if !handle.exists() {
        "missing"
    } else if handle.is_symlink() {
        "symlink"
    } else if handle.is_dir() {
        "directory"
    } else if handle.is_regular() {
        "file"
    } else if handle.is_socket() {
        "socket"
    } else if handle.is_named_pipe() {
        "fifo"
    } else if handle.is_char_device() {
        "char device"
    } else if handle.is_block_device() {
        "block device"
    } else {
        "other"
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
