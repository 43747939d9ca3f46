//! File extraction from archives.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::safety::{LimitedReader, ResourceLimits, validate_extract_path, validate_symlink_target};
use crate::{Error, Result};

use super::{Archive, ArchiveEntry, ExtractOptions, ExtractResult, LinkPolicy, OverwritePolicy};

/// Longest symlink target read from an entry.
const MAX_LINK_TARGET: u64 = 4096;

impl<R: Read + Seek> Archive<R> {
    /// Extracts all entries under `dest`.
    ///
    /// See [`extract`](crate::extract) for the full contract.
    pub fn extract(
        &mut self,
        dest: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        let dest = dest.as_ref();
        let limits = &options.limits;

        if self.entries.len() > limits.max_entries {
            return Err(Error::ResourceLimitExceeded(format!(
                "archive has {} entries, limit is {}",
                self.entries.len(),
                limits.max_entries
            )));
        }

        fs::create_dir_all(dest).map_err(|e| Error::from_io(e, dest))?;

        let total = Arc::new(AtomicU64::new(0));
        let mut result = ExtractResult::default();

        for index in 0..self.entries.len() {
            let entry = self.entries[index].clone();
            // Directories are implied by the files inside them.
            if entry.is_dir {
                continue;
            }
            if entry.is_symlink {
                self.extract_symlink(&entry, dest, options, &mut result)?;
            } else {
                self.extract_file(&entry, dest, options, &total, &mut result)?;
            }
        }

        log::debug!(
            "extracted {} entries ({} bytes) to {}",
            result.entries_extracted,
            result.bytes_extracted,
            dest.display()
        );
        Ok(result)
    }

    fn extract_file(
        &mut self,
        entry: &ArchiveEntry,
        dest: &Path,
        options: &ExtractOptions,
        total: &Arc<AtomicU64>,
        result: &mut ExtractResult,
    ) -> Result<()> {
        let target = validate_extract_path(&entry.name, dest, options.path_safety, entry.index)?;
        check_declared_size(entry, &options.limits, total.load(Ordering::Relaxed))?;

        if !prepare_target(&target, options.overwrite, false)? {
            log::debug!("skipping existing {}", target.display());
            result.entries_skipped += 1;
            return Ok(());
        }

        let limits = &options.limits;
        let file = self.zip.by_index(entry.index)?;
        let mut reader = LimitedReader::new(file, entry.index, entry.name.clone())
            .max_entry_bytes(limits.max_entry_unpacked)
            .total_tracker(Arc::clone(total), limits.max_total_unpacked);
        if let Some(ratio) = &limits.ratio_limit {
            reader = reader.ratio_limit(entry.compressed_size, ratio.clone());
        }

        let out = File::create(&target).map_err(|e| Error::from_io(e, &target))?;
        let mut out = BufWriter::new(out);
        let copied = io::copy(&mut reader, &mut out).and_then(|n| out.flush().map(|()| n));
        drop(out);

        let written = match copied {
            Ok(n) => n,
            Err(e) => {
                remove_partial(&target);
                return Err(entry_error(e, entry, &target));
            }
        };

        if options.preserve_permissions {
            if let Some(mode) = entry.permissions() {
                set_mode(&target, mode)?;
            }
        }

        log::debug!("extracted {} ({} bytes)", entry.name, written);
        result.entries_extracted += 1;
        result.bytes_extracted += written;
        Ok(())
    }

    fn extract_symlink(
        &mut self,
        entry: &ArchiveEntry,
        dest: &Path,
        options: &ExtractOptions,
        result: &mut ExtractResult,
    ) -> Result<()> {
        if options.link_policy == LinkPolicy::Forbid || !cfg!(unix) {
            log::debug!("skipping symlink entry {}", entry.name);
            result.entries_skipped += 1;
            return Ok(());
        }

        let link = validate_extract_path(&entry.name, dest, options.path_safety, entry.index)?;

        let file = self.zip.by_index(entry.index)?;
        let mut link_target = String::new();
        LimitedReader::new(file, entry.index, entry.name.clone())
            .max_entry_bytes(MAX_LINK_TARGET)
            .read_to_string(&mut link_target)
            .map_err(|e| entry_error(e, entry, &link))?;

        if options.link_policy == LinkPolicy::ValidateTargets {
            validate_symlink_target(entry.index, &entry.name, &link_target, &link, dest)?;
        }

        if !prepare_target(&link, options.overwrite, true)? {
            log::debug!("skipping existing {}", link.display());
            result.entries_skipped += 1;
            return Ok(());
        }

        create_symlink(&link_target, &link)?;
        log::debug!("linked {} -> {}", entry.name, link_target);
        result.symlinks_created += 1;
        Ok(())
    }
}

/// Rejects entries whose central directory sizes already break a limit.
fn check_declared_size(entry: &ArchiveEntry, limits: &ResourceLimits, total_so_far: u64) -> Result<()> {
    let too_large = |reason: String| Error::EntryTooLarge {
        entry_index: entry.index,
        path: entry.name.clone(),
        reason,
    };

    if entry.size > limits.max_entry_unpacked {
        return Err(too_large(format!(
            "declared size {} exceeds limit {}",
            entry.size, limits.max_entry_unpacked
        )));
    }
    if total_so_far.saturating_add(entry.size) > limits.max_total_unpacked {
        return Err(too_large(format!(
            "declared size {} would bring the total past {}",
            entry.size, limits.max_total_unpacked
        )));
    }
    if let Some(ratio) = &limits.ratio_limit {
        if let Some(reason) = ratio.check(entry.compressed_size, entry.size) {
            return Err(too_large(reason));
        }
    }
    Ok(())
}

/// Creates parent directories and applies the overwrite policy.
///
/// Returns `false` when the entry should be skipped. An existing symlink at
/// the target is always removed before writing so content never goes
/// through it; `for_link` also removes an existing file.
fn prepare_target(target: &Path, policy: OverwritePolicy, for_link: bool) -> Result<bool> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::from_io(e, parent))?;
    }

    let existing = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(Error::from_io(e, target)),
    };

    match policy {
        OverwritePolicy::Error => Err(Error::AlreadyExists {
            path: target.to_path_buf(),
        }),
        OverwritePolicy::Skip => Ok(false),
        OverwritePolicy::Overwrite => {
            let file_type = existing.file_type();
            if file_type.is_symlink() || (for_link && !file_type.is_dir()) {
                fs::remove_file(target).map_err(|e| Error::from_io(e, target))?;
            }
            Ok(true)
        }
    }
}

fn remove_partial(target: &Path) {
    if let Err(e) = fs::remove_file(target) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!(
                "failed to clean up partial file '{}': {}",
                target.display(),
                e
            );
        }
    }
}

/// Converts an error raised while copying an entry.
///
/// Limit violations come back as our own error; corrupt compressed data
/// surfaces as `InvalidData` from the decompressor.
fn entry_error(err: io::Error, entry: &ArchiveEntry, target: &Path) -> Error {
    if err.kind() == io::ErrorKind::InvalidData && !err.get_ref().is_some_and(|e| e.is::<Error>()) {
        return Error::InvalidFormat(format!("entry {} ({}): {}", entry.index, entry.name, err));
    }
    Error::from_io(err, target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::from_io(e, path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &str, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::from_io(e, link))
}

#[cfg(not(unix))]
fn create_symlink(_target: &str, _link: &Path) -> Result<()> {
    Err(Error::UnsupportedFeature {
        feature: "symbolic links on this platform",
    })
}
