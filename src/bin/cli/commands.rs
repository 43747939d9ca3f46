//! Command implementations for the CLI tool.

use std::path::Path;

use fsx::{
    Archive, ExtractOptions, HashAlgorithm, LinkPolicy, PathHandle, ResourceLimits, WriteOptions,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::{CompressionMethod, OutputFormat, OverwriteMode, SymlinkMode};

/// Configuration for the zip command.
pub struct ZipConfig<'a> {
    pub source: &'a Path,
    pub archive_path: &'a Path,
    pub method: CompressionMethod,
    pub level: u32,
    pub symlinks: SymlinkMode,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Configuration for the unzip command.
pub struct UnzipConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub overwrite: OverwriteMode,
    pub preserve_permissions: bool,
    pub allow_symlinks: bool,
    pub max_entry_size: Option<u64>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Zip command implementation
pub fn zip(config: &ZipConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let options = match WriteOptions::new()
        .method(config.method.into())
        .symlinks(config.symlinks.into())
        .level(config.level)
    {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let result = match fsx::create(config.source, config.archive_path, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error creating archive: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if !config.quiet {
        print!(
            "{}",
            formatter.format_zip_result(config.archive_path, &result)
        );
    }

    ExitCode::Success
}

/// Unzip command implementation
pub fn unzip(config: &UnzipConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let mut limits = ResourceLimits::new();
    if let Some(max) = config.max_entry_size {
        limits = limits.max_entry_unpacked(if max == 0 { u64::MAX } else { max });
    }

    let link_policy = if config.allow_symlinks {
        LinkPolicy::ValidateTargets
    } else {
        LinkPolicy::Forbid
    };

    let options = ExtractOptions::new()
        .overwrite(config.overwrite.into())
        .link_policy(link_policy)
        .limits(limits)
        .preserve_permissions(config.preserve_permissions);

    let mut archive = match open_archive(config.archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = match archive.extract(config.output_dir, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if !config.quiet {
        print!("{}", formatter.format_extract_result(&result));
    }

    ExitCode::Success
}

/// List command implementation
pub fn list(archive_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let archive = match open_archive(archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    print!("{}", formatter.format_list(archive.entries()));

    ExitCode::Success
}

/// Hash command implementation
pub fn hash(path: &Path, algo: HashAlgorithm, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let digest = match algo.hash_file(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_hash(path, algo, &digest));

    ExitCode::Success
}

/// Stat command implementation
pub fn stat(path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let handle = match PathHandle::new(path) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if let Err(e) = handle.metadata() {
        eprintln!("Error: {}", e);
        return error_to_exit_code(&e);
    }

    print!("{}", formatter.format_stat(&handle));

    ExitCode::Success
}

/// Helper to open an archive, reporting failures on stderr
fn open_archive(path: &Path) -> Result<Archive<std::io::BufReader<std::fs::File>>, ExitCode> {
    Archive::open_path(path).map_err(|e| {
        eprintln!("Error opening archive: {}", e);
        error_to_exit_code(&e)
    })
}
