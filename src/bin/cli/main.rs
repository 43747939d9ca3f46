//! CLI tool for fsx zip operations.

mod commands;
mod exit_codes;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Zip a directory tree, unzip it safely, and inspect paths
#[derive(Parser)]
#[command(name = "fsx")]
#[command(author, version, about = "Safe zip archiving and path inspection", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress informational output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (repeat for more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive every regular file under a directory
    Zip {
        /// Directory to archive
        source: PathBuf,

        /// Archive file to create (must not exist)
        archive: PathBuf,

        /// Compression method
        #[arg(short = 'm', long, value_enum, default_value = "deflate")]
        method: CompressionMethod,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "6")]
        level: u32,

        /// How to treat symbolic links in the source tree
        #[arg(long, value_enum, default_value = "skip")]
        symlinks: SymlinkMode,
    },

    /// Extract an archive into a directory
    Unzip {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// What to do when a file already exists
        #[arg(long, value_enum, default_value = "always")]
        overwrite: OverwriteMode,

        /// Restore permission bits stored in the archive
        #[arg(long)]
        preserve_permissions: bool,

        /// Create symbolic links whose targets stay inside the output directory
        #[arg(long)]
        allow_symlinks: bool,

        /// Per-entry size limit in bytes (0 = unlimited)
        #[arg(long, env = "FSX_MAX_ENTRY_SIZE")]
        max_entry_size: Option<u64>,
    },

    /// List archive contents
    List {
        /// Archive file to list
        archive: PathBuf,
    },

    /// Print a content digest of a file
    Hash {
        /// File to hash
        file: PathBuf,

        /// Digest algorithm
        #[arg(long, value_enum, default_value = "sha256")]
        algo: HashAlgo,
    },

    /// Show the type, mode and size of a path without following links
    Stat {
        /// Path to inspect
        path: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OverwriteMode {
    Always,
    Never,
    Error,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CompressionMethod {
    Store,
    Deflate,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum SymlinkMode {
    Skip,
    Follow,
    Store,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum HashAlgo {
    Md5,
    Sha256,
}

impl From<CompressionMethod> for fsx::CompressionMethod {
    fn from(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Store => fsx::CompressionMethod::Stored,
            CompressionMethod::Deflate => fsx::CompressionMethod::Deflated,
        }
    }
}

impl From<SymlinkMode> for fsx::SymlinkPolicy {
    fn from(mode: SymlinkMode) -> Self {
        match mode {
            SymlinkMode::Skip => fsx::SymlinkPolicy::Skip,
            SymlinkMode::Follow => fsx::SymlinkPolicy::Follow,
            SymlinkMode::Store => fsx::SymlinkPolicy::Store,
        }
    }
}

impl From<OverwriteMode> for fsx::OverwritePolicy {
    fn from(mode: OverwriteMode) -> Self {
        match mode {
            OverwriteMode::Always => fsx::OverwritePolicy::Overwrite,
            OverwriteMode::Never => fsx::OverwritePolicy::Skip,
            OverwriteMode::Error => fsx::OverwritePolicy::Error,
        }
    }
}

impl From<HashAlgo> for fsx::HashAlgorithm {
    fn from(algo: HashAlgo) -> Self {
        match algo {
            HashAlgo::Md5 => fsx::HashAlgorithm::Md5,
            HashAlgo::Sha256 => fsx::HashAlgorithm::Sha256,
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let exit_code = match cli.command {
        Commands::Zip {
            source,
            archive,
            method,
            level,
            symlinks,
        } => commands::zip(&commands::ZipConfig {
            source: &source,
            archive_path: &archive,
            method,
            level,
            symlinks,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Unzip {
            archive,
            output,
            overwrite,
            preserve_permissions,
            allow_symlinks,
            max_entry_size,
        } => commands::unzip(&commands::UnzipConfig {
            archive_path: &archive,
            output_dir: &output,
            overwrite,
            preserve_permissions,
            allow_symlinks,
            max_entry_size,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::List { archive } => commands::list(&archive, cli.format),

        Commands::Hash { file, algo } => commands::hash(&file, algo.into(), cli.format),

        Commands::Stat { path } => commands::stat(&path, cli.format),
    };

    std::process::exit(exit_code.code());
}
