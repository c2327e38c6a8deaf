use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

pub const DEFAULT_MIN_SIZE: &str = "5mib";

#[derive(Parser)]
#[command(
    name = "space-saver",
    version,
    about = "Finds duplicate files and saves disk space by replacing them with copy-on-write clones"
)]
pub struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: LevelFilter,

    /// Maximum number of hashing threads (0 = auto)
    #[arg(long, default_value = "0", global = true)]
    pub threads: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find duplicate files by comparing content hashes
    Find {
        /// Directory to search for duplicates
        target_dir: PathBuf,

        /// Minimum file size to consider (e.g. 4500mib, 5mb10kb)
        #[arg(long, default_value = DEFAULT_MIN_SIZE)]
        min_size: String,

        /// Write a machine-readable report to this path
        #[arg(short, long)]
        output_json: Option<PathBuf>,
    },

    /// Replace duplicate files with clones of each group's earliest copy
    CloneDuplicates {
        /// Directory to search for duplicates
        target_dir: PathBuf,

        /// Minimum file size to consider (e.g. 4500mib, 5mb10kb)
        #[arg(long, default_value = DEFAULT_MIN_SIZE)]
        min_size: String,

        /// Actually clone; without this flag the plan is only printed
        #[arg(long)]
        real: bool,
    },

    /// Clone a single file, replacing the destination
    CloneFile {
        source: PathBuf,
        dest: PathBuf,
    },

    /// Test whether two paths refer to the same underlying file
    SameFile {
        source: PathBuf,
        dest: PathBuf,
    },
}
