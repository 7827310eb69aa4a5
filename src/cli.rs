// src/cli.rs
//! CLI definitions for booster
//!
//! The command implementations live in `main.rs`; all real work is done by
//! the library.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "booster")]
#[command(author = "Booster Contributors")]
#[command(version)]
#[command(about = "Transparent, round-trip verified gzip decompression of file trees", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create verified shadow copies of gzip files
    Decompress {
        /// Root directory of the tree
        root: PathBuf,
    },

    /// Regenerate originals that are missing next to their shadows
    Recompress {
        /// Root directory of the tree
        root: PathBuf,
    },

    /// Print the logical view of a tree
    View {
        /// Root directory of the tree
        root: PathBuf,
    },

    /// Check whether a single file round-trips
    Check {
        /// File to check
        file: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
