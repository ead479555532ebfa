//! Root CLI structure for ggpk-patch

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ggpk-patch")]
#[command(about = "Apply plain and encrypted patches to game archives", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one file from an archive
    Extract {
        /// Archive file (`_.index.bin` or a standalone archive)
        target: PathBuf,

        /// Internal path of the file
        internal_path: String,

        /// Output file
        out_file: PathBuf,
    },

    /// Replace one file in an archive
    Replace {
        /// Archive file (`_.index.bin` or a standalone archive)
        target: PathBuf,

        /// Internal path of the file
        internal_path: String,

        /// File with the replacement contents
        in_file: PathBuf,
    },

    /// Apply a zip patch to an archive
    ReplaceZip {
        /// Archive file (`_.index.bin` or a standalone archive)
        target: PathBuf,

        /// Zip file whose entries replace archive files
        zip_file: PathBuf,
    },

    /// Decrypt an encrypted patch and apply it to an archive
    ReplaceZencZip {
        /// Archive file (`_.index.bin` or a standalone archive)
        target: PathBuf,

        /// Encrypted patch container
        zenc_file: PathBuf,
    },

    /// Extract a directory subtree in parallel
    ExtractDir {
        /// Archive file (`_.index.bin` or a standalone archive)
        target: PathBuf,

        /// Internal directory (or file) to extract
        internal_dir: String,

        /// Output directory
        out_dir: PathBuf,

        /// Number of worker threads
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Encrypt a zip patch for distribution
    PackZenc {
        /// Zip patch to encrypt
        zip_file: PathBuf,

        /// Encrypted container to write
        out_file: PathBuf,

        /// PBKDF2 iteration count
        #[arg(long, default_value_t = zenc::DEFAULT_ITERATIONS)]
        iterations: u32,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
