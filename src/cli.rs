//! Command-line interface for cast
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Concatenation and segmentation tools for phonetic recordings
#[derive(Parser, Debug)]
#[command(
    name = "cast",
    version,
    about = "Concatenate trial recordings and synthesize annotation tiers"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress per-trial progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Concatenate a session directory and write WAV, CSV and TextGrid output
    Run {
        /// Directory containing the per-trial .wav and .txt files
        directory: PathBuf,

        /// Speaker identifier (overrides the configured one)
        #[arg(long, value_name = "ID")]
        speaker: Option<String>,

        /// Output stem (overrides the configured one)
        #[arg(short, long, value_name = "STEM")]
        output: Option<PathBuf>,

        /// Process only the first few trials
        #[arg(long)]
        test: bool,

        /// Skip synchronization tone detection
        #[arg(long)]
        no_detect: bool,
    },

    /// Split a corrected session TextGrid into per-trial TextGrids
    Extract {
        /// Results CSV written by `run` (provides the slice times)
        csv: PathBuf,

        /// The hand-corrected session TextGrid
        textgrid: PathBuf,

        /// Directory for the per-trial TextGrids (created if missing)
        #[arg(short, long, value_name = "DIR", default_value = "extracted")]
        out_dir: PathBuf,
    },

    /// Merge stray empty intervals left behind by manual correction
    RemoveDoubleWordBoundaries {
        /// Directory containing the TextGrids to clean
        directory: PathBuf,

        /// Directory for the cleaned TextGrids (created if missing)
        #[arg(short, long, value_name = "DIR", default_value = "cleaned")]
        out_dir: PathBuf,
    },

    /// Write a commented default configuration file
    Init {
        /// Where to write the file (default: ./cast_config.toml)
        path: Option<PathBuf>,
    },
}
