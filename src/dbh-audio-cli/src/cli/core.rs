//! Core CLI definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbh-audio")]
#[command(about = "Extract audio from BigFile container volumes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract sound banks, dialogue and MIDI from container volumes
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Unpack WEM files from extracted sound banks
    #[command(visible_alias = "u")]
    Unpack(UnpackArgs),

    /// List known dialogue language codes
    #[command(visible_alias = "l")]
    Languages,

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure(ConfigureArgs),
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Volumes to scan (default: BigFile_PC.dat and its .dNN siblings in the game directory)
    pub volumes: Vec<PathBuf>,

    /// Game directory containing the BigFile volumes
    #[arg(long, env = "DBH_GAME_DIR")]
    pub game_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dialogue languages to extract (e.g. ENG,FRE); default is every language
    #[arg(short, long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Join dialogue path segments into the file name
    #[arg(long)]
    pub flatten: bool,

    /// Skip sound banks
    #[arg(long)]
    pub no_banks: bool,

    /// Skip dialogue
    #[arg(long)]
    pub no_dialogue: bool,

    /// Skip MIDI tracks
    #[arg(long)]
    pub no_midi: bool,

    /// Unpack each extracted bank into wem/banks/<bank>/
    #[arg(long)]
    pub unpack_banks: bool,

    /// Write the full extraction report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Number of volumes scanned in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Bank files to unpack
    #[arg(required = true)]
    pub banks: Vec<PathBuf>,

    /// Output directory (default: next to each bank, named after it)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read big-endian banks
    #[arg(long)]
    pub swap: bool,

    /// Write objects.txt listing the HIRC objects
    #[arg(long)]
    pub dump_objects: bool,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Set default game directory
    #[arg(long)]
    pub game_dir: Option<PathBuf>,

    /// Set default output directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Set default dialogue languages (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Set whether dialogue paths are flattened by default
    #[arg(long)]
    pub flatten: Option<bool>,

    /// Set whether banks are unpacked by default
    #[arg(long)]
    pub unpack_banks: Option<bool>,

    /// Show current configuration
    #[arg(long)]
    pub show: bool,
}
