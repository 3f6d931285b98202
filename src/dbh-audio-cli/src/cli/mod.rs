//! CLI argument definitions for dbh-audio
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;

pub use core::{Cli, Commands, ConfigureArgs, ExtractArgs, UnpackArgs};
