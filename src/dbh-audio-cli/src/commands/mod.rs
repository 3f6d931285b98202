//! Command handlers for the dbh-audio CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod extract;
pub mod languages;
pub mod unpack;
