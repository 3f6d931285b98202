//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up dbh-audio defaults.

use crate::cli::ConfigureArgs;
use crate::config::Config;
use anyhow::{bail, Result};
use dbh_audio::language::language_by_code;

/// Handle the configure command
pub fn handle(args: ConfigureArgs) -> Result<()> {
    let mut config = Config::load()?;

    if args.show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, args)? {
        config.save()?;
        println!("Configuration updated");
        if let Ok(path) = Config::config_path() {
            println!("Config saved to: {}", path.display());
        }
    } else {
        show_usage();
    }

    Ok(())
}

/// Copy every provided setting into `config`; returns whether anything changed
fn apply(config: &mut Config, args: ConfigureArgs) -> Result<bool> {
    let mut changed = false;

    if let Some(dir) = args.game_dir {
        config.game_dir = Some(dir);
        changed = true;
    }
    if let Some(dir) = args.output {
        config.output = Some(dir);
        changed = true;
    }
    if let Some(codes) = args.languages {
        let codes: Vec<String> = codes.iter().map(|c| c.trim().to_ascii_uppercase()).collect();
        if let Some(unknown) = codes.iter().find(|c| language_by_code(c).is_none()) {
            bail!("Unknown language code '{unknown}' (see `dbh-audio languages`)");
        }
        config.languages = Some(codes);
        changed = true;
    }
    if let Some(flatten) = args.flatten {
        config.flatten = Some(flatten);
        changed = true;
    }
    if let Some(unpack) = args.unpack_banks {
        config.unpack_banks = Some(unpack);
        changed = true;
    }

    Ok(changed)
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.game_dir {
        Some(dir) => println!("Game directory: {}", dir.display()),
        None => println!("No game directory configured"),
    }
    match &config.output {
        Some(dir) => println!("Output directory: {}", dir.display()),
        None => println!("Output directory: (default)"),
    }
    match &config.languages {
        Some(codes) => println!("Languages: {}", codes.join(",")),
        None => println!("Languages: all"),
    }
    println!("Flatten dialogue paths: {}", config.flatten());
    println!("Unpack banks: {}", config.unpack_banks());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: dbh-audio configure --game-dir PATH [--output PATH] [--languages ENG,FRE]");
    println!("   or: dbh-audio configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ConfigureArgs {
        ConfigureArgs {
            game_dir: None,
            output: None,
            languages: None,
            flatten: None,
            unpack_banks: None,
            show: false,
        }
    }

    #[test]
    fn test_apply_nothing() {
        let mut config = Config::default();
        assert!(!apply(&mut config, args()).unwrap());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_settings() {
        let mut config = Config::default();
        let mut a = args();
        a.game_dir = Some(PathBuf::from("/games/dbh"));
        a.languages = Some(vec!["eng".to_string(), " fre".to_string()]);
        a.flatten = Some(true);

        assert!(apply(&mut config, a).unwrap());
        assert_eq!(config.game_dir, Some(PathBuf::from("/games/dbh")));
        assert_eq!(
            config.languages,
            Some(vec!["ENG".to_string(), "FRE".to_string()])
        );
        assert!(config.flatten());
    }

    #[test]
    fn test_apply_unknown_language() {
        let mut a = args();
        a.languages = Some(vec!["KLINGON".to_string()]);
        assert!(apply(&mut Config::default(), a).is_err());
    }

    #[test]
    fn test_show_usage_does_not_panic() {
        show_usage();
        show_config(&Config::default());
    }
}
