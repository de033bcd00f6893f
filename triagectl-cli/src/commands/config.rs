use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use triagectl_core::config::expand_home;
use triagectl_core::TriageConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Print the effective configuration as TOML
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// Effective configuration: config file, then `TRIAGECTL_DB`, then `--db`
pub fn load_config(db_override: Option<&Path>) -> Result<TriageConfig> {
    let mut config = TriageConfig::load().context("Failed to load configuration")?;
    if let Some(db) = db_override {
        config.storage.db_path = expand_home(db);
    }
    Ok(config)
}

pub fn run_config(args: ConfigArgs, db_override: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(&load_config(db_override)?),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = TriageConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = TriageConfig::default().to_toml()?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!("Created config at: {}", config_path.display());
    Ok(())
}

fn run_show(config: &TriageConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_path() -> Result<()> {
    let path = TriageConfig::config_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("(not created yet; run `triagectl config init`)");
    }
    Ok(())
}
