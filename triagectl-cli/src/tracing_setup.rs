//! Tracing setup for the triagectl CLI
//!
//! Usage:
//!   triagectl --debug ...               # Debug logging
//!   RUST_LOG=triagectl_core=debug ...   # Fine-grained log control
//!
//! One-shot commands log to stderr. The terminal UI owns the screen, so while
//! it runs logs are appended to the configured log file instead.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
    pub sink: LogSink,
}

fn env_filter(debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize tracing based on configuration
pub fn init(config: &TracingConfig) -> Result<()> {
    match &config.sink {
        LogSink::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter(config.debug))
            .with_target(config.debug) // Show targets in debug mode
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .map_err(|err| anyhow!(err)),
        LogSink::File(path) => init_file(config.debug, path),
    }
}

fn init_file(debug: bool, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_target(debug)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
