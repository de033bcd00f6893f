//! Command implementations for triagectl CLI

pub mod config;
pub mod patients;

// Re-export dispatcher functions for flat access from main.rs
pub use config::run_config;
pub use patients::{run_add, run_clear, run_history, run_next, run_queue, run_search, run_serve};
