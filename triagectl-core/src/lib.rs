//! triagectl-core: walk-in patient queue model and SQLite persistence
//!
//! - [`db::PatientStore`] owns the SQLite connection and the one table
//! - [`queue::Queue`] wraps the store with a read-through cache of waiting patients
//! - [`config::TriageConfig`] loads `~/.triagectl/config.toml`

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod queue;

pub use config::TriageConfig;
pub use db::PatientStore;
pub use error::{Result, TriageError};
pub use model::{NewPatient, PatientRecord, QueueCounts, Status, Urgency, SEVERITY_MAX, SEVERITY_MIN};
pub use queue::{estimate_wait, Queue, QueueEntry, DEFAULT_MINUTES_PER_PATIENT};
