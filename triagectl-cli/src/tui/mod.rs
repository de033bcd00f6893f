//! Interactive patient queue
//!
//! A full-screen terminal view over the queue with:
//! - Queue tab: waiting patients by severity, live name filter, call-next
//! - History tab: every record, most recent visit first
//! - Search tab: name search across all records
//! - Add-patient form overlay

pub mod app;
pub mod event;
pub mod form;
pub mod terminal;
pub mod ui;

pub use terminal::run;
