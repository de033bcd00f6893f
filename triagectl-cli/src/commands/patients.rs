//! One-shot queue commands: add, queue, next, serve, clear, history, search
//!
//! Each command opens nothing itself; `main` hands it the already-open queue.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use triagectl_core::{NewPatient, PatientRecord, Queue, QueueEntry};

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned columns for humans
    #[default]
    Table,
    /// JSON array for scripts
    Json,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Patient name (must not be blank)
    pub name: String,

    /// Age in years
    #[arg(long, default_value_t = 0)]
    pub age: i64,

    /// Urgency from 1 (low) to 5 (high)
    #[arg(long, short = 's', default_value_t = 1)]
    pub severity: i64,

    /// Type of checkup (e.g. "x-ray", "blood work")
    #[arg(long, short = 'c', default_value = "")]
    pub checkup: String,
}

#[derive(Parser, Debug)]
pub struct QueueArgs {
    /// Only show patients whose name contains this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Patient ID (as shown by `triagectl queue`)
    pub id: i64,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Maximum number of records (0 = all; default from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Name or part of a name (case-insensitive)
    pub query: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn run_add(queue: &mut Queue, args: AddArgs) -> Result<()> {
    let patient = NewPatient::new(args.name, args.age, args.severity, args.checkup);
    let name = patient.name.trim().to_string();
    let severity = patient.severity;

    let id = queue.admit(patient).context("Failed to add patient")?;

    let position = queue
        .filtered("")?
        .iter()
        .find(|e| e.record.id == id)
        .map(|e| e.position + 1);

    match position {
        Some(pos) => println!(
            "Added #{}: {} (severity {}), position {} in queue",
            id, name, severity, pos
        ),
        None => println!("Added #{}: {} (severity {})", id, name, severity),
    }
    Ok(())
}

pub fn run_queue(queue: &mut Queue, args: QueueArgs) -> Result<()> {
    let entries = queue.filtered(args.filter.as_deref().unwrap_or(""))?;

    match args.format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Table => print_queue_table(&entries),
    }
    Ok(())
}

pub fn run_next(queue: &mut Queue) -> Result<()> {
    match queue.call_next()? {
        Some(patient) => println!(
            "Calling: {} (#{}, severity {})",
            patient.name, patient.id, patient.severity
        ),
        None => println!("Queue is empty"),
    }
    Ok(())
}

pub fn run_serve(queue: &mut Queue, args: ServeArgs) -> Result<()> {
    if !queue.serve(args.id)? {
        bail!("No waiting patient with id {}", args.id);
    }
    println!("Served #{}", args.id);
    Ok(())
}

pub fn run_clear(queue: &mut Queue) -> Result<()> {
    let count = queue.clear()?;
    println!("Cleared {} waiting patient(s)", count);
    Ok(())
}

pub fn run_history(queue: &mut Queue, args: HistoryArgs, default_limit: Option<usize>) -> Result<()> {
    let limit = match args.limit {
        Some(0) => None,
        Some(n) => Some(n),
        None => default_limit,
    };
    let records = queue.history(limit)?;

    match args.format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Table => print_records_table(&records),
    }
    Ok(())
}

pub fn run_search(queue: &mut Queue, args: SearchArgs) -> Result<()> {
    let records = queue.search(&args.query)?;

    match args.format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No patients matching '{}'", args.query);
            } else {
                print_records_table(&records);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_queue_table(entries: &[QueueEntry]) {
    if entries.is_empty() {
        println!("No patients waiting");
        return;
    }

    let now = Local::now().naive_local();
    println!(
        "{:<4} {:<6} {:<24} {:>4} {:>8}  {:<16} {:>8} {:>9}",
        "#", "ID", "Name", "Age", "Severity", "Checkup", "Waited", "Est. Wait"
    );
    for entry in entries {
        let r = &entry.record;
        let waited = r
            .waited_minutes(now)
            .map(|m| format!("{} min", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<6} {:<24} {:>4} {:>8}  {:<16} {:>8} {:>5} min",
            entry.position + 1,
            r.id,
            r.name,
            r.age,
            r.severity,
            r.checkup,
            waited,
            entry.est_wait_minutes
        );
    }
}

fn print_records_table(records: &[PatientRecord]) {
    if records.is_empty() {
        println!("No records");
        return;
    }

    println!(
        "{:<6} {:<24} {:>4} {:>8}  {:<16} {:<19}  {}",
        "ID", "Name", "Age", "Severity", "Checkup", "Visit", "Status"
    );
    for r in records {
        println!(
            "{:<6} {:<24} {:>4} {:>8}  {:<16} {:<19}  {}",
            r.id, r.name, r.age, r.severity, r.checkup, r.visit_time, r.status
        );
    }
}
