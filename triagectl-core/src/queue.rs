//! The waiting queue: the store as single source of truth plus a
//! read-through cache of waiting records that every mutation invalidates.

use serde::Serialize;
use tracing::{info, warn};

use crate::db::PatientStore;
use crate::error::{Result, TriageError};
use crate::model::{NewPatient, PatientRecord, SEVERITY_MAX, SEVERITY_MIN};

/// Average minutes a patient spends with staff, used for wait estimates
pub const DEFAULT_MINUTES_PER_PATIENT: u32 = 7;

/// A waiting record with its position in the full (unfiltered) queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    /// Zero-based position in severity order
    pub position: usize,
    #[serde(flatten)]
    pub record: PatientRecord,
    /// Estimated minutes until this patient is called
    pub est_wait_minutes: u32,
}

pub struct Queue {
    store: PatientStore,
    cache: Option<Vec<PatientRecord>>,
    minutes_per_patient: u32,
}

impl Queue {
    pub fn new(store: PatientStore, minutes_per_patient: u32) -> Self {
        Self {
            store,
            cache: None,
            minutes_per_patient,
        }
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    /// Drop the cached waiting list; the next read goes to the store
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Validate and insert a new patient
    ///
    /// The store accepts any text, so blank names and out-of-range
    /// severities are rejected here.
    pub fn admit(&mut self, patient: NewPatient) -> Result<i64> {
        let patient = validate(patient)?;
        let id = self.store.insert(&patient)?;
        self.invalidate();
        info!(id, name = %patient.name, severity = patient.severity, "patient admitted");
        Ok(id)
    }

    /// Waiting records in queue order, loaded from the store on a cache miss
    pub fn waiting(&mut self) -> Result<&[PatientRecord]> {
        if self.cache.is_none() {
            self.cache = Some(self.store.load_waiting()?);
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }

    /// Serve the head of the queue
    pub fn call_next(&mut self) -> Result<Option<PatientRecord>> {
        let Some(next) = self.waiting()?.first().cloned() else {
            return Ok(None);
        };

        let served = self.store.mark_served(next.id)?;
        self.invalidate();

        if served {
            info!(id = next.id, name = %next.name, "calling patient");
            Ok(Some(next))
        } else {
            // Served elsewhere since the cache was filled
            warn!(id = next.id, "head of queue was no longer waiting");
            Ok(None)
        }
    }

    /// Serve an arbitrary waiting record
    pub fn serve(&mut self, id: i64) -> Result<bool> {
        let served = self.store.mark_served(id)?;
        self.invalidate();
        if served {
            info!(id, "patient served");
        }
        Ok(served)
    }

    /// Serve everyone still waiting
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.store.mark_all_served()?;
        self.invalidate();
        info!(count, "queue cleared");
        Ok(count)
    }

    /// Waiting entries whose name contains `query` (case-insensitive).
    /// Positions and wait estimates refer to the unfiltered queue.
    pub fn filtered(&mut self, query: &str) -> Result<Vec<QueueEntry>> {
        let needle = query.trim().to_lowercase();
        let minutes = self.minutes_per_patient;

        let entries = self
            .waiting()?
            .iter()
            .enumerate()
            .filter(|(_, r)| needle.is_empty() || r.name.to_lowercase().contains(&needle))
            .map(|(position, record)| QueueEntry {
                position,
                record: record.clone(),
                est_wait_minutes: estimate_wait(position, minutes),
            })
            .collect();

        Ok(entries)
    }

    pub fn history(&self, limit: Option<usize>) -> Result<Vec<PatientRecord>> {
        self.store.load_history(limit)
    }

    pub fn search(&self, query: &str) -> Result<Vec<PatientRecord>> {
        self.store.search_by_name(query)
    }
}

/// Minutes until the patient at `position` is reached
pub fn estimate_wait(position: usize, minutes_per_patient: u32) -> u32 {
    u32::try_from(position)
        .unwrap_or(u32::MAX)
        .saturating_mul(minutes_per_patient)
}

fn validate(mut patient: NewPatient) -> Result<NewPatient> {
    patient.name = patient.name.trim().to_string();
    patient.checkup = patient.checkup.trim().to_string();

    if patient.name.is_empty() {
        return Err(TriageError::invalid_input("name", "must not be empty"));
    }
    if patient.age < 0 {
        return Err(TriageError::invalid_input(
            "age",
            format!("{} is negative", patient.age),
        ));
    }
    if !(SEVERITY_MIN..=SEVERITY_MAX).contains(&patient.severity) {
        return Err(TriageError::invalid_input(
            "severity",
            format!(
                "{} is outside {}-{}",
                patient.severity, SEVERITY_MIN, SEVERITY_MAX
            ),
        ));
    }
    Ok(patient)
}
