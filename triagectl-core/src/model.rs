//! Patient record types shared by the store, the queue and the front ends

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Lowest severity a patient can be admitted with
pub const SEVERITY_MIN: i64 = 1;
/// Highest severity; drives the top of the queue
pub const SEVERITY_MAX: i64 = 5;

/// Format SQLite's `datetime('now','localtime')` produces
pub const VISIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a record is in its lifecycle. Records move `Waiting -> Served` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Served,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Served => "served",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Status::Waiting),
            "served" => Ok(Status::Served),
            other => Err(format!("unknown patient status '{}'", other)),
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Urgency bucket used to color severity cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Severity 5
    Critical,
    /// Severity 3-4
    Elevated,
    /// Severity 1-2
    Routine,
}

impl Urgency {
    pub fn from_severity(severity: i64) -> Self {
        if severity >= 5 {
            Urgency::Critical
        } else if severity >= 3 {
            Urgency::Elevated
        } else {
            Urgency::Routine
        }
    }
}

/// A persisted patient record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub severity: i64,
    pub checkup: String,
    /// Local timestamp assigned by the store at insert
    pub visit_time: String,
    pub status: Status,
}

impl PatientRecord {
    pub fn urgency(&self) -> Urgency {
        Urgency::from_severity(self.severity)
    }

    /// Parsed visit time, if the stored text is in the store's default format
    pub fn visited_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.visit_time, VISIT_TIME_FORMAT).ok()
    }

    /// Whole minutes between the visit and `now` (never negative)
    pub fn waited_minutes(&self, now: NaiveDateTime) -> Option<i64> {
        self.visited_at()
            .map(|visited| (now - visited).num_minutes().max(0))
    }
}

/// Insert payload: everything but the store-assigned columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub severity: i64,
    pub checkup: String,
}

impl NewPatient {
    pub fn new(name: impl Into<String>, age: i64, severity: i64, checkup: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            severity,
            checkup: checkup.into(),
        }
    }
}

/// Waiting/served totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub waiting: usize,
    pub served: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(severity: i64, visit_time: &str) -> PatientRecord {
        PatientRecord {
            id: 1,
            name: "Anna".to_string(),
            age: 30,
            severity,
            checkup: "general".to_string(),
            visit_time: visit_time.to_string(),
            status: Status::Waiting,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("waiting".parse::<Status>().unwrap(), Status::Waiting);
        assert_eq!("served".parse::<Status>().unwrap(), Status::Served);
        assert!("discharged".parse::<Status>().is_err());
        assert_eq!(Status::Served.to_string(), "served");
    }

    #[test]
    fn test_urgency_buckets() {
        assert_eq!(Urgency::from_severity(5), Urgency::Critical);
        assert_eq!(Urgency::from_severity(4), Urgency::Elevated);
        assert_eq!(Urgency::from_severity(3), Urgency::Elevated);
        assert_eq!(Urgency::from_severity(2), Urgency::Routine);
        assert_eq!(Urgency::from_severity(1), Urgency::Routine);
    }

    #[test]
    fn test_waited_minutes() {
        let r = record(3, "2026-03-01 09:00:00");
        let now = NaiveDateTime::parse_from_str("2026-03-01 09:42:30", VISIT_TIME_FORMAT).unwrap();
        assert_eq!(r.waited_minutes(now), Some(42));

        // Clock skew never yields a negative wait
        let earlier = NaiveDateTime::parse_from_str("2026-03-01 08:00:00", VISIT_TIME_FORMAT).unwrap();
        assert_eq!(r.waited_minutes(earlier), Some(0));

        assert_eq!(record(3, "yesterday").waited_minutes(now), None);
    }
}
