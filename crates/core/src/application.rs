//! Application records, their status history, and write payloads.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::status::{ApplicationStatus, JobType};
use crate::types::{ApplicationId, Timestamp};

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// A tracked job application as returned by the remote system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub company_name: String,
    pub position_title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub current_status: ApplicationStatus,
    #[serde(default)]
    pub is_deleted: bool,
}

/// One entry of an application's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEvent {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub changed_at: Timestamp,
}

/// Accept RFC 3339 timestamps as well as the offset-less form the remote
/// emits for naive UTC columns (`2024-05-01T09:30:00.123456`).
fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&chrono::Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

/// Returns `true` if `events` is ordered by non-decreasing `changed_at`.
pub fn history_is_ordered(events: &[StatusHistoryEvent]) -> bool {
    events
        .windows(2)
        .all(|pair| pair[0].changed_at <= pair[1].changed_at)
}

// ---------------------------------------------------------------------------
// Write models
// ---------------------------------------------------------------------------

/// Normalized create/update body.
///
/// Produced only by the form validation gate. Optional fields left blank
/// in the form are `None` and serialize as JSON `null`, never `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationPayload {
    pub company_name: String,
    pub position_title: String,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub source: Option<String>,
    pub applied_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Body of a status change request. The remote appends a history event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub note: Option<String>,
}

impl StatusChange {
    pub fn new(status: ApplicationStatus, note: impl Into<String>) -> Self {
        Self {
            status,
            note: Some(note.into()),
        }
    }
}
