//! Dashboard analytics payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default timeline window in days.
pub const DEFAULT_TIMELINE_DAYS: u32 = 30;

/// Shortest timeline window the remote accepts.
pub const MIN_TIMELINE_DAYS: u32 = 7;

/// Longest timeline window the remote accepts.
pub const MAX_TIMELINE_DAYS: u32 = 365;

/// Aggregate counters over all (optionally including deleted) applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_applications: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_source: BTreeMap<String, u64>,
    pub interview_count: u64,
    /// Fraction in `0.0..=1.0`.
    pub interview_rate: f64,
    pub applied_last_7_days: u64,
    #[serde(default)]
    pub include_deleted: bool,
}

impl Summary {
    /// Interview rate as a percentage rounded to one decimal place.
    pub fn interview_rate_percent(&self) -> f64 {
        (self.interview_rate * 1000.0).round() / 10.0
    }
}

/// Per-day application count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: u64,
}

/// Daily applied counts for the trailing `days` window, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub days: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub series: Vec<TimelinePoint>,
    #[serde(default)]
    pub include_deleted: bool,
}

/// Validate a requested timeline window.
pub fn validate_timeline_days(days: u32) -> Result<u32, CoreError> {
    if (MIN_TIMELINE_DAYS..=MAX_TIMELINE_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(CoreError::Validation(format!(
            "Timeline window must be between {MIN_TIMELINE_DAYS} and {MAX_TIMELINE_DAYS} days, got {days}"
        )))
    }
}
