//! Application lifecycle stage and job-type vocabularies.
//!
//! Both are closed sets. No transition graph is enforced between stages:
//! any stage may move to any other, including out of `REJECTED` or
//! `WITHDRAWN`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_APPLIED: &str = "APPLIED";
pub const STATUS_HR_INTERVIEW: &str = "HR_INTERVIEW";
pub const STATUS_TECH_INTERVIEW: &str = "TECH_INTERVIEW";
pub const STATUS_CASE_STUDY: &str = "CASE_STUDY";
pub const STATUS_OFFER: &str = "OFFER";
pub const STATUS_REJECTED: &str = "REJECTED";
pub const STATUS_WITHDRAWN: &str = "WITHDRAWN";

/// All valid status strings, in pipeline display order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_APPLIED,
    STATUS_HR_INTERVIEW,
    STATUS_TECH_INTERVIEW,
    STATUS_CASE_STUDY,
    STATUS_OFFER,
    STATUS_REJECTED,
    STATUS_WITHDRAWN,
];

/// Prefix the remote sometimes leaks from its enum repr (`Status.OFFER`).
const ENUM_REPR_PREFIX: &str = "Status.";

// ---------------------------------------------------------------------------
// ApplicationStatus
// ---------------------------------------------------------------------------

/// Pipeline stage of a job application.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// New applications start out here.
    #[default]
    Applied,
    HrInterview,
    TechInterview,
    CaseStudy,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// Every stage, in pipeline display order.
    pub const ALL: [ApplicationStatus; 7] = [
        Self::Applied,
        Self::HrInterview,
        Self::TechInterview,
        Self::CaseStudy,
        Self::Offer,
        Self::Rejected,
        Self::Withdrawn,
    ];

    /// Stages counted as "interviewing" by the analytics summary.
    pub const INTERVIEW_STAGES: [ApplicationStatus; 3] =
        [Self::HrInterview, Self::TechInterview, Self::CaseStudy];

    /// Return the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => STATUS_APPLIED,
            Self::HrInterview => STATUS_HR_INTERVIEW,
            Self::TechInterview => STATUS_TECH_INTERVIEW,
            Self::CaseStudy => STATUS_CASE_STUDY,
            Self::Offer => STATUS_OFFER,
            Self::Rejected => STATUS_REJECTED,
            Self::Withdrawn => STATUS_WITHDRAWN,
        }
    }

    /// Whether this stage counts toward the interview rate.
    pub fn is_interview(&self) -> bool {
        Self::INTERVIEW_STAGES.contains(self)
    }
}

impl FromStr for ApplicationStatus {
    type Err = CoreError;

    /// Parse from a wire string, tolerating a leading `Status.` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(ENUM_REPR_PREFIX).unwrap_or(s) {
            STATUS_APPLIED => Ok(Self::Applied),
            STATUS_HR_INTERVIEW => Ok(Self::HrInterview),
            STATUS_TECH_INTERVIEW => Ok(Self::TechInterview),
            STATUS_CASE_STUDY => Ok(Self::CaseStudy),
            STATUS_OFFER => Ok(Self::Offer),
            STATUS_REJECTED => Ok(Self::Rejected),
            STATUS_WITHDRAWN => Ok(Self::Withdrawn),
            other => Err(CoreError::Validation(format!(
                "Unknown application status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// JobType
// ---------------------------------------------------------------------------

pub const JOB_TYPE_FULL_TIME: &str = "FULL_TIME";
pub const JOB_TYPE_PART_TIME: &str = "PART_TIME";
pub const JOB_TYPE_INTERNSHIP: &str = "INTERNSHIP";
pub const JOB_TYPE_CONTRACT: &str = "CONTRACT";
pub const JOB_TYPE_FREELANCE: &str = "FREELANCE";

/// All valid job type strings.
pub const VALID_JOB_TYPES: &[&str] = &[
    JOB_TYPE_FULL_TIME,
    JOB_TYPE_PART_TIME,
    JOB_TYPE_INTERNSHIP,
    JOB_TYPE_CONTRACT,
    JOB_TYPE_FREELANCE,
];

/// Employment type of the advertised position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    Contract,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => JOB_TYPE_FULL_TIME,
            Self::PartTime => JOB_TYPE_PART_TIME,
            Self::Internship => JOB_TYPE_INTERNSHIP,
            Self::Contract => JOB_TYPE_CONTRACT,
            Self::Freelance => JOB_TYPE_FREELANCE,
        }
    }
}

impl FromStr for JobType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            JOB_TYPE_FULL_TIME => Ok(Self::FullTime),
            JOB_TYPE_PART_TIME => Ok(Self::PartTime),
            JOB_TYPE_INTERNSHIP => Ok(Self::Internship),
            JOB_TYPE_CONTRACT => Ok(Self::Contract),
            JOB_TYPE_FREELANCE => Ok(Self::Freelance),
            other => Err(CoreError::Validation(format!(
                "Unknown job type: '{other}'. Valid types: {}",
                VALID_JOB_TYPES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
