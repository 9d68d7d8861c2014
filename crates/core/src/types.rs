/// Remote primary keys are integer serials.
pub type ApplicationId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
