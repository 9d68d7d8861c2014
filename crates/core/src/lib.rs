//! Domain types for the job application tracker client.
//!
//! Pure data and validation with no I/O: the status vocabulary, the
//! application and history read models, write payloads, list query
//! composition, the form validation gate, and analytics payloads.

pub mod analytics;
pub mod application;
pub mod error;
pub mod form;
pub mod pagination;
pub mod status;
pub mod types;
