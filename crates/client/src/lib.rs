//! Client-side state synchronization for the job application tracker.
//!
//! Keeps locally cached views of applications and their status history
//! consistent with the remote system of record:
//!
//! - [`store::ApplicationStore`]: list/detail snapshots, fully replaced
//!   on every load, with an epoch that discards stale responses.
//! - [`transition::StatusTransitionController`]: optimistic status
//!   changes with rollback, per-row single-flight, and reload on settle.
//! - [`history::HistoryReconciler`]: concurrent application + history
//!   fetch that fails as a whole.
//! - [`notification::NotificationChannel`]: single-slot auto-expiring
//!   feedback.
//! - [`views`]: list, detail and dashboard controllers built on the above.
//! - [`api`]: the remote port and its reqwest implementation.

pub mod api;
pub mod config;
pub mod epoch;
pub mod error;
pub mod history;
pub mod notification;
pub mod store;
pub mod transition;
pub mod views;

pub use api::{ApiError, ApplicationsApi, HttpApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use notification::{NotificationChannel, NotificationKind};
