//! Per-view controllers that the presentation layer drives.
//!
//! Each view owns its own [`ApplicationStore`](crate::store::ApplicationStore)
//! (and therefore its own epoch), exposes a typed state snapshot, and
//! reports every outcome through the shared
//! [`NotificationChannel`](crate::notification::NotificationChannel).

pub mod dashboard;
pub mod detail;
pub mod list;

use jobtrack_core::application::ApplicationPayload;
use jobtrack_core::error::CoreError;
use jobtrack_core::form::ApplicationForm;
use jobtrack_core::types::ApplicationId;

use crate::error::{ClientError, ClientResult};
use crate::notification::NotificationChannel;

pub use dashboard::DashboardView;
pub use detail::ApplicationDetailView;
pub use list::ApplicationListView;

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

pub const MSG_REQUIRED_BANNER: &str = "Company and Position are required.";
pub const MSG_REQUIRED_TOAST: &str = "Company & Position required";
pub const MSG_CREATED: &str = "Created";
pub const MSG_CREATE_FAILED: &str = "Create failed";
pub const MSG_SAVED: &str = "Saved";
pub const MSG_SAVE_FAILED: &str = "Save failed";
pub const MSG_DELETED: &str = "Deleted (soft)";
pub const MSG_DELETE_FAILED: &str = "Delete failed";
pub const MSG_LOAD_FAILED: &str = "Failed to load";

pub const NOTE_FROM_LIST: &str = "updated from list";
pub const NOTE_FROM_DETAIL: &str = "updated from detail page";

// ---------------------------------------------------------------------------
// Two-step delete
// ---------------------------------------------------------------------------

/// A pending soft-delete awaiting user confirmation.
///
/// Produced by `request_delete`; only the most recent intent of a view can
/// be confirmed. The nonce counts requests within the issuing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteIntent {
    pub id: ApplicationId,
    nonce: u64,
}

impl DeleteIntent {
    /// Record a new request in `requests` and build its intent.
    fn issue(id: ApplicationId, requests: &mut u64) -> Self {
        *requests += 1;
        Self {
            id,
            nonce: *requests,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Run the form gate, raising the validation notification on failure.
///
/// A failure here means no request may be issued.
fn validate_form(
    form: &ApplicationForm,
    notifications: &NotificationChannel,
) -> ClientResult<ApplicationPayload> {
    jobtrack_core::form::validate(form).map_err(|e| {
        match &e {
            CoreError::MissingFields(fields) => {
                tracing::debug!(?fields, "Form rejected, required fields blank");
                notifications.error(MSG_REQUIRED_TOAST);
            }
            other => notifications.error(other.to_string()),
        }
        ClientError::Validation(e)
    })
}

/// Inline banner text for a failed operation.
fn banner_for(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Validation(CoreError::MissingFields(_)) => MSG_REQUIRED_BANNER.to_string(),
        other => other.user_message(fallback),
    }
}

fn no_pending_delete() -> ClientError {
    ClientError::Validation(CoreError::Validation(
        "No matching delete request is pending".to_string(),
    ))
}
