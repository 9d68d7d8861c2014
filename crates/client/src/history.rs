//! Loads an application together with its status history.
//!
//! Both reads are issued concurrently and the load only succeeds when both
//! do. History without its parent application is never returned. Nothing
//! is cached here: every call goes to the remote.

use std::sync::Arc;

use jobtrack_core::application::{history_is_ordered, Application, StatusHistoryEvent};
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::ApplicationId;

use crate::api::ApplicationsApi;
use crate::error::ClientResult;

/// An application and its audit trail, as fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub history: Vec<StatusHistoryEvent>,
}

impl ApplicationDetail {
    /// Status of the most recent history event.
    pub fn latest_status(&self) -> Option<ApplicationStatus> {
        self.history.last().map(|event| event.status)
    }

    /// Whether `current_status` agrees with the newest history event.
    ///
    /// Trivially true when there is no history yet.
    pub fn is_consistent(&self) -> bool {
        self.latest_status()
            .map_or(true, |latest| latest == self.application.current_status)
    }

    pub fn history_is_ordered(&self) -> bool {
        history_is_ordered(&self.history)
    }
}

pub struct HistoryReconciler {
    api: Arc<dyn ApplicationsApi>,
}

impl HistoryReconciler {
    pub fn new(api: Arc<dyn ApplicationsApi>) -> Self {
        Self { api }
    }

    /// Fetch the application and its history concurrently.
    ///
    /// Fails if either request fails. The history is returned exactly as
    /// the remote ordered it; anomalies are logged, not repaired.
    pub async fn fetch(&self, id: ApplicationId) -> ClientResult<ApplicationDetail> {
        let (application, history) = tokio::try_join!(self.api.get(id), self.api.history(id))
            .map_err(|e| {
                tracing::warn!(application_id = id, error = %e, "Detail load failed");
                e
            })?;

        let detail = ApplicationDetail {
            application,
            history,
        };

        if !detail.history_is_ordered() {
            tracing::warn!(
                application_id = id,
                events = detail.history.len(),
                "Status history is not ordered by changed_at",
            );
        }
        if !detail.is_consistent() {
            tracing::warn!(
                application_id = id,
                current_status = %detail.application.current_status,
                latest_event = ?detail.latest_status(),
                "Current status disagrees with latest history event",
            );
        }

        tracing::debug!(
            application_id = id,
            events = detail.history.len(),
            "Detail loaded",
        );
        Ok(detail)
    }
}
