//! Optimistic status transitions with rollback and per-row single-flight.
//!
//! Each row moves `Idle -> Pending -> (Committed | RolledBack) -> Idle`.
//!
//! - Entering `Pending` claims the row; a second request for a row that is
//!   already pending is refused without touching the cache or the remote.
//! - The cached status is overwritten immediately and the prior value is
//!   kept for rollback.
//! - On success the prior value is dropped and a success notification is
//!   raised. On any failure the prior value is restored (only where the
//!   cache still shows the tentative value) and an error notification is
//!   raised.
//! - Either way the affected list or detail is reloaded before the row is
//!   released, so the cache converges to the remote's state. The reload
//!   target is resolved only at that point, so a filter or page change made
//!   while the request was in flight is honoured.
//!
//! If the view is unmounted while the request is in flight, neither the
//! rollback nor the reload is applied.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use jobtrack_core::application::StatusChange;
use jobtrack_core::pagination::QuerySpec;
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::ApplicationId;

use crate::api::ApplicationsApi;
use crate::error::{ClientError, ClientResult};
use crate::notification::NotificationChannel;
use crate::store::{ApplicationStore, LoadOutcome};

pub const MSG_STATUS_UPDATED: &str = "Status updated";
pub const MSG_STATUS_UPDATE_FAILED: &str = "Status update failed";

/// Per-row transition phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    Idle,
    Pending,
}

/// What to reload once a transition settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadTarget {
    List(QuerySpec),
    Detail(ApplicationId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The remote accepted the change.
    Committed,
    /// The remote rejected the change or could not be reached.
    RolledBack(ClientError),
    /// Another transition for the same row was still in flight.
    AlreadyPending,
}

/// Result of [`StatusTransitionController::change_status`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport {
    pub outcome: TransitionOutcome,
    /// Set when the post-settlement reload itself failed.
    pub reload_error: Option<ClientError>,
}

impl TransitionReport {
    fn skipped(outcome: TransitionOutcome) -> Self {
        Self {
            outcome,
            reload_error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pending guard
// ---------------------------------------------------------------------------

type PendingRows = Arc<Mutex<HashSet<ApplicationId>>>;

/// Releases the row when dropped, including when the transition future
/// is dropped mid-flight.
struct PendingGuard {
    rows: PendingRows,
    id: ApplicationId,
}

impl PendingGuard {
    fn acquire(rows: &PendingRows, id: ApplicationId) -> Option<Self> {
        let claimed = rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        claimed.then(|| Self {
            rows: Arc::clone(rows),
            id,
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct StatusTransitionController {
    store: Arc<ApplicationStore>,
    api: Arc<dyn ApplicationsApi>,
    notifications: NotificationChannel,
    pending: PendingRows,
}

impl StatusTransitionController {
    pub fn new(
        store: Arc<ApplicationStore>,
        api: Arc<dyn ApplicationsApi>,
        notifications: NotificationChannel,
    ) -> Self {
        Self {
            store,
            api,
            notifications,
            pending: Arc::default(),
        }
    }

    pub fn phase(&self, id: ApplicationId) -> RowPhase {
        if self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
        {
            RowPhase::Pending
        } else {
            RowPhase::Idle
        }
    }

    /// Ids of every row with a transition in flight.
    pub fn pending_rows(&self) -> Vec<ApplicationId> {
        let mut ids: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Move application `id` to `target`, optimistically.
    ///
    /// `reload` is called once the change has settled and names what to
    /// reload at that moment.
    pub async fn change_status(
        &self,
        id: ApplicationId,
        target: ApplicationStatus,
        note: &str,
        reload: impl FnOnce() -> ReloadTarget,
    ) -> TransitionReport {
        let Some(_guard) = PendingGuard::acquire(&self.pending, id) else {
            tracing::debug!(application_id = id, %target, "Transition already pending, ignoring");
            return TransitionReport::skipped(TransitionOutcome::AlreadyPending);
        };

        let token = self.store.epoch();
        let prior = self.store.apply_status(id, target).await;
        tracing::debug!(application_id = id, %target, ?prior, "Status echoed optimistically");

        let result = self
            .api
            .update_status(id, &StatusChange::new(target, note))
            .await;
        let still_mounted = self.store.is_current(token);

        let outcome = match result {
            Ok(()) => {
                tracing::info!(application_id = id, %target, "Status change committed");
                self.notifications.success(MSG_STATUS_UPDATED);
                TransitionOutcome::Committed
            }
            Err(e) => {
                let error = ClientError::from(e);
                tracing::warn!(application_id = id, %target, error = %error, "Status change rejected");
                if still_mounted {
                    if let Some(prior) = prior {
                        self.store.restore_status(id, target, prior).await;
                    }
                }
                self.notifications.error(MSG_STATUS_UPDATE_FAILED);
                TransitionOutcome::RolledBack(error)
            }
        };

        if !still_mounted {
            tracing::debug!(application_id = id, "View unmounted during transition, skipping reload");
            return TransitionReport::skipped(outcome);
        }

        let reload = reload();
        tracing::debug!(application_id = id, ?reload, "Reloading after transition");
        let reload_error = self.reload(&reload).await.err();
        TransitionReport {
            outcome,
            reload_error,
        }
    }

    async fn reload(&self, target: &ReloadTarget) -> ClientResult<LoadOutcome> {
        match target {
            ReloadTarget::List(query) => self.store.load(query).await,
            ReloadTarget::Detail(id) => self.store.load_detail(*id).await,
        }
    }
}
