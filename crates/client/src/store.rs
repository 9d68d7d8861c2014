//! Cached list and detail snapshots of applications.
//!
//! [`ApplicationStore`] exclusively owns the snapshots. Every load fully
//! replaces the snapshot it targets; nothing is patched incrementally.
//! A load that completes after an optimistic status echo therefore wins,
//! which can visibly revert the echo until the transition's own reload
//! lands. That race is accepted.
//!
//! Loads capture the store epoch when issued and are discarded if the
//! epoch has moved on by the time they complete.

use std::sync::Arc;

use jobtrack_core::application::Application;
use jobtrack_core::pagination::QuerySpec;
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::ApplicationId;
use tokio::sync::RwLock;

use crate::api::ApplicationsApi;
use crate::epoch::{Epoch, EpochToken};
use crate::error::{ClientError, ClientResult};
use crate::history::{ApplicationDetail, HistoryReconciler};

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was replaced; carries the number of rows (list) or
    /// history events (detail) now cached.
    Applied(usize),
    /// The view moved on while the request was in flight; nothing changed.
    Discarded,
}

#[derive(Debug, Default)]
struct Snapshots {
    rows: Vec<Application>,
    detail: Option<ApplicationDetail>,
}

pub struct ApplicationStore {
    api: Arc<dyn ApplicationsApi>,
    reconciler: HistoryReconciler,
    snapshots: RwLock<Snapshots>,
    epoch: Epoch,
}

impl ApplicationStore {
    pub fn new(api: Arc<dyn ApplicationsApi>) -> Self {
        Self {
            reconciler: HistoryReconciler::new(Arc::clone(&api)),
            api,
            snapshots: RwLock::new(Snapshots::default()),
            epoch: Epoch::new(),
        }
    }

    // ---- epoch ----

    pub fn epoch(&self) -> EpochToken {
        self.epoch.current()
    }

    pub fn is_current(&self, token: EpochToken) -> bool {
        self.epoch.is_current(token)
    }

    /// Make every in-flight request stale. Called when the view unmounts.
    pub fn invalidate(&self) -> EpochToken {
        let next = self.epoch.advance();
        tracing::debug!(epoch = next, "Store epoch advanced");
        next
    }

    // ---- loads ----

    /// Fetch one page and replace the cached rows with it.
    ///
    /// Errors from a stale request are swallowed along with its rows.
    pub async fn load(&self, query: &QuerySpec) -> ClientResult<LoadOutcome> {
        let token = self.epoch.current();
        let result = self.api.list(query).await;

        if !self.epoch.is_current(token) {
            tracing::debug!(epoch = token, page = query.page(), "Discarding stale list response");
            return Ok(LoadOutcome::Discarded);
        }

        let rows = result.map_err(|e| {
            tracing::warn!(page = query.page(), error = %e, "List load failed");
            ClientError::from(e)
        })?;

        let count = rows.len();
        self.snapshots.write().await.rows = rows;
        tracing::debug!(page = query.page(), rows = count, "List snapshot replaced");
        Ok(LoadOutcome::Applied(count))
    }

    /// Fetch an application with its history and replace the detail snapshot.
    pub async fn load_detail(&self, id: ApplicationId) -> ClientResult<LoadOutcome> {
        let token = self.epoch.current();
        let result = self.reconciler.fetch(id).await;

        if !self.epoch.is_current(token) {
            tracing::debug!(epoch = token, application_id = id, "Discarding stale detail response");
            return Ok(LoadOutcome::Discarded);
        }

        let detail = result?;
        let events = detail.history.len();
        self.snapshots.write().await.detail = Some(detail);
        Ok(LoadOutcome::Applied(events))
    }

    // ---- reads ----

    pub async fn rows(&self) -> Vec<Application> {
        self.snapshots.read().await.rows.clone()
    }

    pub async fn detail(&self) -> Option<ApplicationDetail> {
        self.snapshots.read().await.detail.clone()
    }

    /// Cached copy of application `id`, from the list then the detail.
    pub async fn cached(&self, id: ApplicationId) -> Option<Application> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .rows
            .iter()
            .chain(snapshots.detail.as_ref().map(|d| &d.application))
            .find(|app| app.id == id)
            .cloned()
    }

    /// Application `id`, served from the cache when loaded and fetched
    /// from the remote otherwise.
    ///
    /// Soft-deleted applications are returned with `is_deleted` set; an id
    /// the remote does not know is [`ClientError::NotFound`]. A fetched
    /// record does not touch the snapshots.
    pub async fn get(&self, id: ApplicationId) -> ClientResult<Application> {
        if let Some(app) = self.cached(id).await {
            return Ok(app);
        }

        tracing::debug!(application_id = id, "Application not cached, fetching");
        self.api.get(id).await.map_err(|e| {
            tracing::warn!(application_id = id, error = %e, "Application fetch failed");
            ClientError::from(e)
        })
    }

    // ---- single-row mutation (status transitions only) ----

    /// Overwrite the cached status of `id` and return the prior value.
    ///
    /// Returns `None` if the row is not cached, in which case nothing
    /// changed.
    pub(crate) async fn apply_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Option<ApplicationStatus> {
        let mut snapshots = self.snapshots.write().await;
        let mut prior = None;
        for app in snapshots.cached_mut(id) {
            prior.get_or_insert(app.current_status);
            app.current_status = status;
        }
        prior
    }

    /// Put `prior` back wherever the cache still shows `tentative`.
    ///
    /// A row that a newer load has already replaced with something else is
    /// left alone. Returns `true` if any copy was restored.
    pub(crate) async fn restore_status(
        &self,
        id: ApplicationId,
        tentative: ApplicationStatus,
        prior: ApplicationStatus,
    ) -> bool {
        let mut snapshots = self.snapshots.write().await;
        let mut restored = false;
        for app in snapshots.cached_mut(id) {
            if app.current_status == tentative {
                app.current_status = prior;
                restored = true;
            }
        }
        restored
    }
}

impl Snapshots {
    /// Every cached copy of application `id`.
    fn cached_mut(&mut self, id: ApplicationId) -> impl Iterator<Item = &mut Application> {
        self.rows
            .iter_mut()
            .chain(self.detail.as_mut().map(|d| &mut d.application))
            .filter(move |app| app.id == id)
    }
}
