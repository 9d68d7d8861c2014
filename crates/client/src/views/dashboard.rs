//! Analytics dashboard: summary counters and a daily timeline.

use std::sync::{Arc, Mutex, PoisonError};

use jobtrack_core::analytics::{validate_timeline_days, Summary, Timeline};

use super::MSG_LOAD_FAILED;
use crate::api::ApplicationsApi;
use crate::epoch::Epoch;
use crate::error::{ClientError, ClientResult};
use crate::store::LoadOutcome;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub summary: Option<Summary>,
    pub timeline: Option<Timeline>,
    pub error: Option<String>,
}

pub struct DashboardView {
    api: Arc<dyn ApplicationsApi>,
    days: u32,
    include_deleted: bool,
    epoch: Epoch,
    state: Mutex<DashboardState>,
}

impl DashboardView {
    /// Fails if `days` is outside the window the remote accepts.
    pub fn new(api: Arc<dyn ApplicationsApi>, days: u32) -> ClientResult<Self> {
        Ok(Self {
            api,
            days: validate_timeline_days(days)?,
            include_deleted: false,
            epoch: Epoch::new(),
            state: Mutex::new(DashboardState::default()),
        })
    }

    /// Count soft-deleted applications too.
    pub fn with_include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn state(&self) -> DashboardState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch summary and timeline concurrently; both must succeed.
    pub async fn load(&self) -> ClientResult<LoadOutcome> {
        let token = self.epoch.current();
        let result = tokio::try_join!(
            self.api.summary(self.include_deleted),
            self.api.timeline(self.days, self.include_deleted),
        );

        if !self.epoch.is_current(token) {
            return Ok(LoadOutcome::Discarded);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok((summary, timeline)) => {
                let points = timeline.series.len();
                state.summary = Some(summary);
                state.timeline = Some(timeline);
                state.error = None;
                Ok(LoadOutcome::Applied(points))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard load failed");
                let error = ClientError::from(e);
                state.error = Some(error.user_message(MSG_LOAD_FAILED));
                Err(error)
            }
        }
    }

    pub fn unmount(&self) {
        self.epoch.advance();
    }
}
