//! In-memory stand-in for the remote applications service.
//!
//! Counts calls per operation, injects failures, and can hold a single
//! call of an operation behind a [`Gate`] so tests can interleave work
//! while a request is in flight.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use jobtrack_client::api::{ApiError, ApplicationsApi};
use jobtrack_core::analytics::{Summary, Timeline, TimelinePoint};
use jobtrack_core::application::{
    Application, ApplicationPayload, StatusChange, StatusHistoryEvent,
};
use jobtrack_core::pagination::QuerySpec;
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::{ApplicationId, Timestamp};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    History,
    Create,
    Update,
    UpdateStatus,
    SoftDelete,
    Summary,
    Timeline,
}

/// Holds one call until released.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Resolve once the held call has reached the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct MockState {
    apps: Vec<Application>,
    history: HashMap<ApplicationId, Vec<StatusHistoryEvent>>,
    next_id: ApplicationId,
    ticks: i64,
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, ApiError>,
    gates: HashMap<Op, Arc<Gate>>,
    queries: Vec<QuerySpec>,
    status_changes: Vec<(ApplicationId, StatusChange)>,
    payloads: Vec<ApplicationPayload>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

pub fn server_error(detail: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        detail: Some(detail.to_string()),
    }
}

pub fn network_error() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    // ---- seeding ----

    /// Insert an application with one history event for `status`.
    pub fn seed(&self, company: &str, position: &str, status: ApplicationStatus) -> ApplicationId {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        let at = state.tick();
        state.apps.push(Application {
            id,
            company_name: company.to_string(),
            position_title: position.to_string(),
            location: None,
            job_type: None,
            source: None,
            applied_date: None,
            notes: None,
            current_status: status,
            is_deleted: false,
        });
        state.history.insert(
            id,
            vec![StatusHistoryEvent {
                status,
                note: Some("seeded".to_string()),
                changed_at: at,
            }],
        );
        id
    }

    pub fn set_source(&self, id: ApplicationId, source: &str) {
        let mut state = self.state();
        if let Some(app) = state.apps.iter_mut().find(|a| a.id == id) {
            app.source = Some(source.to_string());
        }
    }

    /// Change a status behind the client's back, as another session would.
    pub fn set_status_remotely(&self, id: ApplicationId, status: ApplicationStatus) {
        let mut state = self.state();
        state.apply_status(id, status, None);
    }

    // ---- behaviour control ----

    pub fn fail(&self, op: Op, error: ApiError) {
        self.state().failures.insert(op, error);
    }

    pub fn recover(&self, op: Op) {
        self.state().failures.remove(&op);
    }

    /// Hold the next call of `op` until the returned gate is released.
    pub fn hold(&self, op: Op) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state().gates.insert(op, Arc::clone(&gate));
        gate
    }

    // ---- inspection ----

    pub fn calls(&self, op: Op) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    pub fn last_query(&self) -> Option<QuerySpec> {
        self.state().queries.last().cloned()
    }

    pub fn status_changes(&self) -> Vec<(ApplicationId, StatusChange)> {
        self.state().status_changes.clone()
    }

    pub fn payloads(&self) -> Vec<ApplicationPayload> {
        self.state().payloads.clone()
    }

    pub fn remote_status(&self, id: ApplicationId) -> Option<ApplicationStatus> {
        self.state()
            .apps
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.current_status)
    }

    // ---- call plumbing ----

    /// Record the call, wait at its gate if one is set, then report any
    /// injected failure.
    async fn enter(&self, op: Op) -> Result<(), ApiError> {
        let gate = {
            let mut state = self.state();
            *state.calls.entry(op).or_default() += 1;
            state.gates.remove(&op)
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        match self.state().failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl MockState {
    fn tick(&mut self) -> Timestamp {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(self.ticks)
    }

    fn apply_status(&mut self, id: ApplicationId, status: ApplicationStatus, note: Option<String>) {
        let at = self.tick();
        if let Some(app) = self.apps.iter_mut().find(|a| a.id == id) {
            app.current_status = status;
        }
        self.history.entry(id).or_default().push(StatusHistoryEvent {
            status,
            note,
            changed_at: at,
        });
    }

    fn find(&self, id: ApplicationId) -> Result<&Application, ApiError> {
        self.apps.iter().find(|a| a.id == id).ok_or(ApiError::Status {
            status: 404,
            detail: Some("Application not found".to_string()),
        })
    }
}

fn apply_payload(app: &mut Application, payload: &ApplicationPayload) {
    app.company_name = payload.company_name.clone();
    app.position_title = payload.position_title.clone();
    app.location = payload.location.clone();
    app.job_type = payload.job_type;
    app.source = payload.source.clone();
    app.applied_date = payload.applied_date;
    app.notes = payload.notes.clone();
}

#[async_trait]
impl ApplicationsApi for MockApi {
    async fn list(&self, query: &QuerySpec) -> Result<Vec<Application>, ApiError> {
        self.enter(Op::List).await?;
        let mut state = self.state();
        state.queries.push(query.clone());
        let source = query.source().map(str::to_lowercase);
        let skip = ((query.page() - 1) * query.size()) as usize;
        Ok(state
            .apps
            .iter()
            .filter(|a| query.include_deleted() || !a.is_deleted)
            .filter(|a| query.status().map_or(true, |s| a.current_status == s))
            .filter(|a| match (&source, &a.source) {
                (None, _) => true,
                (Some(wanted), Some(actual)) => actual.to_lowercase().contains(wanted.as_str()),
                (Some(_), None) => false,
            })
            .skip(skip)
            .take(query.size() as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: ApplicationId) -> Result<Application, ApiError> {
        self.enter(Op::Get).await?;
        self.state().find(id).cloned()
    }

    async fn history(&self, id: ApplicationId) -> Result<Vec<StatusHistoryEvent>, ApiError> {
        self.enter(Op::History).await?;
        let state = self.state();
        state.find(id)?;
        Ok(state.history.get(&id).cloned().unwrap_or_default())
    }

    async fn create(&self, payload: &ApplicationPayload) -> Result<Application, ApiError> {
        self.enter(Op::Create).await?;
        let mut state = self.state();
        state.payloads.push(payload.clone());
        state.next_id += 1;
        let id = state.next_id;
        let mut app = Application {
            id,
            company_name: String::new(),
            position_title: String::new(),
            location: None,
            job_type: None,
            source: None,
            applied_date: None,
            notes: None,
            current_status: ApplicationStatus::Applied,
            is_deleted: false,
        };
        apply_payload(&mut app, payload);
        state.apps.push(app.clone());
        state.apply_status(id, ApplicationStatus::Applied, Some("created".to_string()));
        Ok(app)
    }

    async fn update(
        &self,
        id: ApplicationId,
        payload: &ApplicationPayload,
    ) -> Result<Application, ApiError> {
        self.enter(Op::Update).await?;
        let mut state = self.state();
        state.payloads.push(payload.clone());
        state.find(id)?;
        let app = state
            .apps
            .iter_mut()
            .find(|a| a.id == id)
            .expect("checked above");
        apply_payload(app, payload);
        Ok(app.clone())
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        change: &StatusChange,
    ) -> Result<(), ApiError> {
        self.enter(Op::UpdateStatus).await?;
        let mut state = self.state();
        state.find(id)?;
        state.status_changes.push((id, change.clone()));
        state.apply_status(id, change.status, change.note.clone());
        Ok(())
    }

    async fn soft_delete(&self, id: ApplicationId) -> Result<(), ApiError> {
        self.enter(Op::SoftDelete).await?;
        let mut state = self.state();
        state.find(id)?;
        if let Some(app) = state.apps.iter_mut().find(|a| a.id == id) {
            app.is_deleted = true;
        }
        Ok(())
    }

    async fn summary(&self, include_deleted: bool) -> Result<Summary, ApiError> {
        self.enter(Op::Summary).await?;
        let state = self.state();
        let visible: Vec<&Application> = state
            .apps
            .iter()
            .filter(|a| include_deleted || !a.is_deleted)
            .collect();
        let mut by_status = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        for app in &visible {
            *by_status
                .entry(app.current_status.as_str().to_string())
                .or_insert(0) += 1;
            *by_source
                .entry(app.source.clone().unwrap_or_else(|| "UNKNOWN".to_string()))
                .or_insert(0) += 1;
        }
        let total = visible.len() as u64;
        let interviews = visible
            .iter()
            .filter(|a| a.current_status.is_interview())
            .count() as u64;
        Ok(Summary {
            total_applications: total,
            by_status,
            by_source,
            interview_count: interviews,
            interview_rate: if total == 0 {
                0.0
            } else {
                interviews as f64 / total as f64
            },
            applied_last_7_days: 0,
            include_deleted,
        })
    }

    async fn timeline(&self, days: u32, include_deleted: bool) -> Result<Timeline, ApiError> {
        self.enter(Op::Timeline).await?;
        let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let from = to - Duration::days(i64::from(days) - 1);
        let series = from
            .iter_days()
            .take(days as usize)
            .map(|date| TimelinePoint { date, count: 0 })
            .collect();
        Ok(Timeline {
            days,
            from,
            to,
            series,
            include_deleted,
        })
    }
}

// ---- view helpers ----

pub fn as_port(api: &Arc<MockApi>) -> Arc<dyn ApplicationsApi> {
    Arc::clone(api) as Arc<dyn ApplicationsApi>
}

pub fn list_view(
    api: &Arc<MockApi>,
    notifications: &jobtrack_client::NotificationChannel,
) -> jobtrack_client::views::ApplicationListView {
    jobtrack_client::views::ApplicationListView::new(
        as_port(api),
        notifications.clone(),
        jobtrack_core::pagination::DEFAULT_PAGE_SIZE,
    )
    .expect("default page size is valid")
}

pub fn detail_view(
    api: &Arc<MockApi>,
    notifications: &jobtrack_client::NotificationChannel,
    id: ApplicationId,
) -> jobtrack_client::views::ApplicationDetailView {
    jobtrack_client::views::ApplicationDetailView::new(as_port(api), notifications.clone(), id)
}
