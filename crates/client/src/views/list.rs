//! Paginated, filterable list of applications.

use std::sync::{Arc, Mutex, PoisonError};

use jobtrack_core::application::Application;
use jobtrack_core::form::ApplicationForm;
use jobtrack_core::pagination::{compose, ListFilters, PageControls, QuerySpec, FIRST_PAGE};
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::ApplicationId;

use super::{
    banner_for, no_pending_delete, validate_form, DeleteIntent, MSG_CREATED, MSG_CREATE_FAILED,
    MSG_DELETED, MSG_DELETE_FAILED, MSG_LOAD_FAILED, MSG_SAVED, MSG_SAVE_FAILED, NOTE_FROM_LIST,
};
use crate::api::ApplicationsApi;
use crate::error::{ClientError, ClientResult};
use crate::notification::NotificationChannel;
use crate::store::{ApplicationStore, LoadOutcome};
use crate::transition::{
    ReloadTarget, RowPhase, StatusTransitionController, TransitionOutcome, TransitionReport,
    MSG_STATUS_UPDATE_FAILED,
};

/// Everything the list screen renders besides the rows themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ListViewState {
    pub query: QuerySpec,
    pub loading: bool,
    /// Inline error banner.
    pub error: Option<String>,
    pub delete_intent: Option<DeleteIntent>,
    delete_requests: u64,
}

pub struct ApplicationListView {
    api: Arc<dyn ApplicationsApi>,
    store: Arc<ApplicationStore>,
    transitions: StatusTransitionController,
    notifications: NotificationChannel,
    state: Mutex<ListViewState>,
}

impl ApplicationListView {
    /// Create the view on the first page with no filters.
    ///
    /// Fails if `page_size` is zero.
    pub fn new(
        api: Arc<dyn ApplicationsApi>,
        notifications: NotificationChannel,
        page_size: u32,
    ) -> ClientResult<Self> {
        let query = compose(ListFilters::default(), FIRST_PAGE, page_size)?;
        let store = Arc::new(ApplicationStore::new(Arc::clone(&api)));
        let transitions = StatusTransitionController::new(
            Arc::clone(&store),
            Arc::clone(&api),
            notifications.clone(),
        );

        Ok(Self {
            api,
            store,
            transitions,
            notifications,
            state: Mutex::new(ListViewState {
                query,
                loading: false,
                error: None,
                delete_intent: None,
                delete_requests: 0,
            }),
        })
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut ListViewState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn set_error(&self, message: String) {
        self.update_state(|s| s.error = Some(message));
    }

    // ---- reads ----

    pub fn state(&self) -> ListViewState {
        self.update_state(|s| s.clone())
    }

    pub fn query(&self) -> QuerySpec {
        self.update_state(|s| s.query.clone())
    }

    pub async fn rows(&self) -> Vec<Application> {
        self.store.rows().await
    }

    pub fn page_controls(&self) -> PageControls {
        self.update_state(|s| s.query.controls())
    }

    /// Whether the status control of row `id` should be disabled.
    pub fn is_row_pending(&self, id: ApplicationId) -> bool {
        self.transitions.phase(id) == RowPhase::Pending
    }

    pub fn pending_rows(&self) -> Vec<ApplicationId> {
        self.transitions.pending_rows()
    }

    pub fn store(&self) -> &Arc<ApplicationStore> {
        &self.store
    }

    // ---- loading and navigation ----

    /// Reload the current page.
    pub async fn refresh(&self) -> ClientResult<LoadOutcome> {
        let query = self.update_state(|s| {
            s.loading = true;
            s.error = None;
            s.query.clone()
        });

        let result = self.store.load(&query).await;

        self.update_state(|s| {
            s.loading = false;
            if let Err(e) = &result {
                s.error = Some(e.user_message(MSG_LOAD_FAILED));
            }
        });
        result
    }

    pub async fn set_status_filter(
        &self,
        status: Option<ApplicationStatus>,
    ) -> ClientResult<LoadOutcome> {
        self.update_state(|s| s.query = s.query.with_status(status));
        self.refresh().await
    }

    pub async fn set_source_filter(&self, source: Option<String>) -> ClientResult<LoadOutcome> {
        self.update_state(|s| s.query = s.query.with_source(source));
        self.refresh().await
    }

    pub async fn set_include_deleted(&self, include_deleted: bool) -> ClientResult<LoadOutcome> {
        self.update_state(|s| s.query = s.query.with_include_deleted(include_deleted));
        self.refresh().await
    }

    /// Always allowed; an empty page is a valid result.
    pub async fn next_page(&self) -> ClientResult<LoadOutcome> {
        self.update_state(|s| s.query = s.query.next_page());
        self.refresh().await
    }

    pub async fn prev_page(&self) -> ClientResult<LoadOutcome> {
        self.update_state(|s| s.query = s.query.prev_page());
        self.refresh().await
    }

    /// Stop applying responses to this view.
    pub fn unmount(&self) {
        self.store.invalidate();
    }

    // ---- writes ----

    pub async fn change_status(
        &self,
        id: ApplicationId,
        target: ApplicationStatus,
    ) -> TransitionReport {
        self.update_state(|s| s.error = None);

        let report = self
            .transitions
            .change_status(id, target, NOTE_FROM_LIST, || ReloadTarget::List(self.query()))
            .await;

        if let TransitionOutcome::RolledBack(e) = &report.outcome {
            self.set_error(e.user_message(MSG_STATUS_UPDATE_FAILED));
        } else if let Some(e) = &report.reload_error {
            self.set_error(e.user_message(MSG_LOAD_FAILED));
        }
        report
    }

    /// Validate and create an application, then reload the page.
    pub async fn create(&self, form: &ApplicationForm) -> ClientResult<Application> {
        self.update_state(|s| s.error = None);
        let result = self.submit_create(form).await;
        if let Err(e) = &result {
            self.set_error(banner_for(e, MSG_CREATE_FAILED));
        }
        result
    }

    async fn submit_create(&self, form: &ApplicationForm) -> ClientResult<Application> {
        let payload = validate_form(form, &self.notifications)?;
        let created = self.api.create(&payload).await.map_err(|e| {
            tracing::warn!(error = %e, "Create failed");
            self.notifications.error(MSG_CREATE_FAILED);
            ClientError::from(e)
        })?;

        tracing::info!(application_id = created.id, "Application created");
        // A failed reload leaves its own banner; the create still succeeded.
        let _ = self.refresh().await;
        self.notifications.success(MSG_CREATED);
        Ok(created)
    }

    /// Validate and save edits to application `id`, then reload the page.
    pub async fn update(&self, id: ApplicationId, form: &ApplicationForm) -> ClientResult<Application> {
        self.update_state(|s| s.error = None);
        let result = self.submit_update(id, form).await;
        if let Err(e) = &result {
            self.set_error(banner_for(e, MSG_SAVE_FAILED));
        }
        result
    }

    async fn submit_update(&self, id: ApplicationId, form: &ApplicationForm) -> ClientResult<Application> {
        let payload = validate_form(form, &self.notifications)?;
        let updated = self.api.update(id, &payload).await.map_err(|e| {
            tracing::warn!(application_id = id, error = %e, "Update failed");
            self.notifications.error(MSG_SAVE_FAILED);
            ClientError::from(e)
        })?;

        tracing::info!(application_id = id, "Application updated");
        let _ = self.refresh().await;
        self.notifications.success(MSG_SAVED);
        Ok(updated)
    }

    // ---- two-step soft delete ----

    /// Ask for confirmation before deleting `id`. Replaces any earlier intent.
    pub fn request_delete(&self, id: ApplicationId) -> DeleteIntent {
        self.update_state(|s| {
            let intent = DeleteIntent::issue(id, &mut s.delete_requests);
            s.delete_intent = Some(intent);
            intent
        })
    }

    pub fn cancel_delete(&self) {
        self.update_state(|s| s.delete_intent = None);
    }

    /// Perform the soft delete described by `intent`, then reload the page.
    pub async fn confirm_delete(&self, intent: DeleteIntent) -> ClientResult<()> {
        let matched = self.update_state(|s| {
            if s.delete_intent == Some(intent) {
                s.delete_intent = None;
                s.error = None;
                true
            } else {
                false
            }
        });
        if !matched {
            return Err(no_pending_delete());
        }

        if let Err(e) = self.api.soft_delete(intent.id).await {
            let error = ClientError::from(e);
            tracing::warn!(application_id = intent.id, error = %error, "Soft delete failed");
            self.set_error(error.user_message(MSG_DELETE_FAILED));
            self.notifications.error(MSG_DELETE_FAILED);
            return Err(error);
        }

        tracing::info!(application_id = intent.id, "Application soft-deleted");
        let _ = self.refresh().await;
        self.notifications.success(MSG_DELETED);
        Ok(())
    }
}
