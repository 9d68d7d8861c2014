//! Single-application view with its status history.

use std::sync::{Arc, Mutex, PoisonError};

use jobtrack_core::form::ApplicationForm;
use jobtrack_core::status::ApplicationStatus;
use jobtrack_core::types::ApplicationId;

use super::{
    banner_for, no_pending_delete, validate_form, DeleteIntent, MSG_DELETED, MSG_DELETE_FAILED,
    MSG_LOAD_FAILED, MSG_SAVED, MSG_SAVE_FAILED, NOTE_FROM_DETAIL,
};
use crate::api::ApplicationsApi;
use crate::error::{ClientError, ClientResult};
use crate::history::ApplicationDetail;
use crate::notification::NotificationChannel;
use crate::store::{ApplicationStore, LoadOutcome};
use crate::transition::{
    ReloadTarget, RowPhase, StatusTransitionController, TransitionOutcome, TransitionReport,
    MSG_STATUS_UPDATE_FAILED,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailViewState {
    pub loading: bool,
    /// Inline error banner; while set the view shows the error instead of
    /// the application.
    pub error: Option<String>,
    pub delete_intent: Option<DeleteIntent>,
    /// Set after a successful delete; the presentation navigates back to
    /// the list.
    pub closed: bool,
    delete_requests: u64,
}

pub struct ApplicationDetailView {
    id: ApplicationId,
    api: Arc<dyn ApplicationsApi>,
    store: Arc<ApplicationStore>,
    transitions: StatusTransitionController,
    notifications: NotificationChannel,
    state: Mutex<DetailViewState>,
}

impl ApplicationDetailView {
    pub fn new(
        api: Arc<dyn ApplicationsApi>,
        notifications: NotificationChannel,
        id: ApplicationId,
    ) -> Self {
        let store = Arc::new(ApplicationStore::new(Arc::clone(&api)));
        let transitions = StatusTransitionController::new(
            Arc::clone(&store),
            Arc::clone(&api),
            notifications.clone(),
        );

        Self {
            id,
            api,
            store,
            transitions,
            notifications,
            state: Mutex::new(DetailViewState {
                loading: false,
                error: None,
                delete_intent: None,
                closed: false,
                delete_requests: 0,
            }),
        }
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut DetailViewState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn set_error(&self, message: String) {
        self.update_state(|s| s.error = Some(message));
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn state(&self) -> DetailViewState {
        self.update_state(|s| s.clone())
    }

    /// The loaded application and history, if a load has succeeded.
    pub async fn detail(&self) -> Option<ApplicationDetail> {
        self.store.detail().await
    }

    pub fn is_status_pending(&self) -> bool {
        self.transitions.phase(self.id) == RowPhase::Pending
    }

    pub fn store(&self) -> &Arc<ApplicationStore> {
        &self.store
    }

    /// Fetch the application and its history.
    pub async fn load(&self) -> ClientResult<LoadOutcome> {
        self.update_state(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.store.load_detail(self.id).await;

        self.update_state(|s| {
            s.loading = false;
            if let Err(e) = &result {
                s.error = Some(e.user_message(MSG_LOAD_FAILED));
            }
        });
        if result.is_err() {
            self.notifications.error(MSG_LOAD_FAILED);
        }
        result
    }

    pub fn unmount(&self) {
        self.store.invalidate();
    }

    /// Change the status of the displayed application.
    ///
    /// Soft-deleted applications are not special-cased; the remote decides.
    pub async fn change_status(&self, target: ApplicationStatus) -> TransitionReport {
        self.update_state(|s| s.error = None);
        let report = self
            .transitions
            .change_status(self.id, target, NOTE_FROM_DETAIL, || ReloadTarget::Detail(self.id))
            .await;

        if let TransitionOutcome::RolledBack(e) = &report.outcome {
            self.set_error(e.user_message(MSG_STATUS_UPDATE_FAILED));
        } else if let Some(e) = &report.reload_error {
            self.set_error(e.user_message(MSG_LOAD_FAILED));
        }
        report
    }

    /// Validate and save edits, then reload the detail.
    pub async fn update(&self, form: &ApplicationForm) -> ClientResult<()> {
        self.update_state(|s| s.error = None);
        let result = self.submit_update(form).await;
        if let Err(e) = &result {
            self.set_error(banner_for(e, MSG_SAVE_FAILED));
        }
        result
    }

    async fn submit_update(&self, form: &ApplicationForm) -> ClientResult<()> {
        let payload = validate_form(form, &self.notifications)?;
        self.api.update(self.id, &payload).await.map_err(|e| {
            tracing::warn!(application_id = self.id, error = %e, "Update failed");
            self.notifications.error(MSG_SAVE_FAILED);
            ClientError::from(e)
        })?;

        tracing::info!(application_id = self.id, "Application updated");
        let _ = self.load().await;
        self.notifications.success(MSG_SAVED);
        Ok(())
    }

    pub fn request_delete(&self) -> DeleteIntent {
        self.update_state(|s| {
            let intent = DeleteIntent::issue(self.id, &mut s.delete_requests);
            s.delete_intent = Some(intent);
            intent
        })
    }

    pub fn cancel_delete(&self) {
        self.update_state(|s| s.delete_intent = None);
    }

    /// Soft-delete the application and close the view.
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

        if let Err(e) = self.api.soft_delete(self.id).await {
            let error = ClientError::from(e);
            tracing::warn!(application_id = self.id, error = %error, "Soft delete failed");
            self.set_error(error.user_message(MSG_DELETE_FAILED));
            self.notifications.error(MSG_DELETE_FAILED);
            return Err(error);
        }

        tracing::info!(application_id = self.id, "Application soft-deleted");
        self.notifications.success(MSG_DELETED);
        self.update_state(|s| s.closed = true);
        self.unmount();
        Ok(())
    }
}
