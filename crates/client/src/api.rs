//! Remote port for the applications service and its reqwest transport.
//!
//! [`ApplicationsApi`] is the seam every state component talks to.
//! [`HttpApi`] implements it over the service's JSON HTTP endpoints; tests
//! substitute an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use jobtrack_core::analytics::{Summary, Timeline};
use jobtrack_core::application::{
    Application, ApplicationPayload, StatusChange, StatusHistoryEvent,
};
use jobtrack_core::pagination::QuerySpec;
use jobtrack_core::types::ApplicationId;
use serde::de::DeserializeOwned;

/// Errors from the remote applications service.
///
/// This is the `{status, detail}` shape the state layer consumes; the
/// transport never leaks `reqwest` types past this point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout, decode).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("Remote error ({status}): {}", .detail.as_deref().unwrap_or("<no detail>"))]
    Status {
        status: u16,
        /// Human-readable message extracted from the response body, if any.
        detail: Option<String>,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Operations the client consumes from the remote system of record.
#[async_trait]
pub trait ApplicationsApi: Send + Sync {
    /// List one page of applications, in the order the remote returns them.
    async fn list(&self, query: &QuerySpec) -> Result<Vec<Application>, ApiError>;

    async fn get(&self, id: ApplicationId) -> Result<Application, ApiError>;

    /// Audit trail for one application, ordered by `changed_at`.
    async fn history(&self, id: ApplicationId) -> Result<Vec<StatusHistoryEvent>, ApiError>;

    async fn create(&self, payload: &ApplicationPayload) -> Result<Application, ApiError>;

    async fn update(
        &self,
        id: ApplicationId,
        payload: &ApplicationPayload,
    ) -> Result<Application, ApiError>;

    /// Change the status; the remote appends a history event.
    async fn update_status(&self, id: ApplicationId, change: &StatusChange)
        -> Result<(), ApiError>;

    /// Set `is_deleted` on the remote record.
    async fn soft_delete(&self, id: ApplicationId) -> Result<(), ApiError>;

    async fn summary(&self, include_deleted: bool) -> Result<Summary, ApiError>;

    async fn timeline(&self, days: u32, include_deleted: bool) -> Result<Timeline, ApiError>;
}

// ---------------------------------------------------------------------------
// Error body decoding
// ---------------------------------------------------------------------------

/// Pull a human-readable message out of an error response body.
///
/// Understands `{"detail": "..."}` and the list form
/// `{"detail": [{"loc": [...], "msg": "..."}]}` emitted for request
/// validation failures. Anything else yields `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(msg) if !msg.trim().is_empty() => Some(msg.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|last| last.as_str());
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// HTTP client for the applications service.
pub struct HttpApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpApi {
    /// Create a client for the service at `api_url` (e.g. `http://host:8000`).
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`ApiError::Status`] carrying the extracted detail message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationsApi for HttpApi {
    async fn list(&self, query: &QuerySpec) -> Result<Vec<Application>, ApiError> {
        let response = self
            .client
            .get(self.url("/applications"))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get(&self, id: ApplicationId) -> Result<Application, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/applications/{id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn history(&self, id: ApplicationId) -> Result<Vec<StatusHistoryEvent>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/applications/{id}/history")))
            .send()
            .await?;
        // The remote answers `null` for an application with no events.
        let events: Option<Vec<StatusHistoryEvent>> = Self::parse_response(response).await?;
        Ok(events.unwrap_or_default())
    }

    async fn create(&self, payload: &ApplicationPayload) -> Result<Application, ApiError> {
        let response = self
            .client
            .post(self.url("/applications"))
            .json(payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update(
        &self,
        id: ApplicationId,
        payload: &ApplicationPayload,
    ) -> Result<Application, ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/applications/{id}")))
            .json(payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        change: &StatusChange,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/applications/{id}/status")))
            .json(change)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn soft_delete(&self, id: ApplicationId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/applications/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn summary(&self, include_deleted: bool) -> Result<Summary, ApiError> {
        let response = self
            .client
            .get(self.url("/analytics/summary"))
            .query(&[("include_deleted", include_deleted)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn timeline(&self, days: u32, include_deleted: bool) -> Result<Timeline, ApiError> {
        let response = self
            .client
            .get(self.url("/analytics/timeline"))
            .query(&[
                ("days", days.to_string()),
                ("include_deleted", include_deleted.to_string()),
            ])
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
