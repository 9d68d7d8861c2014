use jobtrack_core::error::CoreError;

use crate::api::ApiError;

/// Fallback shown when a failure carries no usable detail message.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Failures surfaced by the state-synchronization layer.
///
/// `Validation` is detected locally and means no request was issued. All
/// other variants come from the remote and are recoverable by a reload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {}", .detail.as_deref().unwrap_or("<no detail>"))]
    Server { status: u16, detail: Option<String> },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => ClientError::Network(msg),
            ApiError::Status { status: 404, detail } => {
                ClientError::NotFound(detail.unwrap_or_else(|| "Resource not found".to_string()))
            }
            ApiError::Status { status, detail } => ClientError::Server { status, detail },
        }
    }
}

impl ClientError {
    /// Message suitable for an inline error banner.
    ///
    /// Uses the remote detail (or the local validation text) when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(core) => core.to_string(),
            ClientError::NotFound(detail) => detail.clone(),
            ClientError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::Network(msg) if !msg.is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}
