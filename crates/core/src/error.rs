use crate::types::ApplicationId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound {
        entity: &'static str,
        id: ApplicationId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Required form fields were blank after trimming.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}
