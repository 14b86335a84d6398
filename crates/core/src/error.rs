use crate::types::ApplicationId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound {
        entity: &'static str,
        id: ApplicationId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    #[error("Missing id: {0}")]
    MissingId(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}
