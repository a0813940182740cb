use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tracking event not found: {0}")]
    TrackingEventNotFound(String),

    #[error("Invalid tracking event ID: {0}")]
    InvalidTrackingEventId(String),

    #[error("Failed to read photo: {0}")]
    PhotoReadError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
