use async_trait::async_trait;
use thiserror::Error;

/// Failures on the notification side channel; never surfaced to request callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Notifier not configured: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote endpoint returned status {0}")]
    Remote(u16),
}

/// Delivers a text message to an operator chat
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: String) -> Result<(), NotificationError>;
}
