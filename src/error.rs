use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("no database connection available: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("storage lock was poisoned")]
    Poisoned,
    #[error("storage task failed: {0}")]
    Task(#[from] JoinError),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("missing required input: {0}")]
    Validation(String),
    #[error("admin credential rejected")]
    Auth,
    #[error("reservation {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl BookingError {
    /// Store and notification failures are reported to the caller as one opaque class.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Notification(_))
    }
}
