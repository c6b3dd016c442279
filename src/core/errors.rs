use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the store, services, storage and configuration layers.
///
/// Not-found variants are ordinary outcomes: callers report them and carry on.
#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),
    #[error("Client `{client}` is already subscribed to `{service}`")]
    DuplicateSubscription { client: String, service: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Store lock poisoned by a panicked writer")]
    LockPoisoned,
}

impl CrmError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CrmError::ClientNotFound(_)
                | CrmError::ServiceNotFound(_)
                | CrmError::SubscriptionNotFound(_)
        )
    }
}

pub type Result<T> = StdResult<T, CrmError>;

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        CrmError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::StorageError(err.to_string())
    }
}
