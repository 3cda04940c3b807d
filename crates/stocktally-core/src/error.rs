//! Error types for the core library.

use thiserror::Error;

use crate::service::DeliveryError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input (negative quantity, empty name).
    ///
    /// The operation was rejected and nothing was changed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation referenced an item that is not in the store.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// A stored key could not be decoded.
    #[error("Malformed key: {0:?}")]
    MalformedKey(String),

    /// The report could not be delivered.
    #[error("Failed to send: {0}")]
    Delivery(#[from] DeliveryError),

    /// No profile with the given name is configured.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] keyring::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
