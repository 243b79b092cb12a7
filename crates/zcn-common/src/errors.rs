#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZcnError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Private key is not set")]
    KeyMissing,
    #[error("Stale hash: stored {stored}, computed {computed}")]
    StaleHash { stored: String, computed: String },
    #[error("Verification error: {0}")]
    Verification(String),
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
    #[error("Confirmation timeout for transaction {0}")]
    ConfirmationTimeout(String),
    #[error("Transaction {0} was rejected by the network")]
    ConfirmationRejected(String),
    #[error("transaction already exists. cannot set {0}.")]
    AlreadyExists(String),
    #[error("invalid transaction. cannot be verified.")]
    InvalidTransaction,
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Protocol violation: {0} ({1})")]
    ProtocolViolation(String, String),
}

impl From<serde_json::Error> for ZcnError {
    fn from(e: serde_json::Error) -> Self {
        ZcnError::SerializationError(e.to_string())
    }
}
