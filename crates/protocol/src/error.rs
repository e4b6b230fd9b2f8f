use thiserror::Error;

/// Failure of a bridge call itself, as opposed to a structured failure
/// reply from a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid payload for {capability}: {reason}")]
    InvalidPayload { capability: String, reason: String },

    #[error("Handler for {0} panicked")]
    HandlerPanicked(String),

    #[error("Handler for {0} was cancelled")]
    HandlerCancelled(String),

    #[error("Call to {0} timed out")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected reply to {0}")]
    UnexpectedReply(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}
