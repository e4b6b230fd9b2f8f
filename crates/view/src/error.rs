use shellbridge_protocol::BridgeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Cannot crop: {0}")]
    Crop(String),
}
