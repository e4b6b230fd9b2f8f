use crate::capability::{BridgeCall, BridgeReply};
use crate::error::BridgeError;
use async_trait::async_trait;

/// The view's only handle on the host.
///
/// Each call resolves exactly once. Calls may be issued concurrently and
/// carry no ordering guarantee relative to each other.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    async fn call(&self, call: BridgeCall) -> Result<BridgeReply, BridgeError>;
}
