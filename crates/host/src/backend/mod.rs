//! Backend supervisors answering `isGoReady` and `sendRequest`.

mod embedded;
mod process;

pub use embedded::EmbeddedBackend;
pub use process::ProcessBackend;

use async_trait::async_trait;
use shellbridge_protocol::{CommandRequest, CommandResponse, ReadinessStatus};

pub const NOT_READY_ERROR: &str = "backend is not ready";

#[async_trait]
pub trait Backend: Send + Sync {
    /// Current readiness, cheap to call repeatedly.
    async fn readiness(&self) -> ReadinessStatus;

    /// Forward one request. Failures come back as error responses.
    async fn send(&self, request: CommandRequest) -> CommandResponse;

    async fn shutdown(&self);
}
