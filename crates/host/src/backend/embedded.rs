use super::Backend;
use async_trait::async_trait;
use shellbridge_backend::handle_request;
use shellbridge_protocol::{CommandRequest, CommandResponse, ReadinessStatus};

/// Runs the backend handlers in-process. Always ready.
#[derive(Debug, Default)]
pub struct EmbeddedBackend;

impl EmbeddedBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Backend for EmbeddedBackend {
    async fn readiness(&self) -> ReadinessStatus {
        ReadinessStatus::ready()
    }

    async fn send(&self, request: CommandRequest) -> CommandResponse {
        handle_request(&request)
    }

    async fn shutdown(&self) {}
}
