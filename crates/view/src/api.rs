use shellbridge_protocol::{
    BridgeCall, BridgeClient, BridgeError, BridgeReply, Capability, CommandRequest,
    CommandResponse, ReadinessStatus, RegionCaptureRequest, RegionCaptureResult, SourcesResult,
};
use std::sync::Arc;

/// Typed view of the four host capabilities.
#[derive(Clone)]
pub struct HostApi {
    bridge: Arc<dyn BridgeClient>,
}

impl HostApi {
    pub fn new(bridge: Arc<dyn BridgeClient>) -> Self {
        Self { bridge }
    }

    pub async fn is_go_ready(&self) -> Result<ReadinessStatus, BridgeError> {
        match self.bridge.call(BridgeCall::IsGoReady).await? {
            BridgeReply::Readiness(status) => Ok(status),
            other => Err(unexpected(Capability::IsGoReady, &other)),
        }
    }

    pub async fn send_request(&self, request: CommandRequest) -> Result<CommandResponse, BridgeError> {
        match self.bridge.call(BridgeCall::SendRequest(request)).await? {
            BridgeReply::Command(response) => Ok(response),
            other => Err(unexpected(Capability::SendRequest, &other)),
        }
    }

    pub async fn get_screenshots(&self) -> Result<SourcesResult, BridgeError> {
        match self.bridge.call(BridgeCall::GetScreenshots).await? {
            BridgeReply::Sources(result) => Ok(result),
            other => Err(unexpected(Capability::GetScreenshots, &other)),
        }
    }

    pub async fn take_region_screenshot(
        &self,
        request: RegionCaptureRequest,
    ) -> Result<RegionCaptureResult, BridgeError> {
        match self.bridge.call(BridgeCall::TakeRegionScreenshot(request)).await? {
            BridgeReply::RegionCapture(result) => Ok(result),
            other => Err(unexpected(Capability::TakeRegionScreenshot, &other)),
        }
    }
}

fn unexpected(expected: Capability, reply: &BridgeReply) -> BridgeError {
    tracing::error!("{} answered with a {} reply", expected, reply.capability());
    BridgeError::UnexpectedReply(expected.name().to_string())
}
