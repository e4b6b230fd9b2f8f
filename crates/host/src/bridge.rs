use crate::backend::Backend;
use crate::capture::CapturePipeline;
use async_trait::async_trait;
use serde_json::Value;
use shellbridge_protocol::{
    BridgeCall, BridgeClient, BridgeError, BridgeReply, Capability, CommandRequest,
    CommandResponse, ReadinessStatus, RegionCaptureRequest, RegionCaptureResult, SourcesResult,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

/// One method per capability. Handlers return structured replies; a panic
/// is the only way a handler can fail the call itself.
#[async_trait]
pub trait HostHandlers: Send + Sync {
    async fn is_go_ready(&self) -> ReadinessStatus;
    async fn send_request(&self, request: CommandRequest) -> CommandResponse;
    async fn get_screenshots(&self) -> SourcesResult;
    async fn take_region_screenshot(&self, request: RegionCaptureRequest) -> RegionCaptureResult;
}

/// Production handlers backed by a backend supervisor and the capture
/// pipeline.
pub struct HostServices {
    backend: Arc<dyn Backend>,
    capture: Arc<CapturePipeline>,
}

impl HostServices {
    pub fn new(backend: Arc<dyn Backend>, capture: Arc<CapturePipeline>) -> Self {
        Self { backend, capture }
    }
}

#[async_trait]
impl HostHandlers for HostServices {
    async fn is_go_ready(&self) -> ReadinessStatus {
        self.backend.readiness().await
    }

    async fn send_request(&self, request: CommandRequest) -> CommandResponse {
        info!("Forwarding {} ({}) to backend", request.command, request.id);
        self.backend.send(request).await
    }

    async fn get_screenshots(&self) -> SourcesResult {
        self.capture.list_sources().await
    }

    async fn take_region_screenshot(&self, request: RegionCaptureRequest) -> RegionCaptureResult {
        self.capture.capture_region(&request).await
    }
}

/// Dispatches view calls into the installed handlers.
///
/// The handler set is fixed at construction. Each call runs on its own task
/// so a panicking handler fails only that call.
pub struct Bridge {
    handlers: Arc<dyn HostHandlers>,
    call_timeout: Option<Duration>,
}

impl Bridge {
    pub fn new(handlers: Arc<dyn HostHandlers>) -> Self {
        Self {
            handlers,
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn call(&self, call: BridgeCall) -> Result<BridgeReply, BridgeError> {
        let capability = call.capability();
        let started = Instant::now();
        let handlers = Arc::clone(&self.handlers);
        let mut handle = tokio::spawn(async move { dispatch(handlers, call).await });

        let joined = match self.call_timeout {
            Some(limit) => {
                match timeout(limit, &mut handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        handle.abort();
                        warn!("{} timed out after {:?}", capability, limit);
                        return Err(BridgeError::Timeout(capability.name().to_string()));
                    }
                }
            }
            None => handle.await,
        };

        match joined {
            Ok(reply) => {
                info!("{} completed in {:?}", capability, started.elapsed());
                Ok(reply)
            }
            Err(join_err) if join_err.is_panic() => {
                error!("Handler for {} panicked", capability);
                Err(BridgeError::HandlerPanicked(capability.name().to_string()))
            }
            Err(_) => {
                error!("Handler for {} was cancelled", capability);
                Err(BridgeError::HandlerCancelled(capability.name().to_string()))
            }
        }
    }

    /// Entry point for a serialized channel. Unknown names are rejected
    /// before any handler runs.
    pub async fn call_named(&self, name: &str, payload: Value) -> Result<Value, BridgeError> {
        let call = BridgeCall::from_wire(name, payload).map_err(|e| {
            warn!("Rejected bridge call {}: {}", name, e);
            e
        })?;
        self.call(call).await?.to_json()
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        &Capability::ALL
    }
}

#[async_trait]
impl BridgeClient for Bridge {
    async fn call(&self, call: BridgeCall) -> Result<BridgeReply, BridgeError> {
        Bridge::call(self, call).await
    }
}

async fn dispatch(handlers: Arc<dyn HostHandlers>, call: BridgeCall) -> BridgeReply {
    match call {
        BridgeCall::IsGoReady => BridgeReply::Readiness(handlers.is_go_ready().await),
        BridgeCall::SendRequest(request) => BridgeReply::Command(handlers.send_request(request).await),
        BridgeCall::GetScreenshots => BridgeReply::Sources(handlers.get_screenshots().await),
        BridgeCall::TakeRegionScreenshot(request) => {
            BridgeReply::RegionCapture(handlers.take_region_screenshot(request).await)
        }
    }
}
