//! Shellbridge wire protocol
//!
//! Types shared by the privileged host and the untrusted view. The view side
//! only ever sees this crate, so anything the view can do is spelled out here.

pub mod capability;
pub mod client;
pub mod envelope;
pub mod error;
pub mod types;

pub use capability::{BridgeCall, BridgeReply, Capability};
pub use client::BridgeClient;
pub use envelope::{BackendCommand, CommandRequest, CommandResponse, Params, ResponseStatus};
pub use error::BridgeError;
pub use types::{
    Bounds, CaptureSource, ReadinessStatus, RegionCapture, RegionCaptureRequest,
    RegionCaptureResult, ScreenSize, SourcesResult,
};
