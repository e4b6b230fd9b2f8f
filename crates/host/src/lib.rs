//! Privileged side of the shell.
//!
//! Owns the backend process, the capture pipeline and the bridge the view
//! talks through. Nothing in here is reachable from the view except via the
//! four capabilities the bridge dispatches.

pub mod backend;
pub mod bridge;
pub mod capture;
pub mod config;
pub mod context;
pub mod error;

pub use backend::{Backend, EmbeddedBackend, ProcessBackend};
pub use bridge::{Bridge, HostHandlers, HostServices};
pub use capture::{CaptureError, CapturePipeline, GrimCapturer, ScreenCapturer, SourceSelector};
pub use config::{BackendConfig, BridgeConfig, CaptureConfig, HostConfig, RunMode};
pub use context::{ContentSource, LifecycleAction, ShellContext, ViewHandle};
pub use error::HostError;
