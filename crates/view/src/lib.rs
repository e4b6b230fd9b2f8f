//! Untrusted side of the shell.
//!
//! Everything here goes through a [`BridgeClient`]; the crate has no way to
//! reach host internals.
//!
//! [`BridgeClient`]: shellbridge_protocol::BridgeClient

pub mod api;
pub mod command;
pub mod crop;
pub mod error;
pub mod poller;
pub mod startup;

pub use api::HostApi;
pub use command::{next_request_id, CommandClient};
pub use crop::{plan_crop, CropRect};
pub use error::ViewError;
pub use poller::{PollOutcome, PollProgress, PollState, PollerConfig, ReadinessPoller, RetryPolicy};
pub use startup::{load_hello_message, MessageDisplay, StartupOutcome};
