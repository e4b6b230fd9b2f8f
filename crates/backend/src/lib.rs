//! Backend service answering command envelopes over newline-delimited JSON.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::BackendError;
pub use handlers::{handle_request, process_command};
pub use server::{serve, ServeStats};
