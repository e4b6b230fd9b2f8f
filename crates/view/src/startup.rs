//! The view's startup flow: wait for the backend, then fetch and show the
//! greeting.

use crate::api::HostApi;
use crate::command::CommandClient;
use crate::error::ViewError;
use crate::poller::{PollOutcome, PollProgress, PollState, PollerConfig, ReadinessPoller};
use async_trait::async_trait;
use shellbridge_protocol::BridgeClient;
use std::sync::Arc;
use tracing::{info, warn};

pub const LOADING_TEXT: &str = "Loading...";
pub const LOAD_ERROR_TEXT: &str = "Error loading message";

/// Wherever the view renders its single line of status text.
#[async_trait]
pub trait MessageDisplay: Send + Sync {
    async fn show(&self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    Loaded(String),
    BackendUnavailable(PollOutcome),
    CommandFailed(String),
}

pub async fn load_hello_message(
    bridge: Arc<dyn BridgeClient>,
    config: PollerConfig,
    display: Arc<dyn MessageDisplay>,
) -> StartupOutcome {
    let api = HostApi::new(bridge);
    display.show(LOADING_TEXT).await;

    let mut poller = ReadinessPoller::new(api.clone(), config);
    let mut events = poller.events();
    let run = poller.run();
    tokio::pin!(run);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(progress) = events.recv() => show_progress(display.as_ref(), &progress).await,
            outcome = &mut run => break outcome,
        }
    };
    while let Ok(progress) = events.try_recv() {
        show_progress(display.as_ref(), &progress).await;
    }

    if let Some(reason) = outcome.failure_message() {
        let text = match outcome {
            PollOutcome::Failed { .. } => format!("Backend failed to start: {}", reason),
            _ => reason,
        };
        warn!("{}", text);
        display.show(&text).await;
        return StartupOutcome::BackendUnavailable(outcome);
    }

    match CommandClient::new(api).hello_message().await {
        Ok(message) => {
            info!("Hello message loaded");
            display.show(&message).await;
            StartupOutcome::Loaded(message)
        }
        Err(ViewError::Command(diagnostic)) => {
            warn!("get-hello-message failed: {}", diagnostic);
            display.show(LOAD_ERROR_TEXT).await;
            StartupOutcome::CommandFailed(diagnostic)
        }
        Err(e) => {
            warn!("get-hello-message failed: {}", e);
            display.show(&format!("{}: {}", LOAD_ERROR_TEXT, e)).await;
            StartupOutcome::CommandFailed(e.to_string())
        }
    }
}

async fn show_progress(display: &dyn MessageDisplay, progress: &PollProgress) {
    if progress.state == PollState::Polling && progress.attempts > 0 {
        display
            .show(&format!(
                "{} ({}/{})",
                LOADING_TEXT, progress.attempts, progress.max_attempts
            ))
            .await;
    }
}
