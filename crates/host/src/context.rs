//! Process-wide shell state with explicit init and teardown hooks.

use crate::backend::{Backend, EmbeddedBackend, ProcessBackend};
use crate::bridge::{Bridge, HostServices};
use crate::capture::{CapturePipeline, GrimCapturer, ScreenCapturer};
use crate::config::{BackendConfig, HostConfig, RunMode};
use crate::error::HostError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

/// Where the view loads its content from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    DevServer(String),
    Bundled(PathBuf),
}

/// The single view owned by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHandle {
    pub content: ContentSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Quit,
    /// macOS keeps the app alive with no windows open.
    StayResident,
}

pub struct ShellContext {
    config: HostConfig,
    capturer: Arc<dyn ScreenCapturer>,
    backend: Option<Arc<dyn Backend>>,
    bridge: Option<Arc<Bridge>>,
    view: Option<ViewHandle>,
}

impl ShellContext {
    pub fn new(config: HostConfig) -> Self {
        let capturer = Arc::new(GrimCapturer::new(
            config.capture.grim_program.clone(),
            config.capture.hyprctl_program.clone(),
        ));
        Self::with_capturer(config, capturer)
    }

    pub fn with_capturer(config: HostConfig, capturer: Arc<dyn ScreenCapturer>) -> Self {
        Self {
            config,
            capturer,
            backend: None,
            bridge: None,
            view: None,
        }
    }

    /// Start the backend, install the bridge and open the view. Calling it
    /// again returns the already installed bridge.
    pub fn on_ready(&mut self) -> Result<Arc<Bridge>, HostError> {
        if let Some(bridge) = self.bridge.clone() {
            if self.view.is_none() {
                self.open_view();
            }
            return Ok(bridge);
        }
        self.config.validate()?;

        let backend: Arc<dyn Backend> = match &self.config.backend {
            BackendConfig::Process { program, args } => {
                ProcessBackend::start(program.clone(), args.clone())
            }
            BackendConfig::Embedded => Arc::new(EmbeddedBackend::new()),
        };
        let capture = Arc::new(CapturePipeline::new(
            Arc::clone(&self.capturer),
            &self.config.capture,
        ));
        let services = Arc::new(HostServices::new(Arc::clone(&backend), capture));
        let bridge = Arc::new(
            Bridge::new(services)
                .with_call_timeout(self.config.bridge.call_timeout_ms.map(Duration::from_millis)),
        );

        self.backend = Some(backend);
        self.bridge = Some(Arc::clone(&bridge));
        self.open_view();
        Ok(bridge)
    }

    /// The app was activated, e.g. from the dock after `StayResident`.
    /// Re-opens the view if none is open, starting a new backend when the
    /// previous one was shut down.
    pub fn on_activate(&mut self) -> Result<Arc<Bridge>, HostError> {
        if self.view.is_none() {
            info!("Activated with no open view");
        }
        self.on_ready()
    }

    fn open_view(&mut self) {
        let view = ViewHandle {
            content: self.content_source(),
        };
        info!("Opening view from {:?}", view.content);
        self.view = Some(view);
    }

    pub fn content_source(&self) -> ContentSource {
        match self.config.mode {
            RunMode::Development => ContentSource::DevServer(self.config.dev_server_url.clone()),
            RunMode::Production => ContentSource::Bundled(self.config.bundle_path.clone()),
        }
    }

    pub fn bridge(&self) -> Option<Arc<Bridge>> {
        self.bridge.clone()
    }

    pub fn view(&self) -> Option<&ViewHandle> {
        self.view.as_ref()
    }

    /// Close the view and stop the backend.
    pub async fn on_all_windows_closed(&mut self) -> LifecycleAction {
        self.view = None;
        self.bridge = None;
        if let Some(backend) = self.backend.take() {
            backend.shutdown().await;
        }
        info!("All views closed");

        if cfg!(target_os = "macos") {
            LifecycleAction::StayResident
        } else {
            LifecycleAction::Quit
        }
    }
}
