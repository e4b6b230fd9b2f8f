//! Host-side settings. Every field has a default so an empty file is valid.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use shellbridge_protocol::ScreenSize;
use std::path::PathBuf;

pub const DEFAULT_DEV_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_BACKEND_PROGRAM: &str = "shellbridge-backend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    /// `SHELLBRIDGE_ENV=development` selects development mode.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "development" || v == "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Process {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
    Embedded,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Process {
            program: PathBuf::from(DEFAULT_BACKEND_PROGRAM),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Minimum size of a region capture frame.
    pub floor: ScreenSize,
    /// Bounding box for source thumbnails.
    pub thumbnail: ScreenSize,
    pub grim_program: String,
    pub hyprctl_program: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            floor: ScreenSize::FULL_HD,
            thumbnail: ScreenSize::new(150, 150),
            grim_program: "grim".to_string(),
            hyprctl_program: "hyprctl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Unset means calls never time out.
    pub call_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub mode: RunMode,
    pub dev_server_url: String,
    pub bundle_path: PathBuf,
    pub backend: BackendConfig,
    pub capture: CaptureConfig,
    pub bridge: BridgeConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            dev_server_url: DEFAULT_DEV_SERVER_URL.to_string(),
            bundle_path: PathBuf::from("index.html"),
            backend: BackendConfig::default(),
            capture: CaptureConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<(), HostError> {
        if let BackendConfig::Process { program, .. } = &self.backend {
            if program.as_os_str().is_empty() {
                return Err(HostError::Config("backend program cannot be empty".into()));
            }
        }
        if !self.capture.floor.covers(&ScreenSize::FULL_HD) {
            return Err(HostError::Config(format!(
                "capture floor {}x{} is below the 1920x1080 minimum",
                self.capture.floor.width, self.capture.floor.height
            )));
        }
        if self.capture.thumbnail.width == 0 || self.capture.thumbnail.height == 0 {
            return Err(HostError::Config("thumbnail size must be non-zero".into()));
        }
        if self.mode == RunMode::Development && self.dev_server_url.trim().is_empty() {
            return Err(HostError::Config(
                "dev_server_url is required in development mode".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_env() {
        assert_eq!(RunMode::from_env_value(Some("development")), RunMode::Development);
        assert_eq!(RunMode::from_env_value(Some(" DEV ")), RunMode::Development);
        assert_eq!(RunMode::from_env_value(Some("production")), RunMode::Production);
        assert_eq!(RunMode::from_env_value(None), RunMode::Production);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capture.floor, ScreenSize::FULL_HD);
        assert!(config.bridge.call_timeout_ms.is_none());
    }

    #[test]
    fn test_empty_backend_program_rejected() {
        let config = HostConfig {
            backend: BackendConfig::Process {
                program: PathBuf::new(),
                args: vec![],
            },
            ..HostConfig::default()
        };
        assert!(matches!(config.validate(), Err(HostError::Config(_))));
    }

    #[test]
    fn test_floor_below_full_hd_rejected() {
        for floor in [ScreenSize::new(0, 0), ScreenSize::new(800, 600), ScreenSize::new(2560, 720)] {
            let mut config = HostConfig::default();
            config.capture.floor = floor;
            assert!(matches!(config.validate(), Err(HostError::Config(_))), "{floor:?}");
        }

        let mut config = HostConfig::default();
        config.capture.floor = ScreenSize::new(2560, 1440);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_config_tagged() {
        let config: BackendConfig = serde_json::from_str(r#"{"kind": "embedded"}"#).unwrap();
        assert_eq!(config, BackendConfig::Embedded);

        let config: BackendConfig =
            serde_json::from_str(r#"{"kind": "process", "program": "/opt/backend"}"#).unwrap();
        assert_eq!(
            config,
            BackendConfig::Process {
                program: PathBuf::from("/opt/backend"),
                args: vec![]
            }
        );
    }
}
