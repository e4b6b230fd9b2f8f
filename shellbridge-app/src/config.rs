//! Shell configuration: a YAML file plus environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shellbridge_host::{BackendConfig, HostConfig, RunMode};
use shellbridge_view::PollerConfig;
use std::path::{Path, PathBuf};

pub const ENV_MODE: &str = "SHELLBRIDGE_ENV";
pub const ENV_BACKEND: &str = "SHELLBRIDGE_BACKEND";
pub const ENV_DEV_URL: &str = "SHELLBRIDGE_DEV_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub host: HostConfig,
    pub poller: PollerConfig,
}

impl ShellConfig {
    /// Read the file if one is given, apply process environment overrides
    /// and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.host.mode = RunMode::from_env_value(Some(&mode));
        }
        if let Some(url) = lookup(ENV_DEV_URL) {
            self.host.dev_server_url = url;
        }
        if let Some(program) = lookup(ENV_BACKEND) {
            let args = match &self.host.backend {
                BackendConfig::Process { args, .. } => args.clone(),
                BackendConfig::Embedded => Vec::new(),
            };
            self.host.backend = BackendConfig::Process {
                program: PathBuf::from(program),
                args,
            };
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.host.validate().context("Invalid host configuration")?;
        self.poller
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid poller configuration")?;
        Ok(())
    }
}
