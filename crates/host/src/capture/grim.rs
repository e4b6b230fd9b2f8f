//! Wayland capture through `hyprctl` (enumeration) and `grim` (pixels).

use super::{png, CaptureError, CaptureResult, CapturedFrame, FrameTarget, OutputInfo, ScreenCapturer};
use async_trait::async_trait;
use serde::Deserialize;
use shellbridge_protocol::ScreenSize;
use tokio::process::Command;

/// One entry of `hyprctl monitors -j`. `width`/`height` are the mode in
/// physical pixels, before scale and rotation.
#[derive(Debug, Deserialize)]
struct Monitor {
    name: String,
    #[serde(default)]
    description: String,
    width: u32,
    height: u32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: u8,
}

fn unit_scale() -> f64 {
    1.0
}

impl Monitor {
    /// Size of the output in layout coordinates. `grim -s S` produces
    /// frames of this size times `S`.
    fn logical_size(&self) -> ScreenSize {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        let width = (f64::from(self.width) / scale).round() as u32;
        let height = (f64::from(self.height) / scale).round() as u32;
        // Odd transforms rotate by 90 or 270 degrees.
        if self.transform % 2 == 1 {
            ScreenSize::new(height, width)
        } else {
            ScreenSize::new(width, height)
        }
    }
}

pub struct GrimCapturer {
    grim: String,
    hyprctl: String,
}

impl GrimCapturer {
    pub fn new(grim: impl Into<String>, hyprctl: impl Into<String>) -> Self {
        Self {
            grim: grim.into(),
            hyprctl: hyprctl.into(),
        }
    }
}

impl Default for GrimCapturer {
    fn default() -> Self {
        Self::new("grim", "hyprctl")
    }
}

#[async_trait]
impl ScreenCapturer for GrimCapturer {
    async fn list_outputs(&self) -> CaptureResult<Vec<OutputInfo>> {
        let stdout = run_output(&self.hyprctl, &["monitors", "-j"]).await?;
        parse_monitors(&stdout)
    }

    async fn capture(&self, output: &OutputInfo, target: FrameTarget) -> CaptureResult<CapturedFrame> {
        let scale = format_scale(target.scale_for(output.size));
        tracing::debug!("Capturing {} at scale {}", output.id, scale);
        let png_bytes = run_output(&self.grim, &["-o", &output.id, "-s", &scale, "-"]).await?;
        let size = png::dimensions(&png_bytes)?;
        Ok(CapturedFrame {
            png: png_bytes,
            size,
        })
    }
}

fn parse_monitors(json: &[u8]) -> CaptureResult<Vec<OutputInfo>> {
    let monitors: Vec<Monitor> = serde_json::from_slice(json)
        .map_err(|e| CaptureError::Platform(format!("unexpected hyprctl output: {e}")))?;
    Ok(monitors
        .into_iter()
        .map(|monitor| OutputInfo {
            size: monitor.logical_size(),
            name: if monitor.description.trim().is_empty() {
                monitor.name.clone()
            } else {
                monitor.description
            },
            id: monitor.name,
        })
        .collect())
}

/// Round up to four decimals so the scaled frame never falls a pixel short.
fn format_scale(scale: f64) -> String {
    let rounded = (scale * 10_000.0).ceil() / 10_000.0;
    format!("{rounded}")
}

async fn run_output(command: &str, args: &[&str]) -> CaptureResult<Vec<u8>> {
    let output = Command::new(command).args(args).output().await.map_err(|e| {
        CaptureError::Platform(format!("failed to run {command}: {e}"))
    })?;
    if output.status.success() {
        return Ok(output.stdout);
    }
    Err(CaptureError::Platform(format!(
        "{command} exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}
