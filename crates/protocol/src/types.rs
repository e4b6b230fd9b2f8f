//! Readiness and capture payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer to a single readiness poll.
///
/// `ready = true` is terminal. A populated `error` is a soft failure the
/// poller keeps retrying; neither set means the backend is still starting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadinessStatus {
    pub fn ready() -> Self {
        Self {
            ready: true,
            error: None,
        }
    }

    pub fn starting() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ready: false,
            error: Some(error.into()),
        }
    }
}

/// Screen rectangle in physical pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest frame size that contains the whole rectangle.
    pub fn extent(&self) -> ScreenSize {
        ScreenSize {
            width: self.x.saturating_add(self.width),
            height: self.y.saturating_add(self.height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const FULL_HD: ScreenSize = ScreenSize {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    pub fn max(self, other: ScreenSize) -> ScreenSize {
        ScreenSize {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    pub fn covers(&self, other: &ScreenSize) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

/// One enumerable screen. `thumbnail` is a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

/// Reply of `getScreenshots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<CaptureSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourcesResult {
    pub fn ok(screenshots: Vec<CaptureSource>) -> Self {
        Self {
            success: true,
            screenshots,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            screenshots: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Argument of `takeRegionScreenshot`. Without `source_id` the first
/// enumerated screen is captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCaptureRequest {
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl RegionCaptureRequest {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            source_id: None,
        }
    }

    pub fn from_source(bounds: Bounds, source_id: impl Into<String>) -> Self {
        Self {
            bounds,
            source_id: Some(source_id.into()),
        }
    }
}

/// Uncropped full frame plus the rectangle the view asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCapture {
    pub image: String,
    pub bounds: Bounds,
    pub screen_size: ScreenSize,
    pub timestamp: DateTime<Utc>,
}

/// Reply of `takeRegionScreenshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCaptureResult {
    pub success: bool,
    #[serde(flatten)]
    pub capture: Option<RegionCapture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegionCaptureResult {
    pub fn ok(capture: RegionCapture) -> Self {
        Self {
            success: true,
            capture: Some(capture),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            capture: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<RegionCapture, String> {
        match (self.success, self.capture) {
            (true, Some(capture)) => Ok(capture),
            _ => Err(self
                .error
                .unwrap_or_else(|| "capture failed without a diagnostic".to_string())),
        }
    }
}
