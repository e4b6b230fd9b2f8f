//! Screen capture pipeline.
//!
//! Platform access sits behind [`ScreenCapturer`]; [`CapturePipeline`] owns
//! sizing, source selection and conversion of every failure into a
//! structured reply.

mod grim;
mod pipeline;
pub mod png;

pub use grim::GrimCapturer;
pub use pipeline::CapturePipeline;

use async_trait::async_trait;
use shellbridge_protocol::ScreenSize;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no screens found")]
    NoSources,

    #[error("capture source not found: {0}")]
    SourceNotFound(String),

    #[error("capture backend failed: {0}")]
    Platform(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("captured frame {actual_width}x{actual_height} is smaller than required {required_width}x{required_height}")]
    FrameTooSmall {
        actual_width: u32,
        actual_height: u32,
        required_width: u32,
        required_height: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// A screen as reported by the platform. `size` is the frame size a
/// capture at scale 1 produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub id: String,
    pub name: String,
    pub size: ScreenSize,
}

/// Encoded frame plus the dimensions read back from the image itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub png: Vec<u8>,
    pub size: ScreenSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    /// Scale up until the frame covers this size. Never scales down.
    Cover(ScreenSize),
    /// Scale down until the frame fits in this box. Never scales up.
    Fit(ScreenSize),
}

impl FrameTarget {
    /// Scale factor to apply to a frame of `native` size.
    pub fn scale_for(&self, native: ScreenSize) -> f64 {
        if native.width == 0 || native.height == 0 {
            return 1.0;
        }
        let ratio = |target: u32, native: u32| f64::from(target) / f64::from(native);
        match self {
            FrameTarget::Cover(size) => ratio(size.width, native.width)
                .max(ratio(size.height, native.height))
                .max(1.0),
            FrameTarget::Fit(size) => ratio(size.width, native.width)
                .min(ratio(size.height, native.height))
                .min(1.0),
        }
    }
}

/// Which enumerated source a region capture reads from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelector {
    #[default]
    First,
    Id(String),
}

impl SourceSelector {
    pub fn from_request(source_id: Option<&str>) -> Self {
        match source_id {
            Some(id) => SourceSelector::Id(id.to_string()),
            None => SourceSelector::First,
        }
    }

    pub fn select<'a>(&self, outputs: &'a [OutputInfo]) -> CaptureResult<&'a OutputInfo> {
        match self {
            SourceSelector::First => outputs.first().ok_or(CaptureError::NoSources),
            SourceSelector::Id(id) => {
                if outputs.is_empty() {
                    return Err(CaptureError::NoSources);
                }
                outputs
                    .iter()
                    .find(|output| &output.id == id)
                    .ok_or_else(|| CaptureError::SourceNotFound(id.clone()))
            }
        }
    }
}

#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    /// Enumerate screens at call time.
    async fn list_outputs(&self) -> CaptureResult<Vec<OutputInfo>>;

    /// Capture a whole screen scaled per `target`.
    async fn capture(&self, output: &OutputInfo, target: FrameTarget) -> CaptureResult<CapturedFrame>;
}
