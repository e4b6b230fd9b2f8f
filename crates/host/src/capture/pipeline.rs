use super::{png, CaptureError, CaptureResult, FrameTarget, ScreenCapturer, SourceSelector};
use crate::config::CaptureConfig;
use chrono::Utc;
use shellbridge_protocol::{
    Bounds, CaptureSource, RegionCapture, RegionCaptureRequest, RegionCaptureResult, ScreenSize,
    SourcesResult,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CapturePipeline {
    capturer: Arc<dyn ScreenCapturer>,
    floor: ScreenSize,
    thumbnail: ScreenSize,
}

impl CapturePipeline {
    pub fn new(capturer: Arc<dyn ScreenCapturer>, config: &CaptureConfig) -> Self {
        Self {
            capturer,
            floor: config.floor,
            thumbnail: config.thumbnail,
        }
    }

    /// Frame size a region capture must reach: the rectangle's extent, but
    /// never below the configured floor nor below Full HD.
    pub fn required_size(&self, bounds: &Bounds) -> ScreenSize {
        bounds.extent().max(ScreenSize::FULL_HD).max(self.floor)
    }

    /// Enumerate every screen with a thumbnail. Nothing is cached.
    pub async fn list_sources(&self) -> SourcesResult {
        match self.try_list_sources().await {
            Ok(sources) => {
                info!("Enumerated {} capture sources", sources.len());
                SourcesResult::ok(sources)
            }
            Err(e) => {
                warn!("Listing capture sources failed: {}", e);
                SourcesResult::failed(e.to_string())
            }
        }
    }

    /// Capture the selected screen whole. Cropping to `bounds` is left to
    /// the caller.
    pub async fn capture_region(&self, request: &RegionCaptureRequest) -> RegionCaptureResult {
        match self.try_capture_region(request).await {
            Ok(capture) => RegionCaptureResult::ok(capture),
            Err(e) => {
                warn!("Region capture failed: {}", e);
                RegionCaptureResult::failed(e.to_string())
            }
        }
    }

    async fn try_list_sources(&self) -> CaptureResult<Vec<CaptureSource>> {
        let outputs = self.capturer.list_outputs().await?;
        let mut sources = Vec::with_capacity(outputs.len());
        for output in &outputs {
            let frame = self
                .capturer
                .capture(output, FrameTarget::Fit(self.thumbnail))
                .await?;
            sources.push(CaptureSource {
                id: output.id.clone(),
                name: output.name.clone(),
                thumbnail: png::data_url(&frame.png),
            });
        }
        Ok(sources)
    }

    async fn try_capture_region(&self, request: &RegionCaptureRequest) -> CaptureResult<RegionCapture> {
        let required = self.required_size(&request.bounds);
        let outputs = self.capturer.list_outputs().await?;
        let selector = SourceSelector::from_request(request.source_id.as_deref());
        let output = selector.select(&outputs)?;

        let frame = self
            .capturer
            .capture(output, FrameTarget::Cover(required))
            .await?;
        if !frame.size.covers(&required) {
            return Err(CaptureError::FrameTooSmall {
                actual_width: frame.size.width,
                actual_height: frame.size.height,
                required_width: required.width,
                required_height: required.height,
            });
        }

        info!(
            "Captured {} at {}x{} for region {:?}",
            output.id, frame.size.width, frame.size.height, request.bounds
        );
        Ok(RegionCapture {
            image: png::data_url(&frame.png),
            bounds: request.bounds,
            screen_size: frame.size,
            timestamp: Utc::now(),
        })
    }
}
