use crate::error::ViewError;
use serde::{Deserialize, Serialize};
use shellbridge_protocol::RegionCapture;

/// Pixel rectangle to cut out of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The host hands back the whole frame; the requested bounds are clipped to
/// it here. Parts of the region past the frame edge are dropped.
pub fn plan_crop(capture: &RegionCapture) -> Result<CropRect, ViewError> {
    let bounds = capture.bounds;
    let frame = capture.screen_size;

    if bounds.width == 0 || bounds.height == 0 {
        return Err(ViewError::Crop("region is empty".to_string()));
    }
    if bounds.x >= frame.width || bounds.y >= frame.height {
        return Err(ViewError::Crop(
            "region lies outside the captured frame".to_string(),
        ));
    }

    Ok(CropRect {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width.min(frame.width - bounds.x),
        height: bounds.height.min(frame.height - bounds.y),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shellbridge_protocol::{Bounds, ScreenSize};

    fn capture(bounds: Bounds, frame: ScreenSize) -> RegionCapture {
        RegionCapture {
            image: "data:image/png;base64,".into(),
            bounds,
            screen_size: frame,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_region_inside_frame_unchanged() {
        let rect = plan_crop(&capture(Bounds::new(10, 20, 100, 100), ScreenSize::FULL_HD)).unwrap();
        assert_eq!(
            rect,
            CropRect {
                x: 10,
                y: 20,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn test_region_clipped_at_frame_edge() {
        let rect =
            plan_crop(&capture(Bounds::new(1800, 1000, 400, 400), ScreenSize::FULL_HD)).unwrap();
        assert_eq!(rect.width, 120);
        assert_eq!(rect.height, 80);
    }

    #[test]
    fn test_region_outside_frame_rejected() {
        let err = plan_crop(&capture(Bounds::new(1920, 0, 10, 10), ScreenSize::FULL_HD)).unwrap_err();
        assert!(matches!(err, ViewError::Crop(msg) if msg.contains("outside")));
    }

    #[test]
    fn test_empty_region_rejected() {
        assert!(plan_crop(&capture(Bounds::new(0, 0, 0, 50), ScreenSize::FULL_HD)).is_err());
    }
}
