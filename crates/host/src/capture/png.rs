//! PNG frames as they cross the bridge: header dimensions and data URLs.

use super::{CaptureError, CaptureResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::io::Reader as ImageReader;
use image::ImageFormat;
use shellbridge_protocol::ScreenSize;
use std::io::Cursor;

/// Frame size as declared by the PNG header. Pixel data is not decoded.
pub fn dimensions(bytes: &[u8]) -> CaptureResult<ScreenSize> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| CaptureError::InvalidImage(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidImage(format!(
            "zero-sized image {width}x{height}"
        )));
    }
    Ok(ScreenSize::new(width, height))
}

pub fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Encode a black grayscale frame of the given size.
#[cfg(test)]
pub(crate) fn blank(width: u32, height: u32) -> Vec<u8> {
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::{ColorType, ImageEncoder};

    let pixels = vec![0u8; width as usize * height as usize];
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, FilterType::NoFilter)
        .write_image(&pixels, width, height, ColorType::L8)
        .map(|_| bytes)
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_header_dimensions() {
        assert_eq!(dimensions(&blank(1920, 1080)).unwrap(), ScreenSize::FULL_HD);
        assert_eq!(dimensions(&blank(1, 1)).unwrap(), ScreenSize::new(1, 1));
    }

    #[test]
    fn test_rejects_non_png() {
        assert!(matches!(
            dimensions(b"GIF89a............................"),
            Err(CaptureError::InvalidImage(_))
        ));
        assert!(matches!(dimensions(&[]), Err(CaptureError::InvalidImage(_))));
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let png = blank(64, 64);
        assert!(dimensions(&png[..20]).is_err());
    }

    #[test]
    fn test_data_url_prefix() {
        let url = data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }
}
