use std::{fs, io::Cursor, path::Path};

use image::{DynamicImage, GrayImage, ImageFormat, Rgba, RgbaImage};

use crate::errors::{BoxSegError, Result};

/// Default filename for an exported mask when the caller supplies none.
pub const DEFAULT_MASK_FILENAME: &str = "mask.png";

/// Fixed tint applied to foreground pixels when rendering a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub color: [u8; 3],
    pub alpha: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            alpha: 128,
        }
    }
}

/// Render a mask as an RGBA overlay: foreground pixels get the style color at
/// the style alpha, background pixels are fully transparent.
pub fn tint(mask: &GrayImage, style: OverlayStyle) -> RgbaImage {
    let [r, g, b] = style.color;
    let mut overlay = RgbaImage::new(mask.width(), mask.height());
    for (src, dst) in mask.pixels().zip(overlay.pixels_mut()) {
        *dst = if src[0] == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([r, g, b, style.alpha])
        };
    }
    overlay
}

/// Serialize a mask to a PNG-encoded tinted overlay.
///
/// PNG is lossless, so decoding the alpha channel reproduces the binary mask
/// exactly (alpha 0 for background, the style alpha for foreground).
pub fn encode_png(mask: &GrayImage, style: OverlayStyle) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(tint(mask, style))
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| BoxSegError::ImageProcessing {
            operation: "PNG encode".to_string(),
            source: Box::new(e),
        })?;
    Ok(buffer.into_inner())
}

pub fn save_png<P: AsRef<Path>>(mask: &GrayImage, style: OverlayStyle, path: P) -> Result<()> {
    let bytes = encode_png(mask, style)?;
    fs::write(path.as_ref(), bytes).map_err(|e| BoxSegError::ImageProcessing {
        operation: format!("write {}", path.as_ref().display()),
        source: Box::new(e),
    })
}
