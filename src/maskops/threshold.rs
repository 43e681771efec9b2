use crate::errors::Result;
use crate::maskops::FOREGROUND;
use crate::traits::MaskStrategy;
use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Deterministic per-pixel classifier, the guaranteed-available fallback.
///
/// A pixel is foreground iff `B > 100 && B > R + 30 && B > G + 20`. The rule
/// is tuned for blue-toned subjects and is the documented default policy;
/// swap in a different [`MaskStrategy`] to replace it. It depends on no
/// external state and cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdClassifier;

impl ThresholdClassifier {
    pub fn mask(&self, crop: &RgbaImage) -> GrayImage {
        let mut mask = GrayImage::new(crop.width(), crop.height());
        for (src, dst) in crop.pixels().zip(mask.pixels_mut()) {
            let Rgba([r, g, b, _]) = *src;
            // u16 arithmetic so R + 30 cannot wrap
            let blue_dominant = b > 100
                && u16::from(b) > u16::from(r) + 30
                && u16::from(b) > u16::from(g) + 20;
            *dst = Luma([if blue_dominant { FOREGROUND } else { 0 }]);
        }
        mask
    }
}

impl MaskStrategy for ThresholdClassifier {
    fn mask_crop(&self, crop: &RgbaImage) -> Result<GrayImage> {
        Ok(self.mask(crop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(px: [u8; 4]) -> u8 {
        let crop = RgbaImage::from_pixel(1, 1, Rgba(px));
        ThresholdClassifier.mask(&crop).get_pixel(0, 0)[0]
    }

    #[test]
    fn blue_dominant_pixel_is_foreground() {
        assert_eq!(classify([10, 20, 200, 255]), FOREGROUND);
    }

    #[test]
    fn dark_blue_below_floor_is_background() {
        assert_eq!(classify([10, 20, 100, 255]), 0);
    }

    #[test]
    fn red_margin_is_respected_without_overflow() {
        // r = 240 would wrap in u8 arithmetic; 255 > 270 must be false
        assert_eq!(classify([240, 0, 255, 255]), 0);
    }

    #[test]
    fn green_margin_is_respected() {
        assert_eq!(classify([0, 200, 210, 255]), 0);
        assert_eq!(classify([0, 100, 210, 255]), FOREGROUND);
    }

    #[test]
    fn classifier_is_pure() {
        let crop = RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
        });
        assert_eq!(ThresholdClassifier.mask(&crop), ThresholdClassifier.mask(&crop));
    }
}
