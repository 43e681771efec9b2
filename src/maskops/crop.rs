use image::RgbaImage;

/// A rectangular region in source-raster pixel coordinates.
///
/// The constructor clamps rather than rejects: `x, y` to `>= 0` and `w, h`
/// to `>= 1`, so every box names a non-empty region and downstream code
/// never has to handle an invalid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        let max = i64::from(u32::MAX);
        Self {
            x: x.clamp(0, max) as u32,
            y: y.clamp(0, max) as u32,
            w: w.clamp(1, max) as u32,
            h: h.clamp(1, max) as u32,
        }
    }
}

/// Extract the boxed region of `source` into a new buffer of the clamped box
/// size. Pixels requested outside the source bounds are simply not copied and
/// stay transparent black; the function is total and never errors.
pub fn crop_region(source: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
    let mut crop = RgbaImage::new(bbox.w, bbox.h);
    for yy in 0..bbox.h {
        let sy = u64::from(bbox.y) + u64::from(yy);
        if sy >= u64::from(source.height()) {
            break;
        }
        for xx in 0..bbox.w {
            let sx = u64::from(bbox.x) + u64::from(xx);
            if sx >= u64::from(source.width()) {
                break;
            }
            crop.put_pixel(xx, yy, *source.get_pixel(sx as u32, sy as u32));
        }
    }
    crop
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn bounding_box_clamps_negative_origin_and_zero_size() {
        let bbox = BoundingBox::new(-5, -3, 0, -1);
        assert_eq!(bbox, BoundingBox { x: 0, y: 0, w: 1, h: 1 });
    }

    #[test]
    fn crop_inside_bounds_copies_pixels() {
        let source = solid(8, 8, [10, 20, 30, 255]);
        let crop = crop_region(&source, BoundingBox::new(2, 2, 4, 3));
        assert_eq!(crop.dimensions(), (4, 3));
        assert!(crop.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn crop_partially_outside_keeps_requested_size() {
        let source = solid(4, 4, [1, 2, 3, 255]);
        let crop = crop_region(&source, BoundingBox::new(2, 2, 4, 4));
        assert_eq!(crop.dimensions(), (4, 4));
        // in-bounds quadrant copied, the rest untouched
        assert_eq!(crop.get_pixel(1, 1).0, [1, 2, 3, 255]);
        assert_eq!(crop.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn crop_fully_outside_is_all_transparent() {
        let source = solid(4, 4, [9, 9, 9, 255]);
        let crop = crop_region(&source, BoundingBox::new(100, 100, 2, 2));
        assert_eq!(crop.dimensions(), (2, 2));
        assert!(crop.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
