use image::GrayImage;

/// Nearest-neighbor remap of a mask to `(tw, th)`.
///
/// Target pixel `(xx, yy)` samples source pixel
/// `(xx * w / tw, yy * h / th)` with integer floor division. No
/// interpolation, so a binary mask stays binary without a re-threshold
/// step. Handles both up- and down-scaling.
pub fn resample_nearest(mask: &GrayImage, tw: u32, th: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    if (w, h) == (tw, th) {
        return mask.clone();
    }
    GrayImage::from_fn(tw, th, |xx, yy| {
        let sx = (u64::from(xx) * u64::from(w) / u64::from(tw)) as u32;
        let sy = (u64::from(yy) * u64::from(h) / u64::from(th)) as u32;
        *mask.get_pixel(sx, sy)
    })
}
