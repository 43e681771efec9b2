pub mod config;
pub mod errors;
pub mod maskops;
pub mod model;
pub mod trace;
pub mod traits;

pub mod mocks;

use std::path::Path;

use image::{GrayImage, RgbaImage};
use tracing::{error, info, warn};

pub use config::Config;
pub use errors::{BoxSegError, Result};
pub use maskops::{crop_region, BoundingBox, OverlayStyle, ThresholdClassifier};
pub use model::{ModelStrategy, OrtRuntime, SessionState, DEFAULT_INPUT_SIZE};
pub use trace::{trace_boundary, TraceOptions, DEFAULT_MIN_RING_LEN};
pub use traits::{InferenceRuntime, MaskStrategy};

/// Result of one segmentation call: a binary mask covering the clamped box.
pub struct Segmentation {
    pub mask: GrayImage,
    /// The clamped box the mask corresponds to; its origin doubles as the
    /// offset for re-embedding a traced polygon into full-image coordinates.
    pub bbox: BoundingBox,
}

impl Segmentation {
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }
}

/// Segmentation façade: routes to the model strategy when a session is ready
/// and falls back to the threshold classifier on any inference failure.
///
/// `segment` is deliberately infallible — a segmentation tool must always
/// produce some result, and the worst case is the deterministic fallback
/// mask. Model errors are logged, never surfaced.
pub struct Segmenter<R: InferenceRuntime = OrtRuntime> {
    session: SessionState<R>,
    fallback: ThresholdClassifier,
}

impl<R: InferenceRuntime> Segmenter<R> {
    /// Wrap an already-constructed runtime, e.g. a mock in tests.
    pub fn with_runtime(runtime: R, input_size: u32) -> Self {
        Self {
            session: SessionState::Ready(ModelStrategy::new(runtime, input_size)),
            fallback: ThresholdClassifier,
        }
    }

    pub fn session_ready(&self) -> bool {
        matches!(self.session, SessionState::Ready(_))
    }

    pub fn segment(&self, source: &RgbaImage, bbox: BoundingBox) -> Segmentation {
        let crop = crop_region(source, bbox);
        let mask = match &self.session {
            SessionState::Ready(strategy) => match strategy.mask_crop(&crop) {
                Ok(mask) => mask,
                Err(err) => {
                    warn!(error = %err, "model inference failed, using threshold fallback");
                    self.fallback.mask(&crop)
                }
            },
            SessionState::Unloaded | SessionState::Failed => self.fallback.mask(&crop),
        };
        debug_assert_eq!(mask.dimensions(), crop.dimensions());
        Segmentation { mask, bbox }
    }
}

impl Segmenter<OrtRuntime> {
    /// A façade with no model configured; every call uses the threshold
    /// classifier.
    pub const fn fallback_only() -> Self {
        Self {
            session: SessionState::Unloaded,
            fallback: ThresholdClassifier,
        }
    }

    /// Load an ONNX model session. A load failure is recorded as
    /// `SessionState::Failed` — not returned — so every later `segment`
    /// call short-circuits to the fallback without retrying the load.
    pub fn with_onnx_model(model_path: &Path, device_id: i32) -> Self {
        let session = match OrtRuntime::load(model_path, device_id) {
            Ok(runtime) => {
                let input_size = runtime.input_size();
                info!(model = %model_path.display(), input_size, "model session loaded");
                SessionState::Ready(ModelStrategy::new(runtime, input_size))
            }
            Err(err) => {
                error!(model = %model_path.display(), error = %err, "model load failed, threshold fallback only");
                SessionState::Failed
            }
        };
        Self {
            session,
            fallback: ThresholdClassifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use mocks::FailingRuntime;

    #[test]
    fn segment_returns_clamped_crop_dimensions() {
        let source = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 200, 255]));
        let segmenter = Segmenter::fallback_only();

        // partially out of bounds, negative origin, zero height
        let result = segmenter.segment(&source, BoundingBox::new(-4, 3, 6, 0));
        assert_eq!((result.width(), result.height()), (6, 1));
        assert_eq!(result.bbox, BoundingBox { x: 0, y: 3, w: 6, h: 1 });
    }

    #[test]
    fn failed_strategy_matches_threshold_output() {
        let source = RgbaImage::from_fn(8, 8, |x, _| {
            Rgba([if x < 4 { 0 } else { 220 }, 30, 200, 255])
        });
        let bbox = BoundingBox::new(1, 1, 6, 6);

        let segmenter = Segmenter::with_runtime(FailingRuntime, 16);
        let result = segmenter.segment(&source, bbox);

        let expected = ThresholdClassifier.mask(&crop_region(&source, bbox));
        assert_eq!(result.mask, expected);
    }

    #[test]
    fn masks_are_strictly_binary() {
        let source = RgbaImage::from_fn(6, 6, |x, y| {
            Rgba([(x * 40) as u8, (y * 40) as u8, 180, 255])
        });
        let segmenter = Segmenter::fallback_only();
        let result = segmenter.segment(&source, BoundingBox::new(0, 0, 6, 6));
        assert!(result.mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
