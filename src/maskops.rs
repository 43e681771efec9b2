pub mod crop;
pub mod overlay;
pub mod resample;
pub mod threshold;

pub use crop::{crop_region, BoundingBox};
pub use overlay::{encode_png, save_png, tint, OverlayStyle, DEFAULT_MASK_FILENAME};
pub use resample::resample_nearest;
pub use threshold::ThresholdClassifier;

/// Foreground sample value used throughout; masks are strictly binary.
pub const FOREGROUND: u8 = 255;
