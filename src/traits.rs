use crate::errors::Result;
use image::{GrayImage, RgbaImage};
use ndarray::ArrayView4;

/// A mask-producing strategy over an RGBA crop.
///
/// Implementations must return a mask of exactly the crop's dimensions whose
/// samples are either 0 (background) or 255 (foreground). The model-backed
/// strategy may fail; the threshold classifier never does in practice, which
/// is what lets [`crate::Segmenter`] guarantee a result.
pub trait MaskStrategy: Send + Sync {
    fn mask_crop(&self, crop: &RgbaImage) -> Result<GrayImage>;
}

/// Capability boundary to the inference runtime.
///
/// The runtime may expose its declared input names; when it does not (or when
/// the declared names are rejected), callers probe a fixed fallback list. A
/// successful `run` returns the first output as a flat buffer plus its shape,
/// interpreted downstream as `[..., height, width]`.
pub trait InferenceRuntime: Send + Sync {
    /// Input names declared by the loaded model, in declaration order.
    /// May be empty.
    fn declared_input_names(&self) -> Vec<String>;

    /// Feed `tensor` under the given input name and return the first output
    /// as `(shape, data)`. Errors are recoverable: the caller tries the next
    /// candidate name or falls back entirely.
    fn run(&self, name: &str, tensor: ArrayView4<'_, f32>) -> Result<(Vec<usize>, Vec<f32>)>;
}
