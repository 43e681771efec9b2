use std::path::Path;

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage, Luma, RgbaImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDA as CUDAExecutionProvider, TensorRT as TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::{
    errors::{BoxSegError, Result},
    maskops::{resample_nearest, FOREGROUND},
    traits::{InferenceRuntime, MaskStrategy},
};

/// Input size assumed when the model declares a dynamic spatial dimension.
pub const DEFAULT_INPUT_SIZE: u32 = 1024;

/// Input names probed, in order, after the session's declared names.
pub const FALLBACK_INPUT_NAMES: [&str; 5] = ["input", "images", "img", "x", "image"];

/// Probability threshold separating foreground from background.
const BINARIZE_THRESHOLD: f32 = 0.5;

/// ONNX Runtime session behind the [`InferenceRuntime`] capability.
///
/// The mutex makes `run` take `&self` and serializes concurrent inference,
/// which the runtime does not promise to support.
pub struct OrtRuntime {
    session: Mutex<Session>,
    input_size: u32,
    first_output: String,
}

impl OrtRuntime {
    pub fn load(model_path: &Path, device_id: i32) -> Result<Self> {
        let session = SessionBuilder::new()
            .map_err(|e| BoxSegError::Model {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| BoxSegError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(ort::Error::<()>::from(e)),
            })?
            .commit_from_file(model_path)
            .map_err(|e| BoxSegError::Model {
                operation: format!("model load: {}", model_path.display()),
                source: Box::new(e),
            })?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| input.dtype().tensor_shape())
            .and_then(|shape| shape.get(2).copied())
            .filter(|&dim| dim > 0)
            .map_or(DEFAULT_INPUT_SIZE, |dim| dim as u32);

        let first_output = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| BoxSegError::Model {
                operation: "model output discovery".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "model declares no outputs",
                )),
            })?;

        debug!(input_size, %first_output, "onnx session ready");
        Ok(Self {
            session: Mutex::new(session),
            input_size,
            first_output,
        })
    }

    pub const fn input_size(&self) -> u32 {
        self.input_size
    }
}

impl InferenceRuntime for OrtRuntime {
    fn declared_input_names(&self) -> Vec<String> {
        let session = self.session.lock();
        session.inputs().iter().map(|input| input.name().to_string()).collect()
    }

    fn run(&self, name: &str, tensor: ArrayView4<'_, f32>) -> Result<(Vec<usize>, Vec<f32>)> {
        let mut session = self.session.lock();
        // ort links against ndarray 0.17 while this crate (via nshare) is on
        // 0.16, so the view is handed over as a (shape, slice) pair instead.
        let tensor = tensor.as_standard_layout();
        let outputs = session
            .run(ort::inputs![name => TensorRef::from_array_view((
                tensor.shape().to_vec(),
                tensor.as_slice().expect("standard layout is contiguous"),
            ))?])
            .map_err(|e| {
                error!(input_name = name, error = %e, "inference run failed");
                BoxSegError::from(e)
            })?;
        let output = outputs[self.first_output.as_str()].try_extract_array::<f32>()?;
        Ok((output.shape().to_vec(), output.iter().copied().collect()))
    }
}

/// Typed lifecycle of the model session: load-once, reuse-many. A failed
/// load is recorded and short-circuits every later call to the fallback;
/// it is never retried implicitly.
pub enum SessionState<R: InferenceRuntime> {
    Unloaded,
    Ready(ModelStrategy<R>),
    Failed,
}

/// The model-backed masking strategy.
///
/// Pipeline: stretch-resize the crop to the square model input, build a
/// normalized `[1, 3, S, S]` CHW tensor (alpha dropped), probe input names
/// until a run succeeds, binarize the first output at 0.5, and resample the
/// result to the crop's true size.
pub struct ModelStrategy<R: InferenceRuntime> {
    runtime: R,
    input_size: u32,
}

impl<R: InferenceRuntime> ModelStrategy<R> {
    pub const fn new(runtime: R, input_size: u32) -> Self {
        Self { runtime, input_size }
    }

    fn preprocess(&self, crop: &RgbaImage) -> Array4<f32> {
        let size = self.input_size;
        // direct scaling: stretching is accepted per common model conventions
        let resized = imageops::resize(crop, size, size, FilterType::Lanczos3);
        let rgb = DynamicImage::ImageRgba8(resized).into_rgb8();
        rgb.as_ndarray3()
            .map(|&v| f32::from(v) / 255.0)
            .insert_axis(Axis(0))
    }

    fn run_with_name_candidates(
        &self,
        tensor: ArrayView4<'_, f32>,
    ) -> Result<(Vec<usize>, Vec<f32>)> {
        let declared = self.runtime.declared_input_names();
        let candidates = declared.iter().map(String::as_str).chain(
            FALLBACK_INPUT_NAMES
                .iter()
                .copied()
                .filter(|name| !declared.iter().any(|d| d == name)),
        );

        let mut last_error = None;
        for name in candidates {
            match self.runtime.run(name, tensor) {
                Ok(output) => {
                    debug!(input_name = name, "input name accepted");
                    return Ok(output);
                }
                Err(err) => {
                    debug!(input_name = name, error = %err, "input name rejected");
                    last_error = Some(err);
                }
            }
        }

        warn!("no input name accepted by the model");
        Err(last_error.unwrap_or_else(|| BoxSegError::Model {
            operation: "input name probing".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no input name candidates available",
            )),
        }))
    }
}

impl<R: InferenceRuntime> MaskStrategy for ModelStrategy<R> {
    fn mask_crop(&self, crop: &RgbaImage) -> Result<GrayImage> {
        let tensor = self.preprocess(crop);
        let (shape, data) = self.run_with_name_candidates(tensor.view())?;
        let mask = binarize_grid(&shape, &data)?;
        Ok(resample_nearest(&mask, crop.width(), crop.height()))
    }
}

/// Binarize a model output into a mask at the output's own resolution.
///
/// The shape is treated as `[..., height, width]` regardless of leading
/// batch/channel dimensions; the first `height * width` plane is used.
pub fn binarize_grid(shape: &[usize], data: &[f32]) -> Result<GrayImage> {
    let shape_mismatch = |reason: &str| BoxSegError::Model {
        operation: "output shape interpretation".to_string(),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{reason}: shape {shape:?}, {} values", data.len()),
        )),
    };

    if shape.len() < 2 {
        return Err(shape_mismatch("output is not a 2-D grid"));
    }
    let (grid_h, grid_w) = (shape[shape.len() - 2], shape[shape.len() - 1]);
    if grid_h == 0 || grid_w == 0 || data.len() < grid_h * grid_w {
        return Err(shape_mismatch("output smaller than its declared grid"));
    }
    if grid_w > u32::MAX as usize || grid_h > u32::MAX as usize {
        return Err(shape_mismatch("grid dimensions out of range"));
    }

    let mut mask = GrayImage::new(grid_w as u32, grid_h as u32);
    for (value, px) in data[..grid_h * grid_w].iter().zip(mask.pixels_mut()) {
        *px = Luma([if *value > BINARIZE_THRESHOLD { FOREGROUND } else { 0 }]);
    }
    Ok(mask)
}
