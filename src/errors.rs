use thiserror::Error;

/// Structured error types for the segmentation pipeline.
///
/// # Why structured errors
///
/// Each variant captures context specific to its error domain (model inference,
/// image processing, input validation), providing diagnostic information without
/// requiring callers to parse error strings. The thiserror crate generates Display
/// implementations automatically from format strings.
///
/// Note that `Model` errors never escape [`crate::Segmenter::segment`]: the façade
/// catches them and routes to the threshold fallback, so they exist mainly as an
/// internal signal and for logging.
#[derive(Error, Debug)]
pub enum BoxSegError {
    #[error("model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("image processing error: {operation} failed")]
    ImageProcessing {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BoxSegError>;

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for BoxSegError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors.
///
/// Shape errors occur during tensor operations which are part of model inference,
/// so they are categorized as model errors rather than a separate tensor error type.
impl From<ndarray::ShapeError> for BoxSegError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for BoxSegError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

impl From<std::io::Error> for BoxSegError {
    fn from(err: std::io::Error) -> Self {
        Self::ImageProcessing {
            operation: "file i/o".to_string(),
            source: Box::new(err),
        }
    }
}
