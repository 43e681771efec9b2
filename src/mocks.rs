use ndarray::ArrayView4;

use crate::errors::{BoxSegError, Result};
use crate::traits::InferenceRuntime;

/// Scripted inference runtime for tests: accepts exactly one input name and
/// plays back a fixed `(shape, data)` output.
#[derive(Debug, Clone)]
pub struct MockRuntime {
    pub declared_names: Vec<String>,
    pub accepted_name: String,
    pub output_shape: Vec<usize>,
    pub output_data: Vec<f32>,
}

impl MockRuntime {
    pub fn new(
        declared_names: &[&str],
        accepted_name: &str,
        output_shape: Vec<usize>,
        output_data: Vec<f32>,
    ) -> Self {
        Self {
            declared_names: declared_names.iter().map(ToString::to_string).collect(),
            accepted_name: accepted_name.to_string(),
            output_shape,
            output_data,
        }
    }
}

impl InferenceRuntime for MockRuntime {
    fn declared_input_names(&self) -> Vec<String> {
        self.declared_names.clone()
    }

    fn run(&self, name: &str, _tensor: ArrayView4<'_, f32>) -> Result<(Vec<usize>, Vec<f32>)> {
        if name == self.accepted_name {
            Ok((self.output_shape.clone(), self.output_data.clone()))
        } else {
            Err(BoxSegError::Model {
                operation: format!("run with input name {name}"),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "input name not accepted",
                )),
            })
        }
    }
}

/// Runtime engineered to reject every input name attempt.
#[derive(Debug, Clone, Copy)]
pub struct FailingRuntime;

impl InferenceRuntime for FailingRuntime {
    fn declared_input_names(&self) -> Vec<String> {
        vec!["broken".to_string()]
    }

    fn run(&self, name: &str, _tensor: ArrayView4<'_, f32>) -> Result<(Vec<usize>, Vec<f32>)> {
        Err(BoxSegError::Model {
            operation: format!("run with input name {name}"),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "runtime always fails",
            )),
        })
    }
}
