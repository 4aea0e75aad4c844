use std::path::PathBuf;

use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("request file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request JSON error: {source}")]
    Parse {
        #[from]
        source: JsonError,
    },
    #[error("request file {path} must have a .json extension")]
    UnsupportedExtension { path: PathBuf },
    #[error("unknown padding parameter: `{value}`")]
    InvalidPad { value: String },
    #[error("3D padding must be `same` or `valid`, got {pad}")]
    UnsupportedPad3D { pad: String },
    #[error("unknown dataFormat `{value}`")]
    InvalidDataFormat { value: String },
    #[error("unknown rounding mode `{value}`")]
    InvalidRoundingMode { value: String },
    #[error(
        "the output {dimension} size {value} is not an integer; \
         change the stride and/or zero pad parameters"
    )]
    NonIntegerOutputSize { dimension: &'static str, value: f64 },
    #[error("the output {dimension} size {value} is negative; the filter does not fit the input")]
    NegativeOutputSize { dimension: &'static str, value: i128 },
    #[error("{operation} expects {argument} of rank {expected}, got {actual:?}")]
    ShapeRank {
        operation: &'static str,
        argument: &'static str,
        expected: usize,
        actual: Vec<usize>,
    },
    #[error("{operation}: {argument} does not fit in the size range")]
    SizeOverflow {
        operation: &'static str,
        argument: &'static str,
    },
    #[error("{operation} requires positive {argument}, got {values:?}")]
    NonPositiveParameter {
        operation: &'static str,
        argument: &'static str,
        values: Vec<usize>,
    },
}

impl GeometryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeometryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn size_overflow(operation: &'static str, argument: &'static str) -> Self {
        GeometryError::SizeOverflow {
            operation,
            argument,
        }
    }

    pub(crate) fn shape_rank(
        operation: &'static str,
        argument: &'static str,
        expected: usize,
        actual: &[usize],
    ) -> Self {
        GeometryError::ShapeRank {
            operation,
            argument,
            expected,
            actual: actual.to_vec(),
        }
    }
}
