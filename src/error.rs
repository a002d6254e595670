//! Error type shared by both pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a calibration or localization run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot open camera {id}")]
    CameraUnavailable { id: i32 },
    #[error("Could not read images from both cameras")]
    FrameCapture,
    #[error("Not enough valid pairs for calibration: {accepted} accepted, {required} required")]
    NotEnoughSamples { accepted: usize, required: usize },
    #[error("Calibration file not found: {}", .0.display())]
    CalibrationFileMissing(PathBuf),
    #[error("Calibration file is invalid: {0}")]
    InvalidCalibrationFile(String),
    #[error("Calibration solver failed: {0}")]
    Solver(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Image size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
    #[error("Buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("OpenCV feature not enabled. Build with --features opencv")]
    BackendDisabled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encoding(#[from] bincode::Error),
    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "opencv")]
impl From<opencv::Error> for Error {
    fn from(e: opencv::Error) -> Self {
        Error::OpenCv(e.to_string())
    }
}
