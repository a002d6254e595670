//! Stereo Camera Calibration and Localization
//!
//! Library behind the two stereo tools:
//! - `stereo-calibrate`: interactive chessboard capture and stereo calibration
//! - `stereo-localize`: single-shot rectification, disparity and 3D localization
//!
//! Numerical heavy lifting (corner detection, calibration, rectification,
//! semi-global matching) is delegated to OpenCV behind the `opencv` feature.

pub mod calibration;
pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod localize;
pub mod pipeline;
pub mod render;
pub mod stereo;
pub mod ui;

#[cfg(feature = "opencv")]
mod cv;

pub use error::{Error, Result};
