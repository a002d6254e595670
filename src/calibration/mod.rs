//! Calibration module for chessboard capture and stereo calibration.

mod detector;
mod pattern;
mod record;
mod session;
mod solver;

pub use detector::{OpenCvChessboardDetector, PatternDetector};
pub use pattern::CalibrationPattern;
pub use record::CalibrationRecord;
pub use session::{run_capture, CaptureOutcome, CaptureSession, CaptureState, CorrespondenceSample};
pub use solver::{
    calibrate, CameraIntrinsics, MonoCalibration, OpenCvStereoSolver, Side, StereoCalibration,
    StereoSolver,
};
