//! Capture-and-calibrate pipeline.

use crate::calibration::{
    calibrate, run_capture, CalibrationPattern, CalibrationRecord, CaptureState, PatternDetector,
    StereoSolver,
};
use crate::camera::{FrameSource, StereoRig};
use crate::config::StereoConfig;
use crate::error::Result;
use crate::export::FrameStore;
use crate::ui::PreviewWindow;

/// Outcome of a successful calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationRun {
    pub record: CalibrationRecord,
    /// Number of accepted pairs the record was computed from.
    pub pairs: usize,
    /// How capture ended.
    pub stopped: CaptureState,
}

/// Capture pairs interactively, calibrate, and persist the record to
/// `config.calibration_file`.
///
/// The rig is released before calibration starts. Fewer than
/// `config.capture.min_pairs` accepted pairs aborts without calling the solver.
pub fn run_calibration<L, R, D, W, S>(
    config: &StereoConfig,
    rig: StereoRig<L, R>,
    detector: &D,
    window: &mut W,
    solver: &S,
) -> Result<CalibrationRun>
where
    L: FrameSource,
    R: FrameSource,
    D: PatternDetector + ?Sized,
    W: PreviewWindow + ?Sized,
    S: StereoSolver + ?Sized,
{
    config.validate()?;
    let pattern = CalibrationPattern::from(config.pattern);
    let store = FrameStore::create(&config.capture.save_dir)?;

    let outcome = run_capture(rig, detector, window, &store, &pattern, &config.capture)?;
    let pairs = outcome.samples.len();

    let record = calibrate(
        &outcome.samples,
        outcome.image_size,
        config.capture.min_pairs,
        solver,
    )?;
    record.save(&config.calibration_file)?;

    Ok(CalibrationRun {
        record,
        pairs,
        stopped: outcome.state,
    })
}
