//! Single-shot localization pipeline.

use crate::calibration::CalibrationRecord;
use crate::camera::{FrameSource, StereoRig};
use crate::config::StereoConfig;
use crate::error::{Error, Result};
use crate::localize::{locate_nearest_object, ObjectLocalization};
use crate::render::stereo_grid;
use crate::stereo::{DisparityMap, DisparityMatcher, RectifiedPair, Rectifier};
use crate::ui::ResultWindow;
use image::{GrayImage, RgbImage};

/// Everything one localization run produced.
#[derive(Debug, Clone)]
pub struct LocalizationReport {
    pub rectified: RectifiedPair,
    pub disparity: DisparityMap,
    /// 8-bit rendering of the disparity map.
    pub visual: GrayImage,
    /// Originals over rectified views.
    pub grid: RgbImage,
    /// Absent when no region cleared the threshold.
    pub object: Option<ObjectLocalization>,
}

/// Grab one pair, rectify it with `rectifier` (built from `record`), match,
/// and locate the nearest object.
///
/// The cameras are released right after the single read.
pub fn run_localization<L, R, X, M, W>(
    config: &StereoConfig,
    record: &CalibrationRecord,
    mut rig: StereoRig<L, R>,
    rectifier: &X,
    matcher: &M,
    window: &mut W,
) -> Result<LocalizationReport>
where
    L: FrameSource,
    R: FrameSource,
    X: Rectifier + ?Sized,
    M: DisparityMatcher + ?Sized,
    W: ResultWindow + ?Sized,
{
    let pair = rig.read_pair();
    rig.release();
    let pair = pair.ok_or(Error::FrameCapture)?;

    let pair = pair.fit_to(record.image_size);
    let (gray_left, gray_right) = pair.to_grayscale();

    let rectified = rectifier.rectify(&gray_left, &gray_right)?;
    let raw = matcher.compute(&rectified.left, &rectified.right)?;
    let disparity = DisparityMap::from_fixed_point(&raw);
    let visual = disparity.to_visual();

    let object = locate_nearest_object(
        &visual,
        &disparity,
        &rectifier.reprojection_matrix(),
        config.localization.threshold,
    );
    match &object {
        Some(object) => log::info!(
            "Object 3D location: {} at pixel ({}, {})",
            object,
            object.pixel.0,
            object.pixel.1
        ),
        None => log::info!("No region above disparity threshold {}", config.localization.threshold),
    }

    let grid = stereo_grid(&pair, &rectified, record.image_size);
    window.show_results(
        &grid,
        &visual,
        object.as_ref(),
        config.localization.marker_radius,
    )?;

    Ok(LocalizationReport {
        rectified,
        disparity,
        visual,
        grid,
        object,
    })
}
