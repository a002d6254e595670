//! Single-camera and stereo calibration.
//!
//! Each camera is calibrated on its own first; the stereo solve then keeps
//! those intrinsics fixed and estimates the relative pose between the two.

use super::record::CalibrationRecord;
use super::session::CorrespondenceSample;
use crate::camera::ImageSize;
use crate::error::{Error, Result};

/// Which camera of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Pinhole intrinsics with lens distortion.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraIntrinsics {
    /// 3x3 camera matrix (row-major).
    pub camera_matrix: [[f64; 3]; 3],
    /// Distortion coefficients in OpenCV order (k1, k2, p1, p2, k3, ...).
    pub distortion: Vec<f64>,
}

/// Result of a single-camera solve.
#[derive(Debug, Clone)]
pub struct MonoCalibration {
    pub intrinsics: CameraIntrinsics,
    /// RMS reprojection error in pixels.
    pub rms: f64,
}

/// Result of the fixed-intrinsic stereo solve.
#[derive(Debug, Clone)]
pub struct StereoCalibration {
    pub left: CameraIntrinsics,
    pub right: CameraIntrinsics,
    /// Rotation from the left to the right camera frame.
    pub rotation: [[f64; 3]; 3],
    /// Translation from the left to the right camera frame.
    pub translation: [f64; 3],
    pub essential: [[f64; 3]; 3],
    pub fundamental: [[f64; 3]; 3],
    /// RMS reprojection error in pixels.
    pub rms: f64,
}

/// Calibration optimizer backend.
pub trait StereoSolver {
    fn calibrate_camera(
        &self,
        samples: &[CorrespondenceSample],
        side: Side,
        image_size: ImageSize,
    ) -> Result<MonoCalibration>;

    fn stereo_calibrate(
        &self,
        samples: &[CorrespondenceSample],
        left: &CameraIntrinsics,
        right: &CameraIntrinsics,
        image_size: ImageSize,
    ) -> Result<StereoCalibration>;
}

/// Run both single-camera solves and the stereo solve.
///
/// Refuses to call the solver with fewer than `min_pairs` samples.
pub fn calibrate<S: StereoSolver + ?Sized>(
    samples: &[CorrespondenceSample],
    image_size: Option<ImageSize>,
    min_pairs: usize,
    solver: &S,
) -> Result<CalibrationRecord> {
    let image_size = match image_size {
        Some(size) if samples.len() >= min_pairs => size,
        _ => {
            return Err(Error::NotEnoughSamples {
                accepted: samples.len(),
                required: min_pairs,
            })
        }
    };

    log::info!(
        "Calibrating from {} pairs at {}",
        samples.len(),
        image_size
    );

    let left = solver.calibrate_camera(samples, Side::Left, image_size)?;
    log::info!("Left camera RMS reprojection error: {:.4}px", left.rms);
    let right = solver.calibrate_camera(samples, Side::Right, image_size)?;
    log::info!("Right camera RMS reprojection error: {:.4}px", right.rms);

    let stereo =
        solver.stereo_calibrate(samples, &left.intrinsics, &right.intrinsics, image_size)?;
    log::info!("Stereo RMS reprojection error: {:.4}px", stereo.rms);

    Ok(CalibrationRecord {
        mtx_left: stereo.left.camera_matrix,
        dist_left: stereo.left.distortion,
        mtx_right: stereo.right.camera_matrix,
        dist_right: stereo.right.distortion,
        rotation: stereo.rotation,
        translation: stereo.translation,
        essential: stereo.essential,
        fundamental: stereo.fundamental,
        image_size,
    })
}

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::*;
    use crate::config::TermCriteria;
    use crate::cv;
    use opencv::calib3d;
    use opencv::core::{self, Mat, Point2f, Point3f, Vector};

    /// Calibration solver using OpenCV.
    pub struct OpenCvStereoSolver {
        /// Stopping rule for the stereo solve.
        pub criteria: TermCriteria,
    }

    impl OpenCvStereoSolver {
        pub fn new(criteria: TermCriteria) -> Self {
            Self { criteria }
        }

        fn object_points(samples: &[CorrespondenceSample]) -> Vector<Vector<Point3f>> {
            samples
                .iter()
                .map(|s| cv::points3_to_vector(&s.object_points))
                .collect()
        }

        fn image_points(samples: &[CorrespondenceSample], side: Side) -> Vector<Vector<Point2f>> {
            samples
                .iter()
                .map(|s| cv::points2_to_vector(s.corners(side)))
                .collect()
        }

        fn intrinsics(camera_matrix: &Mat, distortion: &Mat) -> Result<CameraIntrinsics> {
            Ok(CameraIntrinsics {
                camera_matrix: cv::mat_to_3x3(camera_matrix)?,
                distortion: cv::mat_to_vec(distortion)?,
            })
        }

        fn intrinsics_to_mats(intrinsics: &CameraIntrinsics) -> Result<(Mat, Mat)> {
            Ok((
                cv::mat_from_3x3(&intrinsics.camera_matrix)?,
                cv::mat_from_column(&intrinsics.distortion)?,
            ))
        }
    }

    impl StereoSolver for OpenCvStereoSolver {
        fn calibrate_camera(
            &self,
            samples: &[CorrespondenceSample],
            side: Side,
            image_size: ImageSize,
        ) -> Result<MonoCalibration> {
            let object_points = Self::object_points(samples);
            let image_points = Self::image_points(samples, side);

            let mut camera_matrix = Mat::default();
            let mut distortion = Mat::default();
            let mut rvecs = Vector::<Mat>::new();
            let mut tvecs = Vector::<Mat>::new();
            // Library default stopping rule for the single-camera solve.
            let criteria = core::TermCriteria::new(
                core::TermCriteria_COUNT | core::TermCriteria_EPS,
                30,
                f64::EPSILON,
            )?;

            let rms = calib3d::calibrate_camera(
                &object_points,
                &image_points,
                cv::size_of(image_size),
                &mut camera_matrix,
                &mut distortion,
                &mut rvecs,
                &mut tvecs,
                0,
                criteria,
            )
            .map_err(|e| Error::Solver(format!("{} camera: {}", side, e)))?;

            Ok(MonoCalibration {
                intrinsics: Self::intrinsics(&camera_matrix, &distortion)?,
                rms,
            })
        }

        fn stereo_calibrate(
            &self,
            samples: &[CorrespondenceSample],
            left: &CameraIntrinsics,
            right: &CameraIntrinsics,
            image_size: ImageSize,
        ) -> Result<StereoCalibration> {
            let object_points = Self::object_points(samples);
            let left_points = Self::image_points(samples, Side::Left);
            let right_points = Self::image_points(samples, Side::Right);

            let (mut k1, mut d1) = Self::intrinsics_to_mats(left)?;
            let (mut k2, mut d2) = Self::intrinsics_to_mats(right)?;
            let mut r = Mat::default();
            let mut t = Mat::default();
            let mut e = Mat::default();
            let mut f = Mat::default();

            let rms = calib3d::stereo_calibrate(
                &object_points,
                &left_points,
                &right_points,
                &mut k1,
                &mut d1,
                &mut k2,
                &mut d2,
                cv::size_of(image_size),
                &mut r,
                &mut t,
                &mut e,
                &mut f,
                calib3d::CALIB_FIX_INTRINSIC,
                cv::term_criteria(&self.criteria)?,
            )
            .map_err(|e| Error::Solver(format!("stereo: {}", e)))?;

            let translation = cv::mat_to_vec(&t)?;
            let translation = match translation.as_slice() {
                [x, y, z] => [*x, *y, *z],
                other => {
                    return Err(Error::Solver(format!(
                        "translation has {} elements",
                        other.len()
                    )))
                }
            };

            Ok(StereoCalibration {
                left: Self::intrinsics(&k1, &d1)?,
                right: Self::intrinsics(&k2, &d2)?,
                rotation: cv::mat_to_3x3(&r)?,
                translation,
                essential: cv::mat_to_3x3(&e)?,
                fundamental: cv::mat_to_3x3(&f)?,
                rms,
            })
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::OpenCvStereoSolver;

#[cfg(not(feature = "opencv"))]
pub struct OpenCvStereoSolver;

#[cfg(not(feature = "opencv"))]
impl OpenCvStereoSolver {
    pub fn new(_criteria: crate::config::TermCriteria) -> Self {
        Self
    }
}

#[cfg(not(feature = "opencv"))]
impl StereoSolver for OpenCvStereoSolver {
    fn calibrate_camera(
        &self,
        _samples: &[CorrespondenceSample],
        _side: Side,
        _image_size: ImageSize,
    ) -> Result<MonoCalibration> {
        Err(Error::BackendDisabled)
    }

    fn stereo_calibrate(
        &self,
        _samples: &[CorrespondenceSample],
        _left: &CameraIntrinsics,
        _right: &CameraIntrinsics,
        _image_size: ImageSize,
    ) -> Result<StereoCalibration> {
        Err(Error::BackendDisabled)
    }
}
