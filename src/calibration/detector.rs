//! Chessboard corner detection with sub-pixel refinement.

use crate::error::Result;
use glam::Vec2;
use image::GrayImage;

/// Finds the calibration pattern in a grayscale frame.
pub trait PatternDetector {
    /// Refined corner positions in template order, or `None` if the
    /// full pattern is not visible.
    fn detect(&self, gray: &GrayImage) -> Result<Option<Vec<Vec2>>>;
}

impl<D: PatternDetector + ?Sized> PatternDetector for &D {
    fn detect(&self, gray: &GrayImage) -> Result<Option<Vec<Vec2>>> {
        (**self).detect(gray)
    }
}

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::*;
    use crate::calibration::CalibrationPattern;
    use crate::config::CaptureConfig;
    use crate::cv;
    use opencv::calib3d;
    use opencv::core::{Point2f, Size, Vector};
    use opencv::imgproc;

    /// Chessboard detector using OpenCV.
    pub struct OpenCvChessboardDetector {
        /// Board geometry.
        pub pattern: CalibrationPattern,
        /// Sub-pixel search half-window.
        pub window: i32,
        /// Refinement stopping rule.
        pub criteria: crate::config::TermCriteria,
    }

    impl OpenCvChessboardDetector {
        pub fn new(pattern: CalibrationPattern, capture: &CaptureConfig) -> Self {
            Self {
                pattern,
                window: capture.subpix_window,
                criteria: capture.criteria,
            }
        }
    }

    impl PatternDetector for OpenCvChessboardDetector {
        fn detect(&self, gray: &GrayImage) -> Result<Option<Vec<Vec2>>> {
            let mat = cv::gray_to_mat(gray)?;
            let pattern_size = Size::new(self.pattern.columns as i32, self.pattern.rows as i32);
            let mut corners = Vector::<Point2f>::new();

            let found = calib3d::find_chessboard_corners(
                &mat,
                pattern_size,
                &mut corners,
                calib3d::CALIB_CB_ADAPTIVE_THRESH | calib3d::CALIB_CB_NORMALIZE_IMAGE,
            )?;
            if !found {
                return Ok(None);
            }

            imgproc::corner_sub_pix(
                &mat,
                &mut corners,
                Size::new(self.window, self.window),
                Size::new(-1, -1),
                cv::term_criteria(&self.criteria)?,
            )?;

            Ok(Some(cv::vector_to_points2(&corners)))
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::OpenCvChessboardDetector;

#[cfg(not(feature = "opencv"))]
pub struct OpenCvChessboardDetector;

#[cfg(not(feature = "opencv"))]
impl OpenCvChessboardDetector {
    pub fn new(
        _pattern: crate::calibration::CalibrationPattern,
        _capture: &crate::config::CaptureConfig,
    ) -> Self {
        Self
    }
}

#[cfg(not(feature = "opencv"))]
impl PatternDetector for OpenCvChessboardDetector {
    fn detect(&self, _gray: &GrayImage) -> Result<Option<Vec<Vec2>>> {
        Err(crate::error::Error::BackendDisabled)
    }
}
