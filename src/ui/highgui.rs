//! OpenCV HighGUI windows.

pub const PREVIEW_WINDOW: &str = "Stereo Chessboard Detection";
pub const GRID_WINDOW: &str = "Stereo Camera Grid (Captured and Rectified)";
pub const DISPARITY_WINDOW: &str = "Disparity Map with Object Detection";

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::*;
    use crate::calibration::CalibrationPattern;
    use crate::camera::{Frame, FramePair};
    use crate::cv;
    use crate::error::Result;
    use crate::localize::ObjectLocalization;
    use crate::render;
    use crate::ui::{OperatorCommand, PreviewWindow, ResultWindow};
    use glam::Vec2;
    use image::{DynamicImage, GrayImage, RgbImage};
    use opencv::calib3d;
    use opencv::core::{Point, Scalar, Size};
    use opencv::highgui;
    use opencv::imgproc;

    /// Native windows through OpenCV's HighGUI.
    #[derive(Debug, Default)]
    pub struct HighGuiWindow;

    impl HighGuiWindow {
        pub fn new() -> Self {
            Self
        }

        fn annotate(frame: &Frame, pattern: &CalibrationPattern, corners: Option<&[Vec2]>) -> Result<Frame> {
            let Some(corners) = corners else {
                return Ok(frame.clone());
            };
            let mut mat = cv::rgb_to_mat(frame)?;
            calib3d::draw_chessboard_corners(
                &mut mat,
                Size::new(pattern.columns as i32, pattern.rows as i32),
                &cv::points2_to_vector(corners),
                true,
            )?;
            cv::mat_to_rgb(&mat)
        }
    }

    impl PreviewWindow for HighGuiWindow {
        fn show_detections(
            &mut self,
            pair: &FramePair,
            pattern: &CalibrationPattern,
            left: Option<&[Vec2]>,
            right: Option<&[Vec2]>,
        ) -> Result<()> {
            let left = Self::annotate(&pair.left, pattern, left)?;
            let right = Self::annotate(&pair.right, pattern, right)?;
            let combined = render::side_by_side(&left, &right);
            highgui::imshow(PREVIEW_WINDOW, &cv::rgb_to_mat(&combined)?)?;
            Ok(())
        }

        fn poll_command(&mut self, delay_ms: i32) -> Result<Option<OperatorCommand>> {
            let key = highgui::wait_key(delay_ms)?;
            Ok(OperatorCommand::from_key(key))
        }

        fn close(&mut self) -> Result<()> {
            highgui::destroy_all_windows()?;
            Ok(())
        }
    }

    impl ResultWindow for HighGuiWindow {
        fn show_results(
            &mut self,
            grid: &RgbImage,
            disparity: &GrayImage,
            localization: Option<&ObjectLocalization>,
            marker_radius: i32,
        ) -> Result<()> {
            let visual = DynamicImage::ImageLuma8(disparity.clone()).to_rgb8();
            let mut visual = cv::rgb_to_mat(&visual)?;

            if let Some(object) = localization {
                let (cx, cy) = (object.pixel.0 as i32, object.pixel.1 as i32);
                let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
                imgproc::circle(&mut visual, Point::new(cx, cy), marker_radius, red, -1, imgproc::LINE_8, 0)?;
                imgproc::put_text(
                    &mut visual,
                    &object.label(),
                    Point::new(cx + 10, cy),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    0.5,
                    red,
                    1,
                    imgproc::LINE_8,
                    false,
                )?;
            }

            highgui::imshow(GRID_WINDOW, &cv::rgb_to_mat(grid)?)?;
            highgui::imshow(DISPARITY_WINDOW, &visual)?;
            highgui::wait_key(0)?;
            highgui::destroy_all_windows()?;
            Ok(())
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::HighGuiWindow;

#[cfg(not(feature = "opencv"))]
mod disabled {
    use crate::calibration::CalibrationPattern;
    use crate::camera::FramePair;
    use crate::error::{Error, Result};
    use crate::localize::ObjectLocalization;
    use crate::ui::{OperatorCommand, PreviewWindow, ResultWindow};
    use glam::Vec2;
    use image::{GrayImage, RgbImage};

    #[derive(Debug, Default)]
    pub struct HighGuiWindow;

    impl HighGuiWindow {
        pub fn new() -> Self {
            Self
        }
    }

    impl PreviewWindow for HighGuiWindow {
        fn show_detections(
            &mut self,
            _pair: &FramePair,
            _pattern: &CalibrationPattern,
            _left: Option<&[Vec2]>,
            _right: Option<&[Vec2]>,
        ) -> Result<()> {
            Err(Error::BackendDisabled)
        }

        fn poll_command(&mut self, _delay_ms: i32) -> Result<Option<OperatorCommand>> {
            Err(Error::BackendDisabled)
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    impl ResultWindow for HighGuiWindow {
        fn show_results(
            &mut self,
            _grid: &RgbImage,
            _disparity: &GrayImage,
            _localization: Option<&ObjectLocalization>,
            _marker_radius: i32,
        ) -> Result<()> {
            Err(Error::BackendDisabled)
        }
    }
}

#[cfg(not(feature = "opencv"))]
pub use disabled::HighGuiWindow;
