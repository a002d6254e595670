//! Epipolar rectification of a grayscale pair.

use super::reproject::ReprojectionMatrix;
use crate::error::Result;
use image::GrayImage;

/// Row-aligned grayscale pair.
#[derive(Debug, Clone)]
pub struct RectifiedPair {
    pub left: GrayImage,
    pub right: GrayImage,
}

/// Rotations and projections computed by rectification.
#[derive(Debug, Clone, PartialEq)]
pub struct RectificationTransforms {
    /// Left rectifying rotation.
    pub r1: [[f64; 3]; 3],
    /// Right rectifying rotation.
    pub r2: [[f64; 3]; 3],
    /// Left projection in the rectified frame.
    pub p1: [[f64; 4]; 3],
    /// Right projection in the rectified frame.
    pub p2: [[f64; 4]; 3],
    /// Disparity-to-depth mapping.
    pub q: ReprojectionMatrix,
}

/// Warps a grayscale pair so that epipolar lines are horizontal rows.
pub trait Rectifier {
    fn rectify(&self, left: &GrayImage, right: &GrayImage) -> Result<RectifiedPair>;

    /// Q matrix for reprojecting disparities of rectified images.
    fn reprojection_matrix(&self) -> ReprojectionMatrix;
}

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::*;
    use crate::calibration::CalibrationRecord;
    use crate::camera::ImageSize;
    use crate::cv;
    use crate::error::Error;
    use opencv::calib3d;
    use opencv::core::{self, Mat, Rect, Scalar};
    use opencv::imgproc;
    use opencv::prelude::*;

    struct RemapTables {
        map1: Mat,
        map2: Mat,
    }

    /// Rectifier using OpenCV remap tables built once per calibration record.
    pub struct OpenCvRectifier {
        image_size: ImageSize,
        transforms: RectificationTransforms,
        left: RemapTables,
        right: RemapTables,
    }

    impl OpenCvRectifier {
        /// Zero-disparity rectification with alpha 0 (valid pixels only, no extra scaling).
        pub fn from_record(record: &CalibrationRecord) -> Result<Self> {
            let size = cv::size_of(record.image_size);
            let k1 = cv::mat_from_3x3(&record.mtx_left)?;
            let d1 = cv::mat_from_column(&record.dist_left)?;
            let k2 = cv::mat_from_3x3(&record.mtx_right)?;
            let d2 = cv::mat_from_column(&record.dist_right)?;
            let r = cv::mat_from_3x3(&record.rotation)?;
            let t = cv::mat_from_column(&record.translation)?;

            let mut r1 = Mat::default();
            let mut r2 = Mat::default();
            let mut p1 = Mat::default();
            let mut p2 = Mat::default();
            let mut q = Mat::default();
            calib3d::stereo_rectify(
                &k1,
                &d1,
                &k2,
                &d2,
                size,
                &r,
                &t,
                &mut r1,
                &mut r2,
                &mut p1,
                &mut p2,
                &mut q,
                calib3d::CALIB_ZERO_DISPARITY,
                0.0,
                size,
                &mut Rect::default(),
                &mut Rect::default(),
            )?;

            let left = Self::remap_tables(&k1, &d1, &r1, &p1, size)?;
            let right = Self::remap_tables(&k2, &d2, &r2, &p2, size)?;

            let transforms = RectificationTransforms {
                r1: cv::mat_to_3x3(&r1)?,
                r2: cv::mat_to_3x3(&r2)?,
                p1: Self::mat_to_3x4(&p1)?,
                p2: Self::mat_to_3x4(&p2)?,
                q: cv::mat_to_4x4(&q)?,
            };
            log::info!("Rectification maps built for {}", record.image_size);

            Ok(Self {
                image_size: record.image_size,
                transforms,
                left,
                right,
            })
        }

        pub fn transforms(&self) -> &RectificationTransforms {
            &self.transforms
        }

        fn remap_tables(k: &Mat, d: &Mat, r: &Mat, p: &Mat, size: core::Size) -> Result<RemapTables> {
            let mut map1 = Mat::default();
            let mut map2 = Mat::default();
            calib3d::init_undistort_rectify_map(k, d, r, p, size, core::CV_16SC2, &mut map1, &mut map2)?;
            Ok(RemapTables { map1, map2 })
        }

        fn mat_to_3x4(mat: &Mat) -> Result<[[f64; 4]; 3]> {
            let mut out = [[0.0; 4]; 3];
            for (r, row) in out.iter_mut().enumerate() {
                for (c, value) in row.iter_mut().enumerate() {
                    *value = *mat.at_2d::<f64>(r as i32, c as i32)?;
                }
            }
            Ok(out)
        }

        fn remap(&self, image: &GrayImage, tables: &RemapTables) -> Result<GrayImage> {
            let size = ImageSize::of(image);
            if size != self.image_size {
                return Err(Error::SizeMismatch {
                    expected_width: self.image_size.width,
                    expected_height: self.image_size.height,
                    width: size.width,
                    height: size.height,
                });
            }
            let src = cv::gray_to_mat(image)?;
            let mut dst = Mat::default();
            imgproc::remap(
                &src,
                &mut dst,
                &tables.map1,
                &tables.map2,
                imgproc::INTER_LINEAR,
                core::BORDER_CONSTANT,
                Scalar::default(),
            )?;
            cv::mat_to_gray(&dst)
        }
    }

    impl Rectifier for OpenCvRectifier {
        fn rectify(&self, left: &GrayImage, right: &GrayImage) -> Result<RectifiedPair> {
            Ok(RectifiedPair {
                left: self.remap(left, &self.left)?,
                right: self.remap(right, &self.right)?,
            })
        }

        fn reprojection_matrix(&self) -> ReprojectionMatrix {
            self.transforms.q
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::OpenCvRectifier;

#[cfg(not(feature = "opencv"))]
pub struct OpenCvRectifier;

#[cfg(not(feature = "opencv"))]
impl OpenCvRectifier {
    pub fn from_record(_record: &crate::calibration::CalibrationRecord) -> Result<Self> {
        Err(crate::error::Error::BackendDisabled)
    }
}

#[cfg(not(feature = "opencv"))]
impl Rectifier for OpenCvRectifier {
    fn rectify(&self, _left: &GrayImage, _right: &GrayImage) -> Result<RectifiedPair> {
        Err(crate::error::Error::BackendDisabled)
    }

    fn reprojection_matrix(&self) -> ReprojectionMatrix {
        [[0.0; 4]; 4]
    }
}
