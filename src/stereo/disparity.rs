//! Disparity maps and the block matcher seam.

use crate::error::{Error, Result};
use image::{GrayImage, Luma};

/// Sub-pixel scale of the matcher's fixed-point output.
pub const DISPARITY_SCALE: f32 = 16.0;

/// Raw matcher output: disparity times [`DISPARITY_SCALE`], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPointDisparity {
    pub width: u32,
    pub height: u32,
    pub data: Vec<i16>,
}

impl FixedPointDisparity {
    pub fn new(width: u32, height: u32, data: Vec<i16>) -> Result<Self> {
        if data.len() != (width * height) as usize {
            return Err(Error::BufferLength {
                expected: (width * height) as usize,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Per-pixel disparity in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl DisparityMap {
    /// Remove the fixed-point scaling of a matcher result.
    pub fn from_fixed_point(raw: &FixedPointDisparity) -> Self {
        Self {
            width: raw.width,
            height: raw.height,
            data: raw
                .data
                .iter()
                .map(|&v| v as f32 / DISPARITY_SCALE)
                .collect(),
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Min-max stretch to 0..=255, truncated toward zero.
    ///
    /// A constant map becomes all zeros.
    pub fn to_visual(&self) -> GrayImage {
        let (min, max) = self
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let (min, range) = (min as f64, max as f64 - min as f64);

        GrayImage::from_fn(self.width, self.height, |x, y| {
            if !(range > 0.0) {
                return Luma([0]);
            }
            let v = (self.get(x, y) as f64 - min) * 255.0 / range;
            Luma([v.clamp(0.0, 255.0) as u8])
        })
    }
}

/// Dense stereo correspondence on a rectified grayscale pair.
pub trait DisparityMatcher {
    fn compute(&self, left: &GrayImage, right: &GrayImage) -> Result<FixedPointDisparity>;
}

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::*;
    use crate::config::{MatcherConfig, MatcherMode};
    use crate::cv;
    use opencv::calib3d;
    use opencv::core::{Mat, Ptr};
    use opencv::prelude::*;
    use std::cell::RefCell;

    /// Semi-global block matcher using OpenCV.
    pub struct OpenCvSgbm {
        matcher: RefCell<Ptr<calib3d::StereoSGBM>>,
    }

    impl OpenCvSgbm {
        pub fn new(config: &MatcherConfig) -> Result<Self> {
            let mode = match config.mode {
                MatcherMode::Sgbm => calib3d::StereoSGBM_MODE_SGBM,
                MatcherMode::Hh => calib3d::StereoSGBM_MODE_HH,
                MatcherMode::Sgbm3Way => calib3d::StereoSGBM_MODE_SGBM_3WAY,
                MatcherMode::Hh4 => calib3d::StereoSGBM_MODE_HH4,
            };
            let matcher = calib3d::StereoSGBM::create(
                config.min_disparity,
                config.num_disparities,
                config.block_size,
                config.p1,
                config.p2,
                config.disp12_max_diff,
                config.pre_filter_cap,
                config.uniqueness_ratio,
                config.speckle_window_size,
                config.speckle_range,
                mode,
            )?;
            Ok(Self {
                matcher: RefCell::new(matcher),
            })
        }
    }

    impl DisparityMatcher for OpenCvSgbm {
        fn compute(&self, left: &GrayImage, right: &GrayImage) -> Result<FixedPointDisparity> {
            let left_mat = cv::gray_to_mat(left)?;
            let right_mat = cv::gray_to_mat(right)?;
            let mut disparity = Mat::default();
            self.matcher
                .borrow_mut()
                .compute(&left_mat, &right_mat, &mut disparity)?;

            FixedPointDisparity::new(
                disparity.cols() as u32,
                disparity.rows() as u32,
                cv::mat_to_i16(&disparity)?,
            )
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::OpenCvSgbm;

#[cfg(not(feature = "opencv"))]
pub struct OpenCvSgbm;

#[cfg(not(feature = "opencv"))]
impl OpenCvSgbm {
    pub fn new(_config: &crate::config::MatcherConfig) -> Result<Self> {
        Err(Error::BackendDisabled)
    }
}

#[cfg(not(feature = "opencv"))]
impl DisparityMatcher for OpenCvSgbm {
    fn compute(&self, _left: &GrayImage, _right: &GrayImage) -> Result<FixedPointDisparity> {
        Err(Error::BackendDisabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_division() {
        let raw = FixedPointDisparity::new(4, 1, vec![-16, 0, 17, 2047]).unwrap();
        let map = DisparityMap::from_fixed_point(&raw);
        for (scaled, fixed) in map.data.iter().zip(&raw.data) {
            assert_eq!(*scaled, *fixed as f32 / 16.0);
        }
        assert_eq!(map.get(0, 0), -1.0);
        assert_eq!(map.get(2, 0), 1.0625);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(FixedPointDisparity::new(3, 3, vec![0; 8]).is_err());
    }

    #[test]
    fn test_visual_stretches_to_full_range() {
        let map = DisparityMap {
            width: 3,
            height: 1,
            data: vec![0.0, 5.0, 20.0],
        };
        let visual = map.to_visual();
        assert_eq!(visual.get_pixel(0, 0)[0], 0);
        // 63.75
        assert_eq!(visual.get_pixel(1, 0)[0], 63);
        assert_eq!(visual.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_visual_truncates_at_threshold_boundary() {
        let map = DisparityMap {
            width: 3,
            height: 1,
            data: vec![0.0, 25.35, 100.0],
        };
        // 64.64 before the cast.
        assert_eq!(map.to_visual().get_pixel(1, 0)[0], 64);
    }

    #[test]
    fn test_constant_map_is_black() {
        let map = DisparityMap {
            width: 2,
            height: 2,
            data: vec![5.0; 4],
        };
        assert!(map.to_visual().pixels().all(|p| p[0] == 0));
    }
}
