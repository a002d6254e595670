//! Stereo geometry: rectification, disparity and reprojection.

mod disparity;
mod rectify;
mod reproject;

pub use disparity::{DisparityMap, DisparityMatcher, FixedPointDisparity, OpenCvSgbm, DISPARITY_SCALE};
pub use rectify::{OpenCvRectifier, RectificationTransforms, RectifiedPair, Rectifier};
pub use reproject::{reproject_image_to_3d, reproject_pixel, PointCloud, ReprojectionMatrix};
