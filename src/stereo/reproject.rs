//! Disparity to 3D reprojection through the rectification Q matrix.

use super::disparity::DisparityMap;
use glam::Vec3;

/// Disparity-to-depth mapping from rectification.
pub type ReprojectionMatrix = [[f64; 4]; 4];

/// One 3D point per disparity pixel, camera-relative.
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub width: u32,
    pub height: u32,
    pub points: Vec<Vec3>,
}

impl PointCloud {
    pub fn at(&self, x: u32, y: u32) -> Vec3 {
        self.points[(y * self.width + x) as usize]
    }
}

/// Reproject a single pixel: `Q * [x, y, d, 1]` followed by the homogeneous divide.
///
/// A zero homogeneous coordinate yields non-finite components.
pub fn reproject_pixel(q: &ReprojectionMatrix, x: f64, y: f64, d: f64) -> Vec3 {
    let row = |r: usize| q[r][0] * x + q[r][1] * y + q[r][2] * d + q[r][3];
    let inv_w = 1.0 / row(3);
    Vec3::new(
        (row(0) * inv_w) as f32,
        (row(1) * inv_w) as f32,
        (row(2) * inv_w) as f32,
    )
}

/// Reproject every pixel of a disparity map.
pub fn reproject_image_to_3d(disparity: &DisparityMap, q: &ReprojectionMatrix) -> PointCloud {
    let mut points = Vec::with_capacity(disparity.data.len());
    for y in 0..disparity.height {
        for x in 0..disparity.width {
            let d = disparity.get(x, y) as f64;
            points.push(reproject_pixel(q, x as f64, y as f64, d));
        }
    }
    PointCloud {
        width: disparity.width,
        height: disparity.height,
        points,
    }
}
