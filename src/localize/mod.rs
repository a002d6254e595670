//! Nearest-object localization from a disparity map.
//!
//! Near objects have large disparities. The 8-bit visualization is
//! thresholded, the largest external region is taken as the object, and the
//! disparity at its centroid is reprojected to a camera-relative 3D point.

mod contours;

pub use contours::{find_external_regions, threshold_binary, Region};

use crate::stereo::{reproject_image_to_3d, DisparityMap, ReprojectionMatrix};
use glam::{DVec2, Vec3};
use image::GrayImage;

/// Where the nearest object is, in the image and in space.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLocalization {
    /// Centroid pixel (moments truncated to integers).
    pub pixel: (u32, u32),
    /// Sub-pixel centroid.
    pub centroid: DVec2,
    /// Boundary polygon area in pixels.
    pub area: f64,
    /// Disparity at the centroid pixel.
    pub disparity: f32,
    /// Camera-relative position in calibration units.
    pub position: Vec3,
}

impl ObjectLocalization {
    /// Short overlay label, one decimal per axis.
    pub fn label(&self) -> String {
        format!(
            "({:.1}, {:.1}, {:.1})",
            self.position.x, self.position.y, self.position.z
        )
    }
}

impl std::fmt::Display for ObjectLocalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X={:.2} Y={:.2} Z={:.2}",
            self.position.x, self.position.y, self.position.z
        )
    }
}

/// Region with the largest boundary area. The earliest one wins a tie.
pub fn largest_region(regions: &[Region]) -> Option<&Region> {
    regions.iter().fold(None, |best: Option<&Region>, region| match best {
        Some(b) if b.area() >= region.area() => Some(b),
        _ => Some(region),
    })
}

/// Find the nearest blob in `visual` (the 8-bit rendering of `disparity`)
/// and reproject its centroid.
///
/// Returns `None` when no region clears `threshold` or the largest region
/// has zero area.
pub fn locate_nearest_object(
    visual: &GrayImage,
    disparity: &DisparityMap,
    q: &ReprojectionMatrix,
    threshold: u8,
) -> Option<ObjectLocalization> {
    let mask = threshold_binary(visual, threshold);
    let regions = find_external_regions(&mask);
    log::debug!("{} external regions above threshold {}", regions.len(), threshold);

    let region = largest_region(&regions)?;
    let area = region.area();
    if area <= 0.0 {
        log::debug!("Largest region has zero area");
        return None;
    }
    let centroid = region.centroid()?;
    let (cx, cy) = (centroid.x as u32, centroid.y as u32);

    let cloud = reproject_image_to_3d(disparity, q);
    Some(ObjectLocalization {
        pixel: (cx, cy),
        centroid,
        area,
        disparity: disparity.get(cx, cy),
        position: cloud.at(cx, cy),
    })
}
