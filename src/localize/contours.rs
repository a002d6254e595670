//! External region extraction from binary masks.
//!
//! Borders are traced with Suzuki-Abe border following. A region is external
//! when its outer border has no parent, so islands inside holes are skipped.
//! Each external region carries its outer border (for area) and the pixel
//! moments of its 8-connected component (for centroid).

use glam::DVec2;
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::geometry::contour_area;
use imageproc::point::Point;
use imageproc::region_labelling::{connected_components, Connectivity};

/// Pixels strictly above `thresh` become 255, everything else 0.
pub fn threshold_binary(image: &GrayImage, thresh: u8) -> GrayImage {
    threshold(image, thresh, ThresholdType::Binary)
}

/// One external foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Outer border pixels in tracing order.
    pub boundary: Vec<Point<i32>>,
    /// Number of foreground pixels.
    pub pixel_count: u64,
    sum_x: u64,
    sum_y: u64,
}

impl Region {
    /// Polygon area of the outer border through pixel centers.
    ///
    /// Regions one pixel thick enclose nothing and have zero area.
    pub fn area(&self) -> f64 {
        if self.boundary.len() < 3 {
            return 0.0;
        }
        contour_area(&self.boundary).abs()
    }

    /// First-order pixel moments over zeroth: the mean pixel coordinate.
    pub fn centroid(&self) -> Option<DVec2> {
        if self.pixel_count == 0 {
            return None;
        }
        let n = self.pixel_count as f64;
        Some(DVec2::new(self.sum_x as f64 / n, self.sum_y as f64 / n))
    }
}

#[derive(Default, Clone, Copy)]
struct Moments {
    count: u64,
    sum_x: u64,
    sum_y: u64,
}

/// External regions of a binary mask (non-zero pixels are foreground), in
/// raster order of their top-left pixel.
pub fn find_external_regions(mask: &GrayImage) -> Vec<Region> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let outer: Vec<_> = find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .collect();
    if outer.is_empty() {
        return Vec::new();
    }

    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let mut moments = Vec::<Moments>::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if moments.len() <= label {
            moments.resize(label + 1, Moments::default());
        }
        let m = &mut moments[label];
        m.count += 1;
        m.sum_x += x as u64;
        m.sum_y += y as u64;
    }

    outer
        .into_iter()
        .map(|contour| {
            let start = contour.points[0];
            let label = labels.get_pixel(start.x as u32, start.y as u32)[0] as usize;
            let m = moments.get(label).copied().unwrap_or_default();
            Region {
                boundary: contour.points,
                pixel_count: m.count,
                sum_x: m.sum_x,
                sum_y: m.sum_y,
            }
        })
        .collect()
}
