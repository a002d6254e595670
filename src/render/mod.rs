//! Result mosaics for on-screen display.

use crate::camera::{FramePair, ImageSize};
use crate::stereo::RectifiedPair;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

/// Place `left` and `right` next to each other. The shorter one is padded with black.
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
    let height = left.height().max(right.height());
    let mut out = RgbImage::new(left.width() + right.width(), height);
    imageops::replace(&mut out, left, 0, 0);
    imageops::replace(&mut out, right, left.width() as i64, 0);
    out
}

/// 2x2 mosaic at half `size` per tile: original frames on top, rectified
/// views (promoted to colour) below.
pub fn stereo_grid(originals: &FramePair, rectified: &RectifiedPair, size: ImageSize) -> RgbImage {
    let tile = size.half();
    let shrink = |image: &RgbImage| {
        imageops::resize(image, tile.width, tile.height, FilterType::Triangle)
    };
    let promote = |gray: &image::GrayImage| DynamicImage::ImageLuma8(gray.clone()).to_rgb8();

    let top = side_by_side(&shrink(&originals.left), &shrink(&originals.right));
    let bottom = side_by_side(
        &shrink(&promote(&rectified.left)),
        &shrink(&promote(&rectified.right)),
    );

    let mut grid = RgbImage::new(top.width().max(bottom.width()), top.height() + bottom.height());
    imageops::replace(&mut grid, &top, 0, 0);
    imageops::replace(&mut grid, &bottom, 0, top.height() as i64);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    #[test]
    fn test_side_by_side_pads_shorter() {
        let left = RgbImage::from_pixel(4, 3, Rgb([255, 0, 0]));
        let right = RgbImage::from_pixel(2, 5, Rgb([0, 0, 255]));
        let out = side_by_side(&left, &right);
        assert_eq!(out.dimensions(), (6, 5));
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(0, 4), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(5, 4), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_grid_layout() {
        let size = ImageSize::new(64, 48);
        let originals = FramePair::new(
            RgbImage::from_pixel(64, 48, Rgb([200, 10, 10])),
            RgbImage::from_pixel(64, 48, Rgb([10, 200, 10])),
        );
        let rectified = RectifiedPair {
            left: GrayImage::from_pixel(64, 48, Luma([30])),
            right: GrayImage::from_pixel(64, 48, Luma([220])),
        };
        let grid = stereo_grid(&originals, &rectified, size);
        assert_eq!(grid.dimensions(), (64, 48));
        assert_eq!(grid.get_pixel(5, 5), &Rgb([200, 10, 10]));
        assert_eq!(grid.get_pixel(40, 5), &Rgb([10, 200, 10]));
        assert_eq!(grid.get_pixel(5, 30), &Rgb([30, 30, 30]));
        assert_eq!(grid.get_pixel(40, 30), &Rgb([220, 220, 220]));
    }
}
