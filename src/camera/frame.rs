//! Frame types and the pre-rectification image operations.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// A colour camera frame.
pub type Frame = RgbImage;

/// Image resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of an image buffer.
    pub fn of<P: image::Pixel, C: std::ops::Deref<Target = [P::Subpixel]>>(
        image: &image::ImageBuffer<P, C>,
    ) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Half resolution, rounded down.
    pub fn half(&self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One synchronized frame from each camera.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub left: Frame,
    pub right: Frame,
}

impl FramePair {
    pub fn new(left: Frame, right: Frame) -> Self {
        Self { left, right }
    }

    /// Resample both frames to `size` with linear interpolation.
    ///
    /// Frames already at `size` are passed through untouched.
    pub fn fit_to(self, size: ImageSize) -> Self {
        Self {
            left: fit_to_resolution(self.left, size),
            right: fit_to_resolution(self.right, size),
        }
    }

    /// Grayscale copies of both frames.
    pub fn to_grayscale(&self) -> (GrayImage, GrayImage) {
        (to_grayscale(&self.left), to_grayscale(&self.right))
    }
}

/// Resample a frame to `size`, or return it unchanged if it already matches.
pub fn fit_to_resolution(frame: Frame, size: ImageSize) -> Frame {
    if ImageSize::of(&frame) == size {
        return frame;
    }
    log::debug!("Resizing frame from {} to {}", ImageSize::of(&frame), size);
    imageops::resize(&frame, size.width, size.height, FilterType::Triangle)
}

/// Luma conversion of a colour frame.
pub fn to_grayscale(frame: &Frame) -> GrayImage {
    imageops::grayscale(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> Frame {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_fit_to_resamples_both_frames() {
        let pair = FramePair::new(gradient(1280, 720), gradient(1280, 720));
        let target = ImageSize::new(640, 480);
        let fitted = pair.fit_to(target);
        assert_eq!(ImageSize::of(&fitted.left), target);
        assert_eq!(ImageSize::of(&fitted.right), target);
    }

    #[test]
    fn test_fit_to_matching_size_is_identity() {
        let left = gradient(64, 48);
        let right = gradient(64, 48);
        let pair = FramePair::new(left.clone(), right.clone());
        let fitted = pair.fit_to(ImageSize::new(64, 48));
        assert_eq!(fitted.left.as_raw(), left.as_raw());
        assert_eq!(fitted.right.as_raw(), right.as_raw());
    }

    #[test]
    fn test_grayscale_keeps_dimensions() {
        let pair = FramePair::new(gradient(32, 16), gradient(32, 16));
        let (left, right) = pair.to_grayscale();
        assert_eq!(left.dimensions(), (32, 16));
        assert_eq!(right.dimensions(), (32, 16));
    }

    #[test]
    fn test_half_size() {
        assert_eq!(ImageSize::new(641, 480).half(), ImageSize::new(320, 240));
    }
}
