//! Camera input module.

mod capture;
mod frame;
mod rig;

pub use capture::OpenCvCamera;
pub use frame::{fit_to_resolution, to_grayscale, Frame, FramePair, ImageSize};
pub use rig::{FrameSource, StereoRig};
