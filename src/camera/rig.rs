//! Two-camera rig with guaranteed release.

use super::frame::{Frame, FramePair};

/// A source of colour frames, typically a live camera.
pub trait FrameSource {
    /// Block until the next frame is available. `None` means the pull failed.
    fn read(&mut self) -> Option<Frame>;

    /// Release the underlying device. Must be idempotent.
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read(&mut self) -> Option<Frame> {
        (**self).read()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Left and right frame sources owned by one pipeline run.
///
/// Both sources are released by [`StereoRig::release`] or, failing that,
/// when the rig is dropped.
pub struct StereoRig<L: FrameSource, R: FrameSource> {
    left: L,
    right: R,
    released: bool,
}

impl<L: FrameSource, R: FrameSource> StereoRig<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            released: false,
        }
    }

    /// Pull one frame from each source. Fails if either pull fails.
    pub fn read_pair(&mut self) -> Option<FramePair> {
        if self.released {
            return None;
        }
        let left = self.left.read();
        let right = self.right.read();
        match (left, right) {
            (Some(left), Some(right)) => Some(FramePair::new(left, right)),
            _ => None,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release both sources.
    pub fn release(&mut self) {
        if !self.released {
            self.left.release();
            self.right.release();
            self.released = true;
            log::info!("Cameras released");
        }
    }
}

impl<L: FrameSource, R: FrameSource> Drop for StereoRig<L, R> {
    fn drop(&mut self) {
        self.release();
    }
}
