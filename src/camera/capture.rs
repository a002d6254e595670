//! Live camera capture through OpenCV's video I/O.

#[cfg(feature = "opencv")]
mod opencv_impl {
    use crate::camera::{Frame, FrameSource};
    use crate::cv;
    use crate::error::{Error, Result};
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio;

    /// A camera opened by device index.
    pub struct OpenCvCamera {
        id: i32,
        capture: videoio::VideoCapture,
        released: bool,
    }

    impl OpenCvCamera {
        /// Open camera `id`. Fails if the device cannot be opened.
        pub fn open(id: i32) -> Result<Self> {
            let capture = videoio::VideoCapture::new(id, videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                return Err(Error::CameraUnavailable { id });
            }
            log::info!("Opened camera {}", id);
            Ok(Self {
                id,
                capture,
                released: false,
            })
        }

        pub fn id(&self) -> i32 {
            self.id
        }
    }

    impl FrameSource for OpenCvCamera {
        fn read(&mut self) -> Option<Frame> {
            if self.released {
                return None;
            }
            let mut mat = Mat::default();
            match self.capture.read(&mut mat) {
                Ok(true) if !mat.empty() => match cv::mat_to_rgb(&mat) {
                    Ok(frame) => Some(frame),
                    Err(e) => {
                        log::warn!("Camera {}: unusable frame: {}", self.id, e);
                        None
                    }
                },
                Ok(_) => {
                    log::warn!("Camera {}: no frame", self.id);
                    None
                }
                Err(e) => {
                    log::warn!("Camera {}: read failed: {}", self.id, e);
                    None
                }
            }
        }

        fn release(&mut self) {
            if self.released {
                return;
            }
            if let Err(e) = self.capture.release() {
                log::warn!("Camera {}: release failed: {}", self.id, e);
            }
            self.released = true;
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            self.release();
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_impl::OpenCvCamera;

#[cfg(not(feature = "opencv"))]
pub struct OpenCvCamera;

#[cfg(not(feature = "opencv"))]
impl OpenCvCamera {
    pub fn open(_id: i32) -> crate::error::Result<Self> {
        Err(crate::error::Error::BackendDisabled)
    }
}

#[cfg(not(feature = "opencv"))]
impl super::FrameSource for OpenCvCamera {
    fn read(&mut self) -> Option<super::Frame> {
        None
    }
}
