//! Scripted stand-ins for cameras, windows and solvers.

#![allow(dead_code)]

use glam::Vec2;
use image::{GrayImage, Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use stereo_locator::calibration::{
    CalibrationPattern, CalibrationRecord, CameraIntrinsics, CorrespondenceSample,
    MonoCalibration, PatternDetector, Side, StereoCalibration, StereoSolver,
};
use stereo_locator::camera::{Frame, FramePair, FrameSource, ImageSize};
use stereo_locator::config::StereoConfig;
use stereo_locator::localize::ObjectLocalization;
use stereo_locator::ui::{OperatorCommand, PreviewWindow, ResultWindow};
use stereo_locator::{Error, Result};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;

pub fn bright_frame() -> Frame {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([255, 255, 255]))
}

pub fn dark_frame() -> Frame {
    RgbImage::new(WIDTH, HEIGHT)
}

/// Plays back a fixed list of frames, then fails every read.
pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    reads: Rc<Cell<usize>>,
    releases: Rc<Cell<u32>>,
}

/// Counters shared with a [`ScriptedSource`] after it is moved into a rig.
#[derive(Clone)]
pub struct SourceCounters {
    pub reads: Rc<Cell<usize>>,
    pub releases: Rc<Cell<u32>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>) -> (Self, SourceCounters) {
        let counters = SourceCounters {
            reads: Rc::new(Cell::new(0)),
            releases: Rc::new(Cell::new(0)),
        };
        (
            Self {
                frames: frames.into(),
                reads: counters.reads.clone(),
                releases: counters.releases.clone(),
            },
            counters,
        )
    }

    pub fn repeat(frame: Frame, count: usize) -> (Self, SourceCounters) {
        Self::new(vec![frame; count])
    }
}

impl FrameSource for ScriptedSource {
    fn read(&mut self) -> Option<Frame> {
        self.reads.set(self.reads.get() + 1);
        self.frames.pop_front()
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// Preview window that answers key polls from a script.
pub struct ScriptedWindow {
    commands: VecDeque<Option<OperatorCommand>>,
    /// Answer once the script runs out.
    pub fallback: Option<OperatorCommand>,
    pub frames_shown: usize,
    pub closed: bool,
}

impl ScriptedWindow {
    pub fn new(commands: Vec<Option<OperatorCommand>>) -> Self {
        Self {
            commands: commands.into(),
            fallback: None,
            frames_shown: 0,
            closed: false,
        }
    }

    /// `accepts` presses of SPACE followed by ESC.
    pub fn accept_then_quit(accepts: usize) -> Self {
        let mut commands = vec![Some(OperatorCommand::Accept); accepts];
        commands.push(Some(OperatorCommand::Terminate));
        Self::new(commands)
    }

    pub fn always_accept() -> Self {
        let mut window = Self::new(Vec::new());
        window.fallback = Some(OperatorCommand::Accept);
        window
    }
}

impl PreviewWindow for ScriptedWindow {
    fn show_detections(
        &mut self,
        _pair: &FramePair,
        _pattern: &CalibrationPattern,
        _left: Option<&[Vec2]>,
        _right: Option<&[Vec2]>,
    ) -> Result<()> {
        self.frames_shown += 1;
        Ok(())
    }

    fn poll_command(&mut self, _delay_ms: i32) -> Result<Option<OperatorCommand>> {
        Ok(self.commands.pop_front().unwrap_or(self.fallback))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Reports the board on bright frames only.
pub struct BrightnessDetector {
    pub corners: usize,
}

impl PatternDetector for BrightnessDetector {
    fn detect(&self, gray: &GrayImage) -> Result<Option<Vec<Vec2>>> {
        if gray.get_pixel(0, 0).0[0] < 128 {
            return Ok(None);
        }
        Ok(Some(
            (0..self.corners)
                .map(|i| Vec2::new(i as f32 * 4.0, 8.0))
                .collect(),
        ))
    }
}

/// Detector whose backend always errors.
pub struct BrokenDetector;

impl PatternDetector for BrokenDetector {
    fn detect(&self, _gray: &GrayImage) -> Result<Option<Vec<Vec2>>> {
        Err(Error::OpenCv("detector backend unavailable".into()))
    }
}

pub const FOCAL: f64 = 80.0;
pub const BASELINE: f64 = 0.1;

pub fn intrinsics(size: ImageSize) -> CameraIntrinsics {
    CameraIntrinsics {
        camera_matrix: [
            [FOCAL, 0.0, size.width as f64 / 2.0],
            [0.0, FOCAL, size.height as f64 / 2.0],
            [0.0, 0.0, 1.0],
        ],
        distortion: vec![0.0; 5],
    }
}

/// Solver returning an ideal parallel rig and counting its calls.
#[derive(Default)]
pub struct RecordingSolver {
    pub mono_calls: RefCell<Vec<(Side, usize)>>,
    pub stereo_calls: Cell<usize>,
}

impl RecordingSolver {
    pub fn calls(&self) -> usize {
        self.mono_calls.borrow().len() + self.stereo_calls.get()
    }
}

impl StereoSolver for RecordingSolver {
    fn calibrate_camera(
        &self,
        samples: &[CorrespondenceSample],
        side: Side,
        image_size: ImageSize,
    ) -> Result<MonoCalibration> {
        self.mono_calls.borrow_mut().push((side, samples.len()));
        Ok(MonoCalibration {
            intrinsics: intrinsics(image_size),
            rms: 0.1,
        })
    }

    fn stereo_calibrate(
        &self,
        _samples: &[CorrespondenceSample],
        left: &CameraIntrinsics,
        right: &CameraIntrinsics,
        _image_size: ImageSize,
    ) -> Result<StereoCalibration> {
        self.stereo_calls.set(self.stereo_calls.get() + 1);
        Ok(StereoCalibration {
            left: left.clone(),
            right: right.clone(),
            rotation: identity(),
            translation: [-BASELINE, 0.0, 0.0],
            essential: [[0.0, 0.0, 0.0], [0.0, 0.0, BASELINE], [0.0, -BASELINE, 0.0]],
            fundamental: [[0.0; 3]; 3],
            rms: 0.2,
        })
    }
}

pub fn identity() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

/// Record of the ideal rig produced by [`RecordingSolver`].
pub fn ideal_record(size: ImageSize) -> CalibrationRecord {
    let camera = intrinsics(size);
    CalibrationRecord {
        mtx_left: camera.camera_matrix,
        dist_left: camera.distortion.clone(),
        mtx_right: camera.camera_matrix,
        dist_right: camera.distortion,
        rotation: identity(),
        translation: [-BASELINE, 0.0, 0.0],
        essential: [[0.0, 0.0, 0.0], [0.0, 0.0, BASELINE], [0.0, -BASELINE, 0.0]],
        fundamental: [[0.0; 3]; 3],
        image_size: size,
    }
}

/// Small-board configuration writing into `dir`.
pub fn test_config(dir: &Path) -> StereoConfig {
    let mut config = StereoConfig::default();
    config.pattern.columns = 3;
    config.pattern.rows = 2;
    config.capture.save_dir = dir.join("frames");
    config.calibration_file = dir.join("stereo_calibration.bin");
    config
}

/// Result window that keeps what it was asked to show.
#[derive(Default)]
pub struct CapturingResultWindow {
    pub shown: Option<(RgbImage, GrayImage, Option<ObjectLocalization>)>,
}

impl ResultWindow for CapturingResultWindow {
    fn show_results(
        &mut self,
        grid: &RgbImage,
        disparity: &GrayImage,
        localization: Option<&ObjectLocalization>,
        _marker_radius: i32,
    ) -> Result<()> {
        self.shown = Some((grid.clone(), disparity.clone(), localization.cloned()));
        Ok(())
    }
}
