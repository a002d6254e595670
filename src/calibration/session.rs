//! Interactive capture session state machine and loop.

use super::detector::PatternDetector;
use super::pattern::CalibrationPattern;
use super::solver::Side;
use crate::camera::{FrameSource, ImageSize, StereoRig};
use crate::config::CaptureConfig;
use crate::error::Result;
use crate::export::FrameStore;
use crate::ui::{OperatorCommand, PreviewWindow};
use glam::{Vec2, Vec3};

/// One accepted observation of the board seen by both cameras.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrespondenceSample {
    /// Board-plane template shared by every sample of a run.
    pub object_points: Vec<Vec3>,
    /// Refined corners in the left image.
    pub left: Vec<Vec2>,
    /// Refined corners in the right image.
    pub right: Vec<Vec2>,
}

impl CorrespondenceSample {
    pub fn corners(&self, side: Side) -> &[Vec2] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// State of the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Pulling frames and waiting for operator input.
    Collecting,
    /// Operator ended the session.
    Terminated,
    /// The configured number of pairs was accepted.
    MaxReached,
    /// A camera stopped delivering frames.
    SourceExhausted,
}

impl CaptureState {
    pub fn is_collecting(&self) -> bool {
        matches!(self, CaptureState::Collecting)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Collecting => write!(f, "Collecting"),
            CaptureState::Terminated => write!(f, "Terminated"),
            CaptureState::MaxReached => write!(f, "Max Reached"),
            CaptureState::SourceExhausted => write!(f, "Source Exhausted"),
        }
    }
}

/// Accumulates accepted samples until the session ends.
#[derive(Debug)]
pub struct CaptureSession {
    template: Vec<Vec3>,
    max_pairs: usize,
    samples: Vec<CorrespondenceSample>,
    image_size: Option<ImageSize>,
    state: CaptureState,
}

impl CaptureSession {
    pub fn new(pattern: &CalibrationPattern, max_pairs: usize) -> Self {
        let state = if max_pairs == 0 {
            CaptureState::MaxReached
        } else {
            CaptureState::Collecting
        };
        Self {
            template: pattern.object_points(),
            max_pairs,
            samples: Vec::with_capacity(max_pairs),
            image_size: None,
            state,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn accepted(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[CorrespondenceSample] {
        &self.samples
    }

    /// Size of the most recently accepted frames.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    /// Record a pair detected in both views. Returns the zero-based index of
    /// the new sample, or `None` once the session has ended.
    pub fn accept(&mut self, left: Vec<Vec2>, right: Vec<Vec2>, image_size: ImageSize) -> Option<usize> {
        if !self.state.is_collecting() {
            return None;
        }
        let index = self.samples.len();
        self.samples.push(CorrespondenceSample {
            object_points: self.template.clone(),
            left,
            right,
        });
        self.image_size = Some(image_size);
        if self.samples.len() >= self.max_pairs {
            self.state = CaptureState::MaxReached;
        }
        Some(index)
    }

    pub fn terminate(&mut self) {
        if self.state.is_collecting() {
            self.state = CaptureState::Terminated;
        }
    }

    pub fn source_exhausted(&mut self) {
        if self.state.is_collecting() {
            self.state = CaptureState::SourceExhausted;
        }
    }

    pub fn finish(self) -> CaptureOutcome {
        CaptureOutcome {
            samples: self.samples,
            image_size: self.image_size,
            state: self.state,
        }
    }
}

/// What the capture loop hands to calibration.
#[derive(Debug)]
pub struct CaptureOutcome {
    pub samples: Vec<CorrespondenceSample>,
    pub image_size: Option<ImageSize>,
    /// How the session ended.
    pub state: CaptureState,
}

/// Drive the rig until the operator terminates, the maximum is reached or a
/// camera fails. The rig is released on every path out of this function.
pub fn run_capture<L, R, D, W>(
    mut rig: StereoRig<L, R>,
    detector: &D,
    window: &mut W,
    store: &FrameStore,
    pattern: &CalibrationPattern,
    config: &CaptureConfig,
) -> Result<CaptureOutcome>
where
    L: FrameSource,
    R: FrameSource,
    D: PatternDetector + ?Sized,
    W: PreviewWindow + ?Sized,
{
    let mut session = CaptureSession::new(pattern, config.max_pairs);
    log::info!("Press SPACE to capture a pair, ESC to finish");

    let looped = capture_loop(&mut session, &mut rig, detector, window, store, pattern, config);
    rig.release();
    let closed = window.close();
    looped?;
    closed?;

    let outcome = session.finish();
    log::info!(
        "Capture finished ({}), {} pairs accepted",
        outcome.state,
        outcome.samples.len()
    );
    Ok(outcome)
}

/// Interactive part of [`run_capture`]. Cleanup is left to the caller.
fn capture_loop<L, R, D, W>(
    session: &mut CaptureSession,
    rig: &mut StereoRig<L, R>,
    detector: &D,
    window: &mut W,
    store: &FrameStore,
    pattern: &CalibrationPattern,
    config: &CaptureConfig,
) -> Result<()>
where
    L: FrameSource,
    R: FrameSource,
    D: PatternDetector + ?Sized,
    W: PreviewWindow + ?Sized,
{
    while session.state().is_collecting() {
        let Some(pair) = rig.read_pair() else {
            log::warn!("Frame capture failed, ending capture");
            session.source_exhausted();
            break;
        };

        let (gray_left, gray_right) = pair.to_grayscale();
        let left = detector.detect(&gray_left)?;
        let right = detector.detect(&gray_right)?;

        window.show_detections(&pair, pattern, left.as_deref(), right.as_deref())?;

        match window.poll_command(config.poll_delay_ms)? {
            Some(OperatorCommand::Terminate) => session.terminate(),
            Some(OperatorCommand::Accept) => match (left, right) {
                (Some(left), Some(right)) => {
                    let size = ImageSize::of(&gray_left);
                    if let Some(index) = session.accept(left, right, size) {
                        store.save_pair(index, &pair)?;
                        log::info!("Captured pair {}", index + 1);
                    }
                    if session.state() == CaptureState::MaxReached {
                        log::info!("Reached max pairs");
                    }
                }
                _ => log::info!("Pattern not found in both views, pair not captured"),
            },
            None => {}
        }
    }
    Ok(())
}
