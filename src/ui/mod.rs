//! Operator-facing windows and key commands.

mod highgui;

pub use highgui::{HighGuiWindow, DISPARITY_WINDOW, GRID_WINDOW, PREVIEW_WINDOW};

use crate::calibration::CalibrationPattern;
use crate::camera::FramePair;
use crate::error::Result;
use crate::localize::ObjectLocalization;
use glam::Vec2;
use image::{GrayImage, RgbImage};

const KEY_ESC: i32 = 27;
const KEY_SPACE: i32 = 32;

/// Operator command during capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Keep the current pair if both views show the board.
    Accept,
    /// End capture now.
    Terminate,
}

impl OperatorCommand {
    /// Map a raw key code (negative when no key was pressed).
    pub fn from_key(code: i32) -> Option<Self> {
        if code < 0 {
            return None;
        }
        match code & 0xFF {
            KEY_ESC => Some(OperatorCommand::Terminate),
            KEY_SPACE => Some(OperatorCommand::Accept),
            _ => None,
        }
    }
}

/// Live preview shown during capture.
pub trait PreviewWindow {
    /// Show both frames with any detected corners drawn on them.
    fn show_detections(
        &mut self,
        pair: &FramePair,
        pattern: &CalibrationPattern,
        left: Option<&[Vec2]>,
        right: Option<&[Vec2]>,
    ) -> Result<()>;

    /// Wait up to `delay_ms` for a key.
    fn poll_command(&mut self, delay_ms: i32) -> Result<Option<OperatorCommand>>;

    fn close(&mut self) -> Result<()>;
}

/// Final localization display.
pub trait ResultWindow {
    /// Show the mosaic and the disparity visualization, annotated with the
    /// localization if there is one, and block until the operator dismisses them.
    fn show_results(
        &mut self,
        grid: &RgbImage,
        disparity: &GrayImage,
        localization: Option<&ObjectLocalization>,
        marker_radius: i32,
    ) -> Result<()>;
}

/// Result window that displays nothing.
#[derive(Debug, Default)]
pub struct HeadlessWindow;

impl ResultWindow for HeadlessWindow {
    fn show_results(
        &mut self,
        _grid: &RgbImage,
        _disparity: &GrayImage,
        _localization: Option<&ObjectLocalization>,
        _marker_radius: i32,
    ) -> Result<()> {
        Ok(())
    }
}
