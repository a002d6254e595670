//! Configuration and serialization module.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration shared by both tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Camera device identifiers.
    pub cameras: CameraConfig,
    /// Chessboard geometry.
    pub pattern: PatternConfig,
    /// Interactive capture settings.
    pub capture: CaptureConfig,
    /// Where the calibration record is written and read.
    pub calibration_file: PathBuf,
    /// Semi-global block matching parameters.
    pub matcher: MatcherConfig,
    /// Disparity blob search settings.
    pub localization: LocalizationConfig,
    /// On-screen display settings.
    pub display: DisplayConfig,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            cameras: CameraConfig::default(),
            pattern: PatternConfig::default(),
            capture: CaptureConfig::default(),
            calibration_file: PathBuf::from("stereo_calibration.bin"),
            matcher: MatcherConfig::default(),
            localization: LocalizationConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl StereoConfig {
    /// Load a JSON configuration. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StereoConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let capture = &self.capture;
        if capture.min_pairs == 0 {
            return Err(Error::Config("capture.min_pairs must be at least 1".into()));
        }
        if capture.min_pairs > capture.max_pairs {
            return Err(Error::Config(format!(
                "capture.min_pairs ({}) exceeds capture.max_pairs ({})",
                capture.min_pairs, capture.max_pairs
            )));
        }
        if self.pattern.columns < 2 || self.pattern.rows < 2 {
            return Err(Error::Config(format!(
                "pattern must have at least 2x2 inner corners, got {}x{}",
                self.pattern.columns, self.pattern.rows
            )));
        }
        if !(self.pattern.square_size > 0.0) {
            return Err(Error::Config("pattern.square_size must be positive".into()));
        }
        let m = &self.matcher;
        if m.num_disparities <= 0 || m.num_disparities % 16 != 0 {
            return Err(Error::Config(format!(
                "matcher.num_disparities must be a positive multiple of 16, got {}",
                m.num_disparities
            )));
        }
        if m.block_size < 1 || m.block_size % 2 == 0 {
            return Err(Error::Config(format!(
                "matcher.block_size must be odd and positive, got {}",
                m.block_size
            )));
        }
        Ok(())
    }
}

/// Camera device identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Left camera index.
    pub left_id: i32,
    /// Right camera index.
    pub right_id: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            left_id: 1,
            right_id: 2,
        }
    }
}

/// Chessboard geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Inner corners per row.
    pub columns: u32,
    /// Inner corners per column.
    pub rows: u32,
    /// Square edge length in meters.
    pub square_size: f32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 13,
            square_size: 0.02,
        }
    }
}

/// Convergence criterion for iterative refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermCriteria {
    /// Iteration cap.
    pub max_iterations: i32,
    /// Minimum improvement before stopping.
    pub epsilon: f64,
}

impl Default for TermCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            epsilon: 0.001,
        }
    }
}

/// Interactive capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory for accepted raw frames.
    pub save_dir: PathBuf,
    /// Capture stops automatically at this many accepted pairs.
    pub max_pairs: usize,
    /// Calibration refuses to run with fewer accepted pairs.
    pub min_pairs: usize,
    /// Key poll delay per iteration.
    pub poll_delay_ms: i32,
    /// Sub-pixel search half-window.
    pub subpix_window: i32,
    /// Corner refinement and stereo solver criterion.
    pub criteria: TermCriteria,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("calib_images"),
            max_pairs: 10,
            min_pairs: 5,
            poll_delay_ms: 1,
            subpix_window: 11,
            criteria: TermCriteria::default(),
        }
    }
}

/// Semi-global block matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatcherMode {
    Sgbm,
    Hh,
    Sgbm3Way,
    Hh4,
}

impl Default for MatcherMode {
    fn default() -> Self {
        MatcherMode::Sgbm3Way
    }
}

/// Semi-global block matching parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub min_disparity: i32,
    /// Search range, multiple of 16.
    pub num_disparities: i32,
    /// Odd matching block size.
    pub block_size: i32,
    /// Penalty for disparity changes of one between neighbours.
    pub p1: i32,
    /// Penalty for larger disparity changes.
    pub p2: i32,
    pub disp12_max_diff: i32,
    pub pre_filter_cap: i32,
    pub uniqueness_ratio: i32,
    pub speckle_window_size: i32,
    pub speckle_range: i32,
    pub mode: MatcherMode,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        let block_size = 9;
        Self {
            min_disparity: 0,
            num_disparities: 128,
            block_size,
            p1: 8 * 3 * block_size * block_size,
            p2: 32 * 3 * block_size * block_size,
            disp12_max_diff: 1,
            pre_filter_cap: 31,
            uniqueness_ratio: 10,
            speckle_window_size: 100,
            speckle_range: 2,
            mode: MatcherMode::default(),
        }
    }
}

/// Disparity blob search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Cutoff on the 8-bit normalized disparity. Pixels strictly above are foreground.
    pub threshold: u8,
    /// Centroid marker radius in pixels.
    pub marker_radius: i32,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            threshold: 64,
            marker_radius: 5,
        }
    }
}

/// On-screen display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show result windows after localization.
    pub enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
