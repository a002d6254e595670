//! Export module for accepted calibration frames.

use crate::camera::FramePair;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Directory of raw frames kept for audit. Nothing reads them back.
#[derive(Debug, Clone)]
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    /// Use `dir`, creating it if absent.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File paths for the pair with zero-based `index`.
    pub fn pair_paths(&self, index: usize) -> (PathBuf, PathBuf) {
        (
            self.dir.join(format!("left{:02}.jpg", index)),
            self.dir.join(format!("right{:02}.jpg", index)),
        )
    }

    /// Write both unannotated frames of an accepted pair.
    pub fn save_pair(&self, index: usize, pair: &FramePair) -> Result<(PathBuf, PathBuf)> {
        let (left_path, right_path) = self.pair_paths(index);
        pair.left.save(&left_path)?;
        pair.right.save(&right_path)?;
        log::debug!(
            "Saved {} and {}",
            left_path.display(),
            right_path.display()
        );
        Ok((left_path, right_path))
    }
}
