//! Persisted stereo calibration record.
//!
//! File layout: the `STCAL` magic, a little-endian `u16` format version, then
//! an LZ4 block (size-prepended) holding the bincode-encoded record.

use crate::camera::ImageSize;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

const MAGIC: &[u8; 5] = b"STCAL";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Everything the localizer needs from a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Left camera matrix.
    pub mtx_left: [[f64; 3]; 3],
    /// Left distortion coefficients.
    pub dist_left: Vec<f64>,
    /// Right camera matrix.
    pub mtx_right: [[f64; 3]; 3],
    /// Right distortion coefficients.
    pub dist_right: Vec<f64>,
    /// Rotation from the left to the right camera frame.
    pub rotation: [[f64; 3]; 3],
    /// Translation from the left to the right camera frame, in pattern units.
    pub translation: [f64; 3],
    pub essential: [[f64; 3]; 3],
    pub fundamental: [[f64; 3]; 3],
    /// Resolution the parameters apply to.
    pub image_size: ImageSize,
}

impl CalibrationRecord {
    /// Encode to the on-disk representation.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let encoded = bincode::serialize(self)?;
        let compressed = lz4_flex::compress_prepend_size(&encoded);

        let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&compressed);
        Ok(bytes)
    }

    /// Decode the on-disk representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(Error::InvalidCalibrationFile(
                "not a stereo calibration file".into(),
            ));
        }
        let version = u16::from_le_bytes([bytes[MAGIC.len()], bytes[MAGIC.len() + 1]]);
        if version != FORMAT_VERSION {
            return Err(Error::InvalidCalibrationFile(format!(
                "unsupported format version {}",
                version
            )));
        }

        let encoded = lz4_flex::decompress_size_prepended(&bytes[HEADER_LEN..])
            .map_err(|e| Error::InvalidCalibrationFile(e.to_string()))?;
        bincode::deserialize(&encoded).map_err(|e| Error::InvalidCalibrationFile(e.to_string()))
    }

    /// Write the record atomically: a sibling temporary file is renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp_path, path)?;

        log::info!("Saved calibration to {}", path.display());
        Ok(())
    }

    /// Load a record written by [`CalibrationRecord::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CalibrationFileMissing(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let record = Self::from_bytes(&bytes)?;
        log::info!(
            "Loaded calibration from {} ({})",
            path.display(),
            record.image_size
        );
        Ok(record)
    }

    /// Human-readable JSON copy for inspection. Never read back.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
