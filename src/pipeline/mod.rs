//! The two end-to-end pipelines behind the command line tools.

mod calibrate;
mod localize;

pub use calibrate::{run_calibration, CalibrationRun};
pub use localize::{run_localization, LocalizationReport};
