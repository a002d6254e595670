//! Stereo Localization
//!
//! Captures one stereo pair and reports the 3D position of the nearest object.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stereo_locator::calibration::CalibrationRecord;
use stereo_locator::camera::{OpenCvCamera, StereoRig};
use stereo_locator::config::StereoConfig;
use stereo_locator::pipeline::run_localization;
use stereo_locator::stereo::{OpenCvRectifier, OpenCvSgbm};
use stereo_locator::ui::{HeadlessWindow, HighGuiWindow, ResultWindow};

#[derive(Parser, Debug)]
#[command(name = "stereo-localize", about = "Locate the nearest object with a calibrated stereo rig")]
struct Args {
    /// JSON configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calibration file written by stereo-calibrate.
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Print the result without opening any window.
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => StereoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StereoConfig::default(),
    };
    if let Some(path) = args.calibration {
        config.calibration_file = path;
    }
    if args.headless {
        config.display.enabled = false;
    }
    config.validate()?;

    let record = CalibrationRecord::load(&config.calibration_file)?;

    let left = OpenCvCamera::open(config.cameras.left_id)?;
    let right = OpenCvCamera::open(config.cameras.right_id)?;
    let rig = StereoRig::new(left, right);

    let rectifier = OpenCvRectifier::from_record(&record)?;
    let matcher = OpenCvSgbm::new(&config.matcher)?;
    let mut window: Box<dyn ResultWindow> = if config.display.enabled {
        Box::new(HighGuiWindow::new())
    } else {
        Box::new(HeadlessWindow)
    };

    let report = run_localization(&config, &record, rig, &rectifier, &matcher, window.as_mut())?;

    match report.object {
        Some(object) => println!("Object 3D location: {}", object),
        None => println!("No object found above the disparity threshold"),
    }
    Ok(())
}
