//! Stereo Calibration Capture
//!
//! Collects chessboard pairs from two cameras and writes the stereo calibration.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stereo_locator::calibration::{CalibrationPattern, OpenCvChessboardDetector, OpenCvStereoSolver};
use stereo_locator::camera::{OpenCvCamera, StereoRig};
use stereo_locator::config::StereoConfig;
use stereo_locator::pipeline::run_calibration;
use stereo_locator::ui::HighGuiWindow;

#[derive(Parser, Debug)]
#[command(name = "stereo-calibrate", about = "Capture chessboard pairs and calibrate a stereo rig")]
struct Args {
    /// JSON configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for accepted frames.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Calibration output file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_matrix(name: &str, rows: &[[f64; 3]]) {
    println!("{}:", name);
    for row in rows {
        println!("  [{:>12.6} {:>12.6} {:>12.6}]", row[0], row[1], row[2]);
    }
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
    if let Some(dir) = args.save_dir {
        config.capture.save_dir = dir;
    }
    if let Some(output) = args.output {
        config.calibration_file = output;
    }
    config.validate()?;

    log::info!(
        "Stereo calibration: cameras {} / {}, board {}x{}",
        config.cameras.left_id,
        config.cameras.right_id,
        config.pattern.columns,
        config.pattern.rows
    );

    let left = OpenCvCamera::open(config.cameras.left_id)?;
    let right = OpenCvCamera::open(config.cameras.right_id)?;
    let rig = StereoRig::new(left, right);

    let detector = OpenCvChessboardDetector::new(CalibrationPattern::from(config.pattern), &config.capture);
    let solver = OpenCvStereoSolver::new(config.capture.criteria);
    let mut window = HighGuiWindow::new();

    let run = run_calibration(&config, rig, &detector, &mut window, &solver)?;

    println!("Calibrated from {} pairs ({})", run.pairs, run.stopped);
    print_matrix("Rotation", &run.record.rotation);
    let t = run.record.translation;
    println!("Translation: [{:.6} {:.6} {:.6}]", t[0], t[1], t[2]);
    println!("Saved calibration to {}", config.calibration_file.display());
    Ok(())
}
