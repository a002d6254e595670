//! OpenCV backends against rendered scenes with known geometry.

#![cfg(feature = "opencv")]

mod common;

use approx::assert_relative_eq;
use common::*;
use glam::{DMat3, DVec3};
use image::{GrayImage, Luma, Rgb, RgbImage};
use stereo_locator::calibration::{
    CalibrationPattern, CaptureState, OpenCvChessboardDetector, OpenCvStereoSolver,
};
use stereo_locator::camera::{ImageSize, StereoRig};
use stereo_locator::config::{MatcherConfig, StereoConfig};
use stereo_locator::pipeline::run_calibration;
use stereo_locator::stereo::{
    reproject_pixel, DisparityMap, DisparityMatcher, OpenCvRectifier, OpenCvSgbm, Rectifier,
};

const W: u32 = 640;
const H: u32 = 480;
const F: f64 = 800.0;
const SQUARE: f64 = 0.03;
const COLUMNS: u32 = 9;
const ROWS: u32 = 6;
const RIG_BASELINE: f64 = 0.1;

fn camera() -> DMat3 {
    DMat3::from_cols(
        DVec3::new(F, 0.0, 0.0),
        DVec3::new(0.0, F, 0.0),
        DVec3::new(W as f64 / 2.0, H as f64 / 2.0, 1.0),
    )
}

/// Render the board seen by a pinhole camera. `rotation` and `origin` place
/// the first inner corner in the camera frame.
fn render_board(rotation: DMat3, origin: DVec3) -> RgbImage {
    let homography = camera() * DMat3::from_cols(rotation.x_axis, rotation.y_axis, origin);
    let inverse = homography.inverse();
    let (x_max, y_max) = (COLUMNS as f64 * SQUARE, ROWS as f64 * SQUARE);
    const SS: u32 = 3;

    RgbImage::from_fn(W, H, |u, v| {
        let mut white = 0u32;
        for sy in 0..SS {
            for sx in 0..SS {
                let px = u as f64 + (sx as f64 + 0.5) / SS as f64 - 0.5;
                let py = v as f64 + (sy as f64 + 0.5) / SS as f64 - 0.5;
                let b = inverse * DVec3::new(px, py, 1.0);
                let (x, y) = (b.x / b.z, b.y / b.z);
                let on_board = x >= -SQUARE && x < x_max && y >= -SQUARE && y < y_max;
                let dark = on_board
                    && ((x / SQUARE).floor() as i64 + (y / SQUARE).floor() as i64) % 2 == 0;
                if !dark {
                    white += 1;
                }
            }
        }
        let level = (white * 255 / (SS * SS)) as u8;
        Rgb([level, level, level])
    })
}

/// Board poses as (rx, ry, centre).
fn poses() -> Vec<(f64, f64, DVec3)> {
    vec![
        (0.0, 0.0, DVec3::new(0.05, 0.0, 0.8)),
        (0.3, 0.0, DVec3::new(0.05, 0.02, 0.85)),
        (-0.3, 0.0, DVec3::new(0.05, -0.02, 0.85)),
        (0.0, 0.3, DVec3::new(0.05, 0.0, 0.85)),
        (0.0, -0.3, DVec3::new(0.05, 0.0, 0.85)),
    ]
}

#[test]
fn test_calibration_recovers_synthetic_rig() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StereoConfig::default();
    config.pattern.columns = COLUMNS;
    config.pattern.rows = ROWS;
    config.pattern.square_size = SQUARE as f32;
    config.capture.subpix_window = 5;
    config.capture.save_dir = dir.path().join("frames");
    config.calibration_file = dir.path().join("rig.bin");

    let half_extent = DVec3::new(
        (COLUMNS - 1) as f64 * SQUARE / 2.0,
        (ROWS - 1) as f64 * SQUARE / 2.0,
        0.0,
    );
    let baseline = DVec3::new(-RIG_BASELINE, 0.0, 0.0);
    let (mut lefts, mut rights) = (Vec::new(), Vec::new());
    for (rx, ry, centre) in poses() {
        let rotation = DMat3::from_rotation_x(rx) * DMat3::from_rotation_y(ry);
        let origin = centre - rotation * half_extent;
        lefts.push(render_board(rotation, origin));
        rights.push(render_board(rotation, origin + baseline));
    }
    let views = lefts.len();
    // The terminate key is read with one more frame on screen.
    lefts.push(lefts[0].clone());
    rights.push(rights[0].clone());
    let (left, _) = ScriptedSource::new(lefts);
    let (right, _) = ScriptedSource::new(rights);

    let detector =
        OpenCvChessboardDetector::new(CalibrationPattern::from(config.pattern), &config.capture);
    let solver = OpenCvStereoSolver::new(config.capture.criteria);
    let mut window = ScriptedWindow::accept_then_quit(views);

    let run = run_calibration(
        &config,
        StereoRig::new(left, right),
        &detector,
        &mut window,
        &solver,
    )
    .unwrap();

    assert_eq!(run.pairs, 5);
    assert_eq!(run.stopped, CaptureState::Terminated);
    for mtx in [run.record.mtx_left, run.record.mtx_right] {
        assert_relative_eq!(mtx[0][0], F, max_relative = 0.05);
        assert_relative_eq!(mtx[1][1], F, max_relative = 0.05);
        assert_relative_eq!(mtx[0][2], W as f64 / 2.0, epsilon = 20.0);
        assert_relative_eq!(mtx[1][2], H as f64 / 2.0, epsilon = 20.0);
    }
    let t = run.record.translation;
    let length = (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt();
    assert_relative_eq!(length, RIG_BASELINE, max_relative = 0.05);
    assert!(t[0].abs() > t[1].abs() && t[0].abs() > t[2].abs());
}

#[test]
fn test_rectifier_on_parallel_rig_gives_depth() {
    let size = ImageSize::new(W, H);
    let mut record = ideal_record(size);
    record.mtx_left = [[F, 0.0, W as f64 / 2.0], [0.0, F, H as f64 / 2.0], [0.0, 0.0, 1.0]];
    record.mtx_right = record.mtx_left;
    record.translation = [-RIG_BASELINE, 0.0, 0.0];

    let rectifier = OpenCvRectifier::from_record(&record).unwrap();
    let q = rectifier.reprojection_matrix();
    assert_relative_eq!(q[2][3], F, max_relative = 0.01);

    // Z = f * B / d
    let point = reproject_pixel(&q, W as f64 / 2.0, H as f64 / 2.0, 100.0);
    assert_relative_eq!(point.z as f64, F * RIG_BASELINE / 100.0, max_relative = 0.02);

    let gray = GrayImage::from_fn(W, H, |x, _| Luma([(x % 256) as u8]));
    let rectified = rectifier.rectify(&gray, &gray).unwrap();
    assert_eq!(rectified.left.dimensions(), (W, H));
    assert!(rectifier.rectify(&GrayImage::new(W / 2, H / 2), &gray).is_err());
}

#[test]
fn test_sgbm_finds_uniform_shift() {
    const SHIFT: u32 = 16;
    let (w, h) = (320u32, 240u32);
    // Blocky pseudo-random texture.
    let texture = |x: u32, y: u32| {
        let cell = (x / 4).wrapping_mul(73_856_093) ^ (y / 4).wrapping_mul(19_349_663);
        let mixed = cell.wrapping_mul(2_654_435_761);
        Luma([(mixed >> 24) as u8])
    };
    let left = GrayImage::from_fn(w, h, |x, y| texture(x + 64, y));
    let right = GrayImage::from_fn(w, h, |x, y| texture(x + 64 + SHIFT, y));

    let matcher = OpenCvSgbm::new(&MatcherConfig::default()).unwrap();
    let disparity = DisparityMap::from_fixed_point(&matcher.compute(&left, &right).unwrap());
    assert_eq!((disparity.width, disparity.height), (w, h));

    let mut values: Vec<f32> = (100..140)
        .flat_map(|y| (180..300).map(move |x| (x, y)))
        .map(|(x, y)| disparity.get(x, y))
        .filter(|d| *d > 0.0)
        .collect();
    assert!(values.len() > 1000);
    values.sort_by(|a, b| a.total_cmp(b));
    let median = values[values.len() / 2];
    assert_relative_eq!(median, SHIFT as f32, epsilon = 1.0);
}
