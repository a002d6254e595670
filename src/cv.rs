//! Conversions between `image` buffers, plain arrays and OpenCV matrices.

use crate::error::{Error, Result};
use glam::{Vec2, Vec3};
use image::{GrayImage, RgbImage};
use opencv::core::{self, Mat, Point2f, Point3f, Vector};
use opencv::prelude::*;

/// Colour frame to a BGR `CV_8UC3` matrix.
pub(crate) fn rgb_to_mat(image: &RgbImage) -> Result<Mat> {
    let mut bgr = image.as_raw().clone();
    for px in bgr.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    let flat = Mat::from_slice(bgr.as_slice())?;
    Ok(flat.reshape(3, image.height() as i32)?.clone_pointee())
}

/// Grayscale frame to a `CV_8UC1` matrix.
pub(crate) fn gray_to_mat(image: &GrayImage) -> Result<Mat> {
    let flat = Mat::from_slice(image.as_raw().as_slice())?;
    Ok(flat.reshape(1, image.height() as i32)?.clone_pointee())
}

// Deep copies are always continuous.
fn continuous(mat: &Mat) -> Result<Mat> {
    Ok(mat.try_clone()?)
}

/// BGR `CV_8UC3` matrix to a colour frame.
pub(crate) fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let mat = continuous(mat)?;
    let mut data = mat.data_bytes()?.to_vec();
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    RgbImage::from_raw(mat.cols() as u32, mat.rows() as u32, data)
        .ok_or_else(|| Error::OpenCv(format!("unexpected frame layout: {:?}", mat.typ())))
}

/// `CV_8UC1` matrix to a grayscale frame.
pub(crate) fn mat_to_gray(mat: &Mat) -> Result<GrayImage> {
    let mat = continuous(mat)?;
    let data = mat.data_bytes()?.to_vec();
    GrayImage::from_raw(mat.cols() as u32, mat.rows() as u32, data)
        .ok_or_else(|| Error::OpenCv(format!("unexpected frame layout: {:?}", mat.typ())))
}

/// `CV_16SC1` matrix to a flat row-major buffer.
pub(crate) fn mat_to_i16(mat: &Mat) -> Result<Vec<i16>> {
    let mat = continuous(mat)?;
    Ok(mat.data_typed::<i16>()?.to_vec())
}

/// `CV_64F` 3x3 matrix to a row-major array.
pub(crate) fn mat_to_3x3(mat: &Mat) -> Result<[[f64; 3]; 3]> {
    if mat.rows() != 3 || mat.cols() != 3 {
        return Err(Error::OpenCv(format!(
            "Invalid matrix size: {}x{}",
            mat.rows(),
            mat.cols()
        )));
    }
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = *mat.at_2d::<f64>(r as i32, c as i32)?;
        }
    }
    Ok(out)
}

/// `CV_64F` 4x4 matrix to a row-major array.
pub(crate) fn mat_to_4x4(mat: &Mat) -> Result<[[f64; 4]; 4]> {
    if mat.rows() != 4 || mat.cols() != 4 {
        return Err(Error::OpenCv(format!(
            "Invalid matrix size: {}x{}",
            mat.rows(),
            mat.cols()
        )));
    }
    let mut out = [[0.0; 4]; 4];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = *mat.at_2d::<f64>(r as i32, c as i32)?;
        }
    }
    Ok(out)
}

/// Any single-row or single-column `CV_64F` matrix to a vector.
pub(crate) fn mat_to_vec(mat: &Mat) -> Result<Vec<f64>> {
    let total = (mat.rows() * mat.cols()) as usize;
    let mut out = Vec::with_capacity(total);
    for i in 0..total {
        out.push(*mat.at::<f64>(i as i32)?);
    }
    Ok(out)
}

pub(crate) fn mat_from_3x3(m: &[[f64; 3]; 3]) -> Result<Mat> {
    Ok(Mat::from_slice_2d(m)?)
}

/// Column vector from a slice.
pub(crate) fn mat_from_column(values: &[f64]) -> Result<Mat> {
    let flat = Mat::from_slice(values)?;
    Ok(flat.reshape(1, values.len() as i32)?.clone_pointee())
}

pub(crate) fn points2_to_vector(points: &[Vec2]) -> Vector<Point2f> {
    points.iter().map(|p| Point2f::new(p.x, p.y)).collect()
}

pub(crate) fn points3_to_vector(points: &[Vec3]) -> Vector<Point3f> {
    points.iter().map(|p| Point3f::new(p.x, p.y, p.z)).collect()
}

pub(crate) fn vector_to_points2(points: &Vector<Point2f>) -> Vec<Vec2> {
    points.iter().map(|p| Vec2::new(p.x, p.y)).collect()
}

pub(crate) fn size_of(size: crate::camera::ImageSize) -> core::Size {
    core::Size::new(size.width as i32, size.height as i32)
}

/// Iteration-or-epsilon criterion.
pub(crate) fn term_criteria(criteria: &crate::config::TermCriteria) -> Result<core::TermCriteria> {
    Ok(core::TermCriteria::new(
        core::TermCriteria_COUNT | core::TermCriteria_EPS,
        criteria.max_iterations,
        criteria.epsilon,
    )?)
}
