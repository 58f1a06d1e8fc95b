//src/gaf.rs

//! Gramian Angular Field images from numeric series.
//!
//! A series is min-max scaled into `[-1, 1]`, each value is mapped to the
//! angle `phi = arccos(x)`, and the image cell `(i, j)` is `cos(phi_i + phi_j)`
//! for the summation field or `sin(phi_i - phi_j)` for the difference field.

use ndarray::Array2;

use crate::types::Image;

/// Which trigonometric combination fills the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GafMethod {
    /// `cos(phi_i + phi_j)`, symmetric.
    #[default]
    Summation,
    /// `sin(phi_i - phi_j)`, anti-symmetric.
    Difference,
}

/// Min-max scales `series` into `[-1, 1]`.
///
/// A constant series has no range to scale by and maps to all zeros.
/// Results are clamped so rounding can never push a value outside the
/// domain of `arccos`.
pub fn normalize<T: Copy + Into<f64>>(series: &[T]) -> Vec<f64> {
    let values: Vec<f64> = series.iter().map(|&v| v.into()).collect();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|&v| (2.0 * (v - min) / range - 1.0).clamp(-1.0, 1.0))
        .collect()
}

/// Polar angles of the normalized series, each in `[0, pi]`.
pub fn angles<T: Copy + Into<f64>>(series: &[T]) -> Vec<f64> {
    normalize(series).into_iter().map(f64::acos).collect()
}

/// Summation field of `series`, an `n x n` image with `n = series.len()`.
pub fn transform<T: Copy + Into<f64>>(series: &[T]) -> Image {
    transform_with(series, GafMethod::Summation)
}

pub fn transform_with<T: Copy + Into<f64>>(series: &[T], method: GafMethod) -> Image {
    let phi = angles(series);
    let n = phi.len();
    match method {
        GafMethod::Summation => Array2::from_shape_fn((n, n), |(i, j)| (phi[i] + phi[j]).cos()),
        GafMethod::Difference => Array2::from_shape_fn((n, n), |(i, j)| (phi[i] - phi[j]).sin()),
    }
}
