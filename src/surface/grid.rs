//! Aperture grid: cropping, polar coordinates, validity mask, and the
//! phase ↔ deviation conversion.
//!
//! Maps are indexed `(row, col)` with rows following the u axis (x) and columns
//! following the v axis (y).

use nalgebra::DMatrix;

use crate::panel::PanelPosition;

/// Fraction of the diameter kept around the dish when cropping.
pub const CROP_MARGIN: f64 = 0.025;

/// Per-pixel polar coordinates of the aperture.
#[derive(Debug, Clone)]
pub struct PolarGrid {
    pub radius: DMatrix<f64>,
    pub azimuth: DMatrix<f64>,
}

impl PolarGrid {
    pub fn new(u_axis: &[f64], v_axis: &[f64]) -> Self {
        let (nrows, ncols) = (u_axis.len(), v_axis.len());
        let mut radius = DMatrix::<f64>::zeros(nrows, ncols);
        let mut azimuth = DMatrix::<f64>::zeros(nrows, ncols);
        for (i, &u) in u_axis.iter().enumerate() {
            for (j, &v) in v_axis.iter().enumerate() {
                let pos = PanelPosition::from_xy(u, v);
                radius[(i, j)] = pos.radius;
                azimuth[(i, j)] = pos.azimuth;
            }
        }
        Self { radius, azimuth }
    }
}

/// Index range `[start, end)` of `axis` within `±edge`.
///
/// Starts at the first coordinate above `-edge` and stops at the first one above `edge`.
pub fn crop_range(axis: &[f64], edge: f64) -> (usize, usize) {
    let start = axis.iter().position(|&c| c > -edge).unwrap_or(axis.len());
    let end = axis.iter().position(|&c| c > edge).unwrap_or(axis.len());
    (start, end.max(start))
}

/// Sub-block of `map` covering `rows × cols`.
pub fn crop_map(map: &DMatrix<f64>, rows: (usize, usize), cols: (usize, usize)) -> DMatrix<f64> {
    map.view((rows.0, cols.0), (rows.1 - rows.0, cols.1 - cols.0))
        .clone_owned()
}

/// Coefficients of the deviation = a·phase·sqrt(r² + b) relation.
fn conversion_coefficients(wavelength: f64, focal_length: f64) -> (f64, f64) {
    let a = (wavelength / std::f64::consts::TAU) / (4.0 * focal_length);
    let b = 4.0 * focal_length * focal_length;
    (a, b)
}

/// Convert a phase map (rad) to a surface deviation map (m).
pub fn phase_to_deviation(
    phase: &DMatrix<f64>,
    radius: &DMatrix<f64>,
    wavelength: f64,
    focal_length: f64,
) -> DMatrix<f64> {
    let (a, b) = conversion_coefficients(wavelength, focal_length);
    phase.zip_map(radius, |p, r| a * p * (r * r + b).sqrt())
}

/// Convert a surface deviation map (m) to a phase map (rad).
pub fn deviation_to_phase(
    deviation: &DMatrix<f64>,
    radius: &DMatrix<f64>,
    wavelength: f64,
    focal_length: f64,
) -> DMatrix<f64> {
    let (a, b) = conversion_coefficients(wavelength, focal_length);
    deviation.zip_map(radius, |d, r| d / (a * (r * r + b).sqrt()))
}

/// Pixels usable for analysis.
///
/// A pixel is valid when its amplitude is at least `cutoff` (absolute), its
/// radius lies strictly between `inner_limit` and `outer_limit`, and neither
/// amplitude nor deviation is NaN.
pub fn build_mask(
    amplitude: &DMatrix<f64>,
    deviation: &DMatrix<f64>,
    radius: &DMatrix<f64>,
    cutoff: f64,
    inner_limit: f64,
    outer_limit: f64,
) -> DMatrix<bool> {
    DMatrix::from_fn(amplitude.nrows(), amplitude.ncols(), |i, j| {
        let amp = amplitude[(i, j)];
        let rad = radius[(i, j)];
        !amp.is_nan()
            && !deviation[(i, j)].is_nan()
            && amp >= cutoff
            && rad > inner_limit
            && rad < outer_limit
    })
}

/// Largest non-NaN value of `map`, NaN if there is none.
pub fn nan_max(map: &DMatrix<f64>) -> f64 {
    map.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn axis(n: usize, step: f64) -> Vec<f64> {
        let half = (n as f64 - 1.0) / 2.0;
        (0..n).map(|i| (i as f64 - half) * step).collect()
    }

    #[test]
    fn test_polar_grid() {
        let u = vec![-1.0, 0.0, 1.0];
        let v = vec![-1.0, 0.0, 1.0];
        let grid = PolarGrid::new(&u, &v);
        // Centre pixel: radius 0, defined azimuth
        assert_eq!(grid.radius[(1, 1)], 0.0);
        assert!(grid.azimuth[(1, 1)].is_finite());
        // (x=0, y=1): top, azimuth 0
        assert!(grid.azimuth[(1, 2)].abs() < 1e-15);
        // (x=1, y=0): right, azimuth π/2
        assert!((grid.azimuth[(2, 1)] - FRAC_PI_2).abs() < 1e-15);
        // (x=0, y=-1): bottom, azimuth π
        assert!((grid.azimuth[(1, 0)] - PI).abs() < 1e-15);
        // (x=-1, y=0): left, azimuth 3π/2
        assert!((grid.azimuth[(0, 1)] - 3.0 * FRAC_PI_2).abs() < 1e-15);
        assert!((grid.radius[(2, 2)] - 2f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_crop_range() {
        let a = axis(101, 0.5); // -25 .. 25
        let (start, end) = crop_range(&a, 10.0);
        assert!(a[start] > -10.0 && a[start - 1] <= -10.0);
        assert!(a[end] > 10.0 && a[end - 1] <= 10.0);
        assert_eq!(crop_range(&a, 100.0), (0, 101));
    }

    #[test]
    fn test_phase_deviation_roundtrip() {
        let u = axis(8, 1.5);
        let grid = PolarGrid::new(&u, &u);
        let phase = DMatrix::from_fn(8, 8, |i, j| 0.1 * i as f64 - 0.05 * j as f64);
        let dev = phase_to_deviation(&phase, &grid.radius, 0.01, 8.8);
        let back = deviation_to_phase(&dev, &grid.radius, 0.01, 8.8);
        for (p, q) in phase.iter().zip(back.iter()) {
            assert!((p - q).abs() < 1e-12);
        }
        // On axis one radian of phase is λ/(4π) of deviation.
        let (a, b) = conversion_coefficients(0.01, 8.8);
        assert!((b.sqrt() - 17.6).abs() < 1e-12);
        assert!((a * 2.0 * 8.8 - 0.01 / (4.0 * PI)).abs() < 1e-15);
    }

    #[test]
    fn test_mask_rules() {
        let radius = DMatrix::from_row_slice(1, 5, &[0.5, 3.0, 3.0, 3.0, 20.0]);
        let amplitude = DMatrix::from_row_slice(1, 5, &[1.0, 1.0, 0.1, f64::NAN, 1.0]);
        let deviation = DMatrix::from_row_slice(1, 5, &[0.0, 0.0, 0.0, 0.0, 0.0]);
        let mask = build_mask(&amplitude, &deviation, &radius, 0.2, 1.0, 12.0);
        assert_eq!(
            mask.iter().copied().collect::<Vec<_>>(),
            vec![false, true, false, false, false]
        );

        let deviation = DMatrix::from_row_slice(1, 5, &[0.0, f64::NAN, 0.0, 0.0, 0.0]);
        let mask = build_mask(&amplitude, &deviation, &radius, 0.2, 1.0, 12.0);
        assert!(!mask[(0, 1)]);
    }

    #[test]
    fn test_nan_max() {
        let m = DMatrix::from_row_slice(1, 3, &[1.0, f64::NAN, 3.0]);
        assert_eq!(nan_max(&m), 3.0);
        let empty = DMatrix::from_row_slice(1, 1, &[f64::NAN]);
        assert!(nan_max(&empty).is_nan());
    }
}
