//! Shared synthetic aperture builders for integration tests.
//!
//! Maps are square, centred on the optical axis, rows along x and columns along y.

#![allow(dead_code)]

use holopanel::{ApertureInput, Spectral, SurfaceMap};
use nalgebra::DMatrix;

/// VLA observing wavelength at 23.4 GHz (m).
pub const WAVELENGTH: f64 = 0.0128;

/// `n` evenly spaced coordinates spanning `±half_width` (m).
pub fn axis(n: usize, half_width: f64) -> Vec<f64> {
    let step = 2.0 * half_width / n as f64;
    (0..n)
        .map(|i| (i as f64 - n as f64 / 2.0 + 0.5) * step)
        .collect()
}

/// Aperture whose deviation map is `f(x, y)` with uniform amplitude.
pub fn deviation_aperture<F: Fn(f64, f64) -> f64>(n: usize, half_width: f64, f: F) -> ApertureInput {
    let u = axis(n, half_width);
    let v = u.clone();
    let deviation = DMatrix::from_fn(n, n, |i, j| f(u[i], v[j]));
    ApertureInput {
        antenna_name: "ea25".to_string(),
        amplitude: DMatrix::from_element(n, n, 1.0),
        surface: SurfaceMap::Deviation(deviation),
        u_axis: u,
        v_axis: v,
        spectral: Spectral::Wavelength(WAVELENGTH),
        aperture_points: None,
    }
}

/// Aperture whose phase map is `f(x, y)` with uniform amplitude.
pub fn phase_aperture<F: Fn(f64, f64) -> f64>(n: usize, half_width: f64, f: F) -> ApertureInput {
    let mut input = deviation_aperture(n, half_width, |_, _| 0.0);
    let u = input.u_axis.clone();
    let v = input.v_axis.clone();
    input.surface = SurfaceMap::Phase(DMatrix::from_fn(n, n, |i, j| f(u[i], v[j])));
    input
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
}
