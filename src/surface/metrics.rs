//! Surface quality metrics over masked maps.

use nalgebra::DMatrix;

use crate::units::to_db;

/// Root mean square of `map` over the pixels where `mask` is set; NaN for an empty mask.
pub fn masked_rms(map: &DMatrix<f64>, mask: &DMatrix<bool>) -> f64 {
    let (sum_sq, count) = map
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .fold((0.0, 0usize), |(s, n), (&v, _)| (s + v * v, n + 1));
    if count == 0 {
        return f64::NAN;
    }
    (sum_sq / count as f64).sqrt()
}

/// Theoretical (diffraction-limited) gain, linear.
///
/// `pixel_size` is the aperture resolution element (m), `wavelength` in m.
pub fn theoretical_gain(pixel_size: f64, wavelength: f64) -> f64 {
    4.0 * std::f64::consts::PI * (1000.0 * pixel_size / wavelength).powi(2)
}

/// Ruze-style gain estimate from a phase map: `(actual_db, theoretical_db)`.
///
/// The actual gain scales the theoretical one by the coherence of the masked
/// phases, `|Σ e^{iφ}| / N`. An empty mask yields a NaN actual gain.
pub fn masked_gain(
    phase: &DMatrix<f64>,
    mask: &DMatrix<bool>,
    pixel_size: f64,
    wavelength: f64,
) -> (f64, f64) {
    let th_gain = theoretical_gain(pixel_size, wavelength);
    let (sum_cos, sum_sin, count) = phase
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .fold((0.0, 0.0, 0usize), |(c, s, n), (&p, _)| {
            (c + p.cos(), s + p.sin(), n + 1)
        });
    let gain = if count == 0 {
        f64::NAN
    } else {
        th_gain * sum_cos.hypot(sum_sin) / count as f64
    };
    (to_db(gain), to_db(th_gain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_zero_and_constant() {
        let mask = DMatrix::from_element(4, 4, true);
        let zero = DMatrix::<f64>::zeros(4, 4);
        assert_eq!(masked_rms(&zero, &mask), 0.0);
        let three = DMatrix::from_element(4, 4, -3.0);
        assert!((masked_rms(&three, &mask) - 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_rms_ignores_unmasked() {
        let map = DMatrix::from_row_slice(1, 3, &[2.0, f64::NAN, 100.0]);
        let mask = DMatrix::from_row_slice(1, 3, &[true, false, false]);
        assert!((masked_rms(&map, &mask) - 2.0).abs() < 1e-15);
        let none = DMatrix::from_element(1, 3, false);
        assert!(masked_rms(&map, &none).is_nan());
    }

    #[test]
    fn test_constant_phase_is_coherent() {
        let mask = DMatrix::from_element(5, 5, true);
        for value in [0.0, 0.7, -2.0] {
            let phase = DMatrix::from_element(5, 5, value);
            let (actual, theoretical) = masked_gain(&phase, &mask, 0.1, 0.01);
            assert!(
                (actual - theoretical).abs() < 1e-12,
                "phase {}: actual {} vs theoretical {}",
                value,
                actual,
                theoretical
            );
        }
    }

    #[test]
    fn test_scattered_phase_loses_gain() {
        let mask = DMatrix::from_element(10, 10, true);
        let phase = DMatrix::from_fn(10, 10, |i, j| ((i * 7 + j * 13) % 17) as f64 * 0.3);
        let (actual, theoretical) = masked_gain(&phase, &mask, 0.1, 0.01);
        assert!(actual < theoretical);
    }
}
