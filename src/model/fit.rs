//! Least-squares fitting of the panel surface models.
//!
//! All models are linear in their parameters once the rotated paraboloid is
//! written as a general quadratic form, so every fit goes through one SVD
//! solve. The rotated paraboloid is then recovered from the quadratic form by
//! diagonalizing its 2×2 matrix.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::panel::PanelPoint;

use super::{rotate, FitStatus, PanelModelKind, SurfaceModel};

/// Relative singular value threshold below which a direction counts as unconstrained.
const RANK_TOLERANCE: f64 = 1e-12;

/// Parameters and status produced by fitting a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    pub params: Vec<f64>,
    pub status: FitStatus,
}

impl ModelFit {
    fn degenerate(n_params: usize, status: FitStatus) -> Self {
        Self {
            params: vec![f64::NAN; n_params],
            status,
        }
    }
}

impl SurfaceModel {
    /// Fit the model to `samples`.
    ///
    /// Never fails: with fewer samples than parameters, or a sample layout that
    /// leaves a parameter unconstrained, the returned parameters are NaN and the
    /// status says why.
    pub fn solve(&self, samples: &[PanelPoint]) -> ModelFit {
        let n_params = self.kind.n_params();
        if samples.len() < n_params {
            return ModelFit::degenerate(
                n_params,
                FitStatus::UnderDetermined {
                    samples: samples.len(),
                    required: n_params,
                },
            );
        }

        if self.kind == PanelModelKind::Mean {
            let mean = samples.iter().map(|p| p.value).sum::<f64>() / samples.len() as f64;
            return ModelFit {
                params: vec![mean],
                status: FitStatus::Fitted,
            };
        }

        let n_columns = match self.kind {
            PanelModelKind::RotatedParaboloid => 4,
            _ => 3,
        };
        let mut a_mat = DMatrix::<f64>::zeros(samples.len(), n_columns);
        let mut b_vec = DVector::<f64>::zeros(samples.len());

        for (row, p) in samples.iter().enumerate() {
            let dx = p.x - self.center[0];
            let dy = p.y - self.center[1];
            let design: [f64; 4] = match self.kind {
                PanelModelKind::Rigid => [1.0, p.x, p.y, 0.0],
                PanelModelKind::XyParaboloid => [dx * dx, dy * dy, 1.0, 0.0],
                PanelModelKind::CorotatedParaboloid => {
                    let (u, v) = rotate(dx, dy, self.zeta);
                    [u * u, v * v, 1.0, 0.0]
                }
                // p·dx² + q·dy² + s·dx·dy + c
                PanelModelKind::RotatedParaboloid => [dx * dx, dy * dy, dx * dy, 1.0],
                PanelModelKind::Mean => unreachable!(),
            };
            for (col, &value) in design.iter().take(n_columns).enumerate() {
                a_mat[(row, col)] = value;
            }
            b_vec[row] = p.value;
        }

        let coeffs = match solve_least_squares(a_mat, &b_vec) {
            Some(coeffs) => coeffs,
            None => return ModelFit::degenerate(n_params, FitStatus::Singular),
        };

        let params = match self.kind {
            PanelModelKind::RotatedParaboloid => {
                let (a, b, theta) = diagonalize_quadratic(coeffs[0], coeffs[1], coeffs[2]);
                vec![a, b, coeffs[3], theta]
            }
            _ => coeffs.iter().copied().collect(),
        };

        debug!(
            "{} fit over {} samples: {:?}",
            self.kind,
            samples.len(),
            params
        );

        ModelFit {
            params,
            status: FitStatus::Fitted,
        }
    }
}

/// Solve `A·x ≈ b` in the least-squares sense via SVD.
///
/// Returns `None` when `A` is rank deficient.
fn solve_least_squares(a_mat: DMatrix<f64>, b_vec: &DVector<f64>) -> Option<DVector<f64>> {
    let ncols = a_mat.ncols();
    let svd = a_mat.svd(true, true);
    let max_sv = svd.singular_values.max();
    if !max_sv.is_finite() || max_sv <= 0.0 {
        return None;
    }
    let eps = max_sv * RANK_TOLERANCE;
    if svd.rank(eps) < ncols {
        return None;
    }
    svd.solve(b_vec, eps).ok()
}

/// Split `p·dx² + q·dy² + s·dx·dy` into curvatures `(a, b)` along axes rotated by `θ`.
///
/// Uses the convention of [`rotate`]: `u = dx·cosθ − dy·sinθ`, `v = dx·sinθ + dy·cosθ`,
/// so that `a·u² + b·v²` reproduces the quadratic form exactly. The returned `θ`
/// lies in `(−π/2, π/2]` and `a ≥ b`.
fn diagonalize_quadratic(p: f64, q: f64, s: f64) -> (f64, f64, f64) {
    let half_sum = 0.5 * (p + q);
    let diff = (p - q).hypot(s);
    let theta = 0.5 * (-s).atan2(p - q);
    (half_sum + 0.5 * diff, half_sum - 0.5 * diff, theta)
}
