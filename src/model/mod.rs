//! Surface models fitted to the sampled deviations of a single panel.
//!
//! Every model maps a point `(x, y)` on the aperture (meters) to a surface
//! displacement (meters). Paraboloid models work in coordinates relative to the
//! panel centre, `dx = x - xc`, `dy = y - yc`.
//!
//! # Supported models
//!
//! - [`PanelModelKind::Mean`]: constant offset `a`
//! - [`PanelModelKind::Rigid`]: tilted plane `a + b·x + c·y`
//! - [`PanelModelKind::XyParaboloid`]: `a·dx² + b·dy² + c`
//! - [`PanelModelKind::RotatedParaboloid`]: `a·u² + b·v² + c` with `(u, v)` the
//!   panel-centred coordinates rotated by a free angle `θ`; parameters `[a, b, c, θ]`
//! - [`PanelModelKind::CorotatedParaboloid`]: same, but `θ` is locked to the
//!   panel's own angular position on a ringed dish; parameters `[a, b, c]`

pub mod fit;

use std::fmt;
use std::str::FromStr;

use crate::error::SurfaceError;

/// Kind of surface model used to fit panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelModelKind {
    Mean,
    #[default]
    Rigid,
    XyParaboloid,
    RotatedParaboloid,
    CorotatedParaboloid,
}

impl PanelModelKind {
    /// All supported kinds.
    pub const ALL: [PanelModelKind; 5] = [
        PanelModelKind::Mean,
        PanelModelKind::Rigid,
        PanelModelKind::XyParaboloid,
        PanelModelKind::RotatedParaboloid,
        PanelModelKind::CorotatedParaboloid,
    ];

    /// Number of free parameters fitted by this model.
    pub fn n_params(self) -> usize {
        match self {
            PanelModelKind::Mean => 1,
            PanelModelKind::Rigid => 3,
            PanelModelKind::XyParaboloid => 3,
            PanelModelKind::RotatedParaboloid => 4,
            PanelModelKind::CorotatedParaboloid => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PanelModelKind::Mean => "mean",
            PanelModelKind::Rigid => "rigid",
            PanelModelKind::XyParaboloid => "xyparaboloid",
            PanelModelKind::RotatedParaboloid => "rotatedparaboloid",
            PanelModelKind::CorotatedParaboloid => "corotatedparaboloid",
        }
    }
}

impl FromStr for PanelModelKind {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SurfaceError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for PanelModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of fitting a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitStatus {
    /// `solve` has not run yet.
    #[default]
    Unfitted,
    /// Parameters are valid.
    Fitted,
    /// Fewer sample points than free parameters; parameters are NaN.
    UnderDetermined { samples: usize, required: usize },
    /// The sample geometry does not constrain every parameter; parameters are NaN.
    Singular,
}

impl FitStatus {
    /// True for fits whose parameter vector is NaN.
    pub fn is_degenerate(self) -> bool {
        matches!(
            self,
            FitStatus::UnderDetermined { .. } | FitStatus::Singular
        )
    }

    pub fn is_solved(self) -> bool {
        !matches!(self, FitStatus::Unfitted)
    }
}

/// A model kind bound to the geometry of one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceModel {
    pub kind: PanelModelKind,
    /// Panel centre `[xc, yc]` (m), origin of the paraboloid coordinates.
    pub center: [f64; 2],
    /// Angular position of the panel (rad, from +Y toward +X); used by the
    /// co-rotated paraboloid.
    pub zeta: f64,
}

impl SurfaceModel {
    pub fn new(kind: PanelModelKind, center: [f64; 2], zeta: f64) -> Self {
        Self { kind, center, zeta }
    }

    /// Evaluate the model with parameters `params` at `(x, y)`.
    pub fn evaluate(&self, params: &[f64], x: f64, y: f64) -> f64 {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        match self.kind {
            PanelModelKind::Mean => params[0],
            PanelModelKind::Rigid => params[0] + params[1] * x + params[2] * y,
            PanelModelKind::XyParaboloid => params[0] * dx * dx + params[1] * dy * dy + params[2],
            PanelModelKind::RotatedParaboloid => {
                let (u, v) = rotate(dx, dy, params[3]);
                params[0] * u * u + params[1] * v * v + params[2]
            }
            PanelModelKind::CorotatedParaboloid => {
                let (u, v) = rotate(dx, dy, self.zeta);
                params[0] * u * u + params[1] * v * v + params[2]
            }
        }
    }
}

/// Rotate panel-centred coordinates into the paraboloid's own axes.
pub(crate) fn rotate(dx: f64, dy: f64, theta: f64) -> (f64, f64) {
    let (sin_t, cos_t) = theta.sin_cos();
    (dx * cos_t - dy * sin_t, dx * sin_t + dy * cos_t)
}
