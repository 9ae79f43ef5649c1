//! Reflector panels: the individually adjustable segments of the main surface.
//!
//! A [`Panel`] owns the map pixels that fall on it, split into *samples* (used
//! for the fit) and *margins* (near the edges, corrected but not fitted), and a
//! [`SurfaceModel`] fitted to the samples. Screw adjustments are the fitted
//! model evaluated at the panel's screw positions.
//!
//! Two geometric variants exist, see [`PanelGeometry`].

pub mod polygon;
pub mod ring;

use std::f64::consts::TAU;

use crate::error::{Result, SurfaceError};
use crate::model::fit::ModelFit;
use crate::model::{FitStatus, PanelModelKind, SurfaceModel};
use crate::telescope::{PolygonPanelSpec, ScrewLayout};
use crate::units::LengthUnit;

pub use polygon::Polygon;
pub use ring::RingSector;

/// A map pixel assigned to a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPoint {
    /// Aperture x coordinate (m).
    pub x: f64,
    /// Aperture y coordinate (m).
    pub y: f64,
    /// Map row index.
    pub row: usize,
    /// Map column index.
    pub col: usize,
    /// Raw deviation (m).
    pub value: f64,
}

/// Position of a map pixel in both Cartesian and polar form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPosition {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Azimuth in `[0, 2π)`, from +Y toward +X.
    pub azimuth: f64,
}

impl PanelPosition {
    pub fn from_xy(x: f64, y: f64) -> Self {
        // rem_euclid can round tiny negative angles up to exactly 2π
        let azimuth = x.atan2(y).rem_euclid(TAU);
        Self {
            x,
            y,
            radius: x.hypot(y),
            azimuth: if azimuth >= TAU { 0.0 } else { azimuth },
        }
    }
}

/// Outline of a panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelGeometry {
    /// Annular sector on a ringed dish.
    RingSector(RingSector),
    /// Explicit outline; `margin` is the already-shrunk fit region.
    Polygon { outline: Polygon, margin: Polygon },
}

impl PanelGeometry {
    fn name(&self) -> &'static str {
        match self {
            PanelGeometry::RingSector(_) => "ring sector",
            PanelGeometry::Polygon { .. } => "polygon",
        }
    }
}

/// Per-panel summary for downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDiagnostics {
    pub label: String,
    pub kind: PanelModelKind,
    pub n_samples: usize,
    pub n_margins: usize,
    pub status: FitStatus,
    pub params: Vec<f64>,
}

/// One adjustable panel of the reflector.
#[derive(Debug, Clone)]
pub struct Panel {
    pub label: String,
    pub geometry: PanelGeometry,
    pub model: SurfaceModel,
    /// Screw positions (m).
    pub screws: Vec<[f64; 2]>,
    samples: Vec<PanelPoint>,
    margins: Vec<PanelPoint>,
    params: Vec<f64>,
    status: FitStatus,
}

impl Panel {
    /// Panel `index` of ring `ring` holding `n_panels` panels.
    #[allow(clippy::too_many_arguments)]
    pub fn ring_sector(
        kind: PanelModelKind,
        ring: usize,
        index: usize,
        n_panels: usize,
        inner_radius: f64,
        outer_radius: f64,
        margin: f64,
        screws: &ScrewLayout,
        label: String,
    ) -> Self {
        let sector = RingSector::new(ring, index, n_panels, inner_radius, outer_radius, margin);
        let model = SurfaceModel::new(kind, sector.center(), sector.zeta);
        let screws = sector.screws(screws);
        Self::with_geometry(label, PanelGeometry::RingSector(sector), model, screws)
    }

    /// Polygon panel; the co-rotated paraboloid has no meaning here and is rejected.
    pub fn polygon(kind: PanelModelKind, spec: &PolygonPanelSpec) -> Result<Self> {
        let outline = Polygon::new(spec.polygon.clone());
        let margin = Polygon::new(spec.margin_polygon.clone());
        let geometry = PanelGeometry::Polygon {
            outline: outline.clone(),
            margin,
        };
        if kind == PanelModelKind::CorotatedParaboloid {
            return Err(SurfaceError::UnsupportedModel {
                model: kind.name(),
                geometry: geometry.name(),
            });
        }
        let model = SurfaceModel::new(kind, outline.centroid(), 0.0);
        Ok(Self::with_geometry(
            spec.label.clone(),
            geometry,
            model,
            spec.screws.clone(),
        ))
    }

    fn with_geometry(
        label: String,
        geometry: PanelGeometry,
        model: SurfaceModel,
        screws: Vec<[f64; 2]>,
    ) -> Self {
        let n_params = model.kind.n_params();
        Self {
            label,
            geometry,
            model,
            screws,
            samples: Vec::new(),
            margins: Vec::new(),
            params: vec![f64::NAN; n_params],
            status: FitStatus::Unfitted,
        }
    }

    pub fn kind(&self) -> PanelModelKind {
        self.model.kind
    }

    /// Returns `(is_sample, is_inside)`: whether the position lies in the fit
    /// region, and whether it lies on the panel at all. Boundaries are inclusive.
    pub fn is_inside(&self, position: &PanelPosition) -> (bool, bool) {
        match &self.geometry {
            PanelGeometry::RingSector(sector) => sector.contains(position.radius, position.azimuth),
            PanelGeometry::Polygon { outline, margin } => {
                let sample = margin.contains(position.x, position.y);
                let inside = sample || outline.contains(position.x, position.y);
                (sample, inside)
            }
        }
    }

    pub fn add_sample(&mut self, point: PanelPoint) {
        self.samples.push(point);
    }

    pub fn add_margin(&mut self, point: PanelPoint) {
        self.margins.push(point);
    }

    pub fn samples(&self) -> &[PanelPoint] {
        &self.samples
    }

    pub fn margins(&self) -> &[PanelPoint] {
        &self.margins
    }

    /// Fitted parameters; NaN before `solve` and for degenerate fits.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn status(&self) -> FitStatus {
        self.status
    }

    /// Fit the panel model to its samples.
    pub fn solve(&mut self) -> FitStatus {
        let ModelFit { params, status } = self.model.solve(&self.samples);
        self.params = params;
        self.status = status;
        status
    }

    /// Model value at `(x, y)` with the fitted parameters (m).
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.model.evaluate(&self.params, x, y)
    }

    /// `(row, col, correction)` for every sample and margin point.
    pub fn corrections(&self) -> Result<Vec<(usize, usize, f64)>> {
        if !self.status.is_solved() {
            return Err(SurfaceError::NotFitted);
        }
        Ok(self
            .samples
            .iter()
            .chain(&self.margins)
            .map(|p| (p.row, p.col, self.evaluate(p.x, p.y)))
            .collect())
    }

    /// Fitted surface displacement at each screw, in `unit`.
    pub fn screw_adjustments(&self, unit: LengthUnit) -> Vec<f64> {
        let fac = unit.from_meters();
        self.screws
            .iter()
            .map(|s| fac * self.evaluate(s[0], s[1]))
            .collect()
    }

    /// One line of the screw report for this panel.
    pub fn export_adjustments(&self, unit: LengthUnit) -> String {
        let mut line = match &self.geometry {
            PanelGeometry::RingSector(sector) => {
                format!("{:8}{:8}", sector.ring + 1, sector.index + 1)
            }
            PanelGeometry::Polygon { .. } => format!("{:>16}", self.label),
        };
        for value in self.screw_adjustments(unit) {
            line.push_str(&format!(" {:10.2}", value));
        }
        line
    }

    pub fn diagnostics(&self) -> PanelDiagnostics {
        PanelDiagnostics {
            label: self.label.clone(),
            kind: self.kind(),
            n_samples: self.samples.len(),
            n_margins: self.margins.len(),
            status: self.status,
            params: self.params.clone(),
        }
    }
}
