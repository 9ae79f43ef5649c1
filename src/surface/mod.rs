//! Antenna surface: the orchestrator that turns an aperture map into panel
//! corrections and surface metrics.
//!
//! # Pipeline
//!
//! ```text
//! ApertureInput ─┬─ crop (optional) ─ polar grid ─ phase ↔ deviation
//!                └─ mask (amplitude cut, radial limits, NaN)
//!                     └─ panels (geometry order) ─ first-match pixel assignment
//! fit_surface()     → every panel solved
//! correct_surface() → corrections / residuals (deviation and phase)
//! rms(), gains()    → before and, once corrected, after
//! ```
//!
//! Lifecycle is `Constructed → Fitted → Corrected`; correcting before fitting
//! is an error.

pub mod grid;
pub mod metrics;
pub mod report;

use nalgebra::DMatrix;
use tracing::{info, warn};

use crate::error::{Result, SurfaceError};
use crate::model::{FitStatus, PanelModelKind};
use crate::panel::{Panel, PanelDiagnostics, PanelPoint, PanelPosition};
use crate::telescope::{PanelLayout, TelescopeGeometry};
use crate::units::LengthUnit;

use grid::{PolarGrid, CROP_MARGIN};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// The surface map supplied by the upstream pipeline.
#[derive(Debug, Clone)]
pub enum SurfaceMap {
    /// Aperture phase (rad); deviation is derived.
    Phase(DMatrix<f64>),
    /// Physical surface deviation (m); phase is derived.
    Deviation(DMatrix<f64>),
}

/// Spectral description of the measurement.
#[derive(Debug, Clone)]
pub enum Spectral {
    /// Observing wavelength (m).
    Wavelength(f64),
    /// Channel frequencies (Hz); exactly one channel is supported.
    Channels(Vec<f64>),
}

/// Aperture maps and axes for a single antenna.
#[derive(Debug, Clone)]
pub struct ApertureInput {
    pub antenna_name: String,
    /// Amplitude map, rows along `u_axis`, columns along `v_axis`.
    pub amplitude: DMatrix<f64>,
    pub surface: SurfaceMap,
    /// Physical x coordinate of each row (m).
    pub u_axis: Vec<f64>,
    /// Physical y coordinate of each column (m).
    pub v_axis: Vec<f64>,
    pub spectral: Spectral,
    /// Number of aperture points across the dish used to derive the pixel size.
    /// `None` uses `hypot(rows, cols)`.
    pub aperture_points: Option<f64>,
}

/// Parameters controlling surface analysis.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Fractional amplitude cutoff relative to the peak amplitude. `None` = 0.2.
    pub cutoff: Option<f64>,
    /// Surface model fitted to every panel. Default rigid.
    pub model: PanelModelKind,
    /// Fraction of each panel edge excluded from the fit. Default 0.2.
    pub margin: f64,
    /// Crop the maps to slightly more than the dish diameter. Default false.
    pub crop: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            model: PanelModelKind::Rigid,
            margin: 0.2,
            crop: false,
        }
    }
}

impl SurfaceConfig {
    pub const DEFAULT_CUTOFF: f64 = 0.2;

    pub fn cutoff_fraction(&self) -> f64 {
        self.cutoff.unwrap_or(Self::DEFAULT_CUTOFF)
    }
}

/// Where the surface is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Constructed,
    Fitted,
    Corrected,
}

/// Outcome of assigning masked pixels to panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentSummary {
    pub samples: usize,
    pub margins: usize,
    /// Masked pixels that fall on no panel.
    pub unassigned: usize,
}

impl AssignmentSummary {
    pub fn total(&self) -> usize {
        self.samples + self.margins + self.unassigned
    }
}

/// Surface RMS before and, once corrected, after correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsReport {
    pub before: f64,
    pub after: Option<f64>,
    pub unit: LengthUnit,
}

/// Gains in dB before and, once corrected, after correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainReport {
    pub before: f64,
    pub after: Option<f64>,
    pub theoretical: f64,
}

/// Corrected deviation and phase products.
#[derive(Debug, Clone)]
pub struct Corrections {
    /// Applied corrections (m); NaN outside the mask.
    pub corrections: DMatrix<f64>,
    /// Deviation after correction (m).
    pub residuals: DMatrix<f64>,
    pub phase_corrections: DMatrix<f64>,
    pub phase_residuals: DMatrix<f64>,
}

/// Reflector surface of one antenna at one frequency.
#[derive(Debug, Clone)]
pub struct AntennaSurface {
    pub telescope: TelescopeGeometry,
    pub antenna_name: String,
    pub config: SurfaceConfig,
    pub wavelength: f64,
    /// Absolute amplitude cutoff.
    pub cut: f64,
    /// Aperture resolution element (m).
    pub pixel_size: f64,
    pub u_axis: Vec<f64>,
    pub v_axis: Vec<f64>,
    pub amplitude: DMatrix<f64>,
    pub phase: DMatrix<f64>,
    pub deviation: DMatrix<f64>,
    pub mask: DMatrix<bool>,
    pub grid: PolarGrid,
    panels: Vec<Panel>,
    assignment: AssignmentSummary,
    corrected: Option<Corrections>,
    state: SurfaceState,
}

impl AntennaSurface {
    /// Build the surface: grid, mask, panels and pixel assignment.
    pub fn new(
        input: ApertureInput,
        telescope: &TelescopeGeometry,
        config: SurfaceConfig,
    ) -> Result<Self> {
        telescope.validate()?;
        let wavelength = match &input.spectral {
            Spectral::Wavelength(w) => *w,
            Spectral::Channels(freqs) if freqs.len() == 1 => SPEED_OF_LIGHT / freqs[0],
            Spectral::Channels(freqs) => {
                return Err(SurfaceError::MultiChannel { nchan: freqs.len() })
            }
        };

        let ApertureInput {
            antenna_name,
            amplitude,
            surface,
            u_axis,
            v_axis,
            aperture_points,
            ..
        } = input;

        let expected = (u_axis.len(), v_axis.len());
        check_shape("amplitude", &amplitude, expected)?;
        match &surface {
            SurfaceMap::Phase(m) => check_shape("phase", m, expected)?,
            SurfaceMap::Deviation(m) => check_shape("deviation", m, expected)?,
        }

        let npoint = aperture_points
            .unwrap_or_else(|| (expected.0 as f64).hypot(expected.1 as f64));
        let pixel_size = telescope.diameter / npoint;
        let cut = config.cutoff_fraction() * grid::nan_max(&amplitude);

        let (u_axis, v_axis, amplitude, surface) = if config.crop {
            let edge = (0.5 + CROP_MARGIN) * telescope.diameter;
            let rows = grid::crop_range(&u_axis, edge);
            let cols = grid::crop_range(&v_axis, edge);
            let surface = match surface {
                SurfaceMap::Phase(m) => SurfaceMap::Phase(grid::crop_map(&m, rows, cols)),
                SurfaceMap::Deviation(m) => {
                    SurfaceMap::Deviation(grid::crop_map(&m, rows, cols))
                }
            };
            (
                u_axis[rows.0..rows.1].to_vec(),
                v_axis[cols.0..cols.1].to_vec(),
                grid::crop_map(&amplitude, rows, cols),
                surface,
            )
        } else {
            (u_axis, v_axis, amplitude, surface)
        };

        let polar = PolarGrid::new(&u_axis, &v_axis);
        let focal = telescope.focal_length;
        let (phase, deviation) = match surface {
            SurfaceMap::Phase(phase) => {
                let deviation = grid::phase_to_deviation(&phase, &polar.radius, wavelength, focal);
                (phase, deviation)
            }
            SurfaceMap::Deviation(deviation) => {
                let phase = grid::deviation_to_phase(&deviation, &polar.radius, wavelength, focal);
                (phase, deviation)
            }
        };

        let mask = grid::build_mask(
            &amplitude,
            &deviation,
            &polar.radius,
            cut,
            telescope.inner_limit,
            telescope.outer_limit,
        );

        let panels = build_panels(telescope, &config)?;

        let mut surface = Self {
            telescope: telescope.clone(),
            antenna_name,
            config,
            wavelength,
            cut,
            pixel_size,
            u_axis,
            v_axis,
            amplitude,
            phase,
            deviation,
            mask,
            grid: polar,
            panels,
            assignment: AssignmentSummary::default(),
            corrected: None,
            state: SurfaceState::Constructed,
        };
        surface.assignment = surface.compile_panel_points();

        info!(
            "{} {}: {}x{} map, {} panels ({}), {} samples, {} margins, {} unassigned",
            surface.telescope.name,
            surface.antenna_name,
            surface.u_axis.len(),
            surface.v_axis.len(),
            surface.panels.len(),
            surface.config.model,
            surface.assignment.samples,
            surface.assignment.margins,
            surface.assignment.unassigned
        );
        Ok(surface)
    }

    /// Assign each masked pixel to the first panel containing it.
    fn compile_panel_points(&mut self) -> AssignmentSummary {
        let mut summary = AssignmentSummary::default();
        for (i, &x) in self.u_axis.iter().enumerate() {
            for (j, &y) in self.v_axis.iter().enumerate() {
                if !self.mask[(i, j)] {
                    continue;
                }
                let position = PanelPosition {
                    x,
                    y,
                    radius: self.grid.radius[(i, j)],
                    azimuth: self.grid.azimuth[(i, j)],
                };
                let point = PanelPoint {
                    x,
                    y,
                    row: i,
                    col: j,
                    value: self.deviation[(i, j)],
                };
                let mut assigned = false;
                for panel in self.panels.iter_mut() {
                    let (is_sample, inside) = panel.is_inside(&position);
                    if inside {
                        if is_sample {
                            panel.add_sample(point);
                            summary.samples += 1;
                        } else {
                            panel.add_margin(point);
                            summary.margins += 1;
                        }
                        assigned = true;
                        break;
                    }
                }
                if !assigned {
                    summary.unassigned += 1;
                }
            }
        }
        if summary.unassigned > 0 {
            warn!(
                "{} masked pixels fall outside every panel",
                summary.unassigned
            );
        }
        summary
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn assignment(&self) -> AssignmentSummary {
        self.assignment
    }

    /// Panel by 1-based ring and panel number (polygon layouts ignore `ring` beyond 1).
    pub fn panel(&self, ring: usize, panel: usize) -> Option<&Panel> {
        self.telescope
            .panel_index(ring, panel)
            .and_then(|idx| self.panels.get(idx))
    }

    /// Fit every panel; degenerate panels are logged and reported via diagnostics.
    pub fn fit_surface(&mut self) {
        let mut degenerate = 0;
        for panel in self.panels.iter_mut() {
            let status = panel.solve();
            if status.is_degenerate() {
                degenerate += 1;
                warn!(
                    "panel {} could not be fitted ({} samples): {:?}",
                    panel.label,
                    panel.samples().len(),
                    status
                );
            }
        }
        info!(
            "Fitted {} panels, {} degenerate",
            self.panels.len(),
            degenerate
        );
        self.corrected = None;
        self.state = SurfaceState::Fitted;
    }

    /// Apply the fitted panel corrections to the deviation map.
    ///
    /// Panels whose fit is degenerate leave their pixels uncorrected.
    pub fn correct_surface(&mut self) -> Result<()> {
        if self.state == SurfaceState::Constructed {
            return Err(SurfaceError::NotFitted);
        }
        let mask = &self.mask;
        let mut corrections =
            DMatrix::from_fn(mask.nrows(), mask.ncols(), |i, j| {
                if mask[(i, j)] {
                    0.0
                } else {
                    f64::NAN
                }
            });
        let mut residuals = self.deviation.clone();
        for panel in &self.panels {
            if panel.status().is_degenerate() {
                continue;
            }
            for (row, col, corr) in panel.corrections()? {
                residuals[(row, col)] -= corr;
                corrections[(row, col)] = -corr;
            }
        }

        let focal = self.telescope.focal_length;
        let phase_corrections =
            grid::deviation_to_phase(&corrections, &self.grid.radius, self.wavelength, focal);
        let phase_residuals =
            grid::deviation_to_phase(&residuals, &self.grid.radius, self.wavelength, focal);
        self.corrected = Some(Corrections {
            corrections,
            residuals,
            phase_corrections,
            phase_residuals,
        });
        self.state = SurfaceState::Corrected;
        info!("Corrected surface of {}", self.antenna_name);
        Ok(())
    }

    /// Correction products, `None` until `correct_surface` has run.
    pub fn corrections(&self) -> Option<&Corrections> {
        self.corrected.as_ref()
    }

    /// Surface RMS in `unit`.
    pub fn rms(&self, unit: LengthUnit) -> RmsReport {
        let fac = unit.from_meters();
        RmsReport {
            before: fac * metrics::masked_rms(&self.deviation, &self.mask),
            after: self
                .corrected
                .as_ref()
                .map(|c| fac * metrics::masked_rms(&c.residuals, &self.mask)),
            unit,
        }
    }

    /// Aperture gains in dB.
    pub fn gains(&self) -> GainReport {
        let (before, theoretical) = self.gain_of(&self.phase);
        GainReport {
            before,
            after: self
                .corrected
                .as_ref()
                .map(|c| self.gain_of(&c.phase_residuals).0),
            theoretical,
        }
    }

    /// `(actual_db, theoretical_db)` for an arbitrary phase map over this surface's mask.
    pub fn gain_of(&self, phase: &DMatrix<f64>) -> (f64, f64) {
        metrics::masked_gain(phase, &self.mask, self.pixel_size, self.wavelength)
    }

    /// RMS of an arbitrary map over this surface's mask, in meters.
    pub fn rms_of(&self, map: &DMatrix<f64>) -> f64 {
        metrics::masked_rms(map, &self.mask)
    }

    pub fn diagnostics(&self) -> Vec<PanelDiagnostics> {
        self.panels.iter().map(Panel::diagnostics).collect()
    }

    /// Labels of panels whose fit is degenerate.
    pub fn degenerate_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.status().is_degenerate())
            .map(|p| p.label.as_str())
            .collect()
    }

    /// Fit status of every panel, in panel order.
    pub fn fit_statuses(&self) -> Vec<FitStatus> {
        self.panels.iter().map(Panel::status).collect()
    }
}

fn check_shape(name: &'static str, map: &DMatrix<f64>, expected: (usize, usize)) -> Result<()> {
    let found = map.shape();
    if found != expected {
        return Err(SurfaceError::ShapeMismatch {
            name,
            expected,
            found,
        });
    }
    Ok(())
}

/// Panels in list order: ring by ring, or polygons as listed.
fn build_panels(telescope: &TelescopeGeometry, config: &SurfaceConfig) -> Result<Vec<Panel>> {
    match &telescope.layout {
        PanelLayout::Rings(rings) => {
            let mut panels = Vec::with_capacity(rings.n_panels());
            for (iring, &count) in rings.panel_counts.iter().enumerate() {
                for ipanel in 0..count {
                    panels.push(Panel::ring_sector(
                        config.model,
                        iring,
                        ipanel,
                        count,
                        rings.inner_radii[iring],
                        rings.outer_radii[iring],
                        config.margin,
                        &rings.screws,
                        telescope.panel_label(iring, ipanel),
                    ));
                }
            }
            Ok(panels)
        }
        PanelLayout::Polygons(specs) => specs
            .iter()
            .map(|spec| Panel::polygon(config.model, spec))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_panels_ring_order() {
        let vla = TelescopeGeometry::vla();
        let panels = build_panels(&vla, &SurfaceConfig::default()).unwrap();
        assert_eq!(panels.len(), 172);
        assert_eq!(panels[0].label, "1-1");
        assert_eq!(panels[11].label, "1-12");
        assert_eq!(panels[12].label, "2-1");
        assert_eq!(panels[171].label, "6-40");
    }

    #[test]
    fn test_check_shape() {
        let map = DMatrix::<f64>::zeros(4, 5);
        assert!(check_shape("amplitude", &map, (4, 5)).is_ok());
        assert_eq!(
            check_shape("phase", &map, (5, 4)),
            Err(SurfaceError::ShapeMismatch {
                name: "phase",
                expected: (5, 4),
                found: (4, 5)
            })
        );
    }

    #[test]
    fn test_default_config() {
        let config = SurfaceConfig::default();
        assert_eq!(config.cutoff_fraction(), SurfaceConfig::DEFAULT_CUTOFF);
        assert_eq!(config.model, PanelModelKind::Rigid);
        assert!(!config.crop);
    }
}
