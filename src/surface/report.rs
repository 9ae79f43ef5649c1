//! Outputs for downstream consumers: the screw adjustment report and the
//! packaged surface products.

use std::path::Path;

use anyhow::Context;
use nalgebra::{DMatrix, Scalar};
use rkyv::{Archive, Deserialize, Serialize};
use tracing::info;

use crate::units::LengthUnit;

use super::AntennaSurface;

/// Fit results of one panel, screw adjustments in meters.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct PanelRecord {
    pub label: String,
    pub params: Vec<f64>,
    pub screw_adjustments_m: Vec<f64>,
    /// True when the fit was under-determined or singular.
    pub degenerate: bool,
}

/// Everything a persistence layer needs to store for one surface.
///
/// Maps are flattened row-major with shape `[rows, cols]`.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct SurfaceProducts {
    pub telescope_name: String,
    pub antenna_name: String,
    pub wavelength: f64,
    pub panel_kind: String,
    pub panel_margin: f64,
    pub cutoff: f64,
    pub shape: [u32; 2],
    pub u_axis: Vec<f64>,
    pub v_axis: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub phase: Vec<f64>,
    pub deviation: Vec<f64>,
    pub mask: Vec<bool>,
    pub corrections: Option<Vec<f64>>,
    pub residuals: Option<Vec<f64>>,
    pub phase_corrections: Option<Vec<f64>>,
    pub phase_residuals: Option<Vec<f64>>,
    /// RMS (m) before correction.
    pub input_rms: f64,
    /// RMS (m) after correction.
    pub output_rms: Option<f64>,
    /// Gain (dB) before correction.
    pub input_gain: f64,
    /// Gain (dB) after correction.
    pub output_gain: Option<f64>,
    pub theoretical_gain: f64,
    /// Per-panel results, empty before fitting.
    pub panels: Vec<PanelRecord>,
}

fn row_major<T: Scalar + Copy>(map: &DMatrix<T>) -> Vec<T> {
    map.transpose().iter().copied().collect()
}

impl AntennaSurface {
    /// Screw adjustment report for every panel, in `unit`.
    pub fn screw_report(&self, unit: LengthUnit) -> String {
        let mut out = format!(
            "Screw adjustments for {} {} antenna\n",
            self.telescope.name, self.antenna_name
        );
        out.push_str(&format!("Adjustments are in {}\n\n\n", unit));
        out.push_str(&format!(
            "{}{:22}{:22}\n",
            " ".repeat(25),
            "Inner Edge",
            "Outer Edge"
        ));
        let id_columns = if self.telescope.is_ringed() {
            format!("{:8}{:8}", "Ring", "panel")
        } else {
            format!("{:16}", "Panel")
        };
        out.push_str(&format!(
            "{}{}{}{:11}{:11}{:11}{:11}\n",
            " ".repeat(5),
            id_columns,
            " ".repeat(2),
            "left",
            "right",
            "left",
            "right"
        ));
        for panel in self.panels() {
            out.push_str(&panel.export_adjustments(unit));
            out.push('\n');
        }
        out
    }

    /// Write the screw adjustment report to `path`.
    pub fn write_screw_report<P: AsRef<Path>>(&self, path: P, unit: LengthUnit) -> anyhow::Result<()> {
        let path = path.as_ref();
        let report = self.screw_report(unit);
        std::fs::write(path, &report)
            .with_context(|| format!("writing screw report to {}", path.display()))?;
        info!("Wrote screw adjustments to {}", path.display());
        Ok(())
    }

    /// Package maps, metrics and panel results.
    pub fn export_products(&self) -> SurfaceProducts {
        let rms = self.rms(LengthUnit::Meter);
        let gains = self.gains();
        let corrected = self.corrections();
        let panels = if self.state() == super::SurfaceState::Constructed {
            Vec::new()
        } else {
            self.panels()
                .iter()
                .map(|p| PanelRecord {
                    label: p.label.clone(),
                    params: p.params().to_vec(),
                    screw_adjustments_m: p.screw_adjustments(LengthUnit::Meter),
                    degenerate: p.status().is_degenerate(),
                })
                .collect()
        };
        SurfaceProducts {
            telescope_name: self.telescope.name.clone(),
            antenna_name: self.antenna_name.clone(),
            wavelength: self.wavelength,
            panel_kind: self.config.model.name().to_string(),
            panel_margin: self.config.margin,
            cutoff: self.cut,
            shape: [self.u_axis.len() as u32, self.v_axis.len() as u32],
            u_axis: self.u_axis.clone(),
            v_axis: self.v_axis.clone(),
            amplitude: row_major(&self.amplitude),
            phase: row_major(&self.phase),
            deviation: row_major(&self.deviation),
            mask: row_major(&self.mask),
            corrections: corrected.map(|c| row_major(&c.corrections)),
            residuals: corrected.map(|c| row_major(&c.residuals)),
            phase_corrections: corrected.map(|c| row_major(&c.phase_corrections)),
            phase_residuals: corrected.map(|c| row_major(&c.phase_residuals)),
            input_rms: rms.before,
            output_rms: rms.after,
            input_gain: gains.before,
            output_gain: gains.after,
            theoretical_gain: gains.theoretical,
            panels,
        }
    }
}

impl SurfaceProducts {
    /// Serialize with rkyv.
    pub fn to_rkyv_bytes(&self) -> Vec<u8> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .expect("rkyv serialization failed")
            .to_vec()
    }

    pub fn from_rkyv_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| anyhow::anyhow!("rkyv deserialization failed: {}", e))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes = self.to_rkyv_bytes();
        std::fs::write(path, &bytes)
            .with_context(|| format!("writing surface products to {}", path.display()))?;
        info!("Saved surface products to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading surface products from {}", path.display()))?;
        Self::from_rkyv_bytes(&bytes)
    }

    /// Rebuild a stored map as a matrix.
    pub fn map(&self, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.shape[0] as usize, self.shape[1] as usize, data)
    }
}
