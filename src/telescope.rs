//! Telescope geometry: the static mechanical layout of an antenna's main reflector.
//!
//! A [`TelescopeGeometry`] is either ring structured (panels arranged in concentric
//! rings, each ring split into equal angular sectors) or a free list of polygon
//! panels. It is built once and then shared read-only by the surface and its panels.
//!
//! # Coordinate conventions
//!
//! - Aperture coordinates `(x, y)` in meters, origin on the optical axis.
//! - Azimuth measured from the +Y axis, increasing toward +X, wrapped to `[0, 2π)`.
//!   A point at radius `r` and azimuth `φ` sits at `(r·sin φ, r·cos φ)`.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SurfaceError};

/// Convention used to name panels in the screw report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelNumbering {
    /// `"{ring}-{panel}"`, panels counted clockwise from the top (VLA style).
    RingClockwiseTop,
    /// `"{sector}-{ring}{row}"`, sectors counted counterclockwise from the right
    /// (ALMA style, panels of a ring grouped into the sectors of the first ring).
    SectorCounterclockwiseRight,
}

impl FromStr for PanelNumbering {
    type Err = SurfaceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ring, clockwise, top" => Ok(PanelNumbering::RingClockwiseTop),
            "sector, counterclockwise, right" => Ok(PanelNumbering::SectorCounterclockwiseRight),
            other => Err(SurfaceError::UnknownPanelNumbering(other.to_string())),
        }
    }
}

impl fmt::Display for PanelNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelNumbering::RingClockwiseTop => f.write_str("ring, clockwise, top"),
            PanelNumbering::SectorCounterclockwiseRight => {
                f.write_str("sector, counterclockwise, right")
            }
        }
    }
}

/// Logical corner of a ring-sector panel that carries an adjustment screw.
///
/// "Left" is the low-azimuth edge of the panel, "right" the high-azimuth edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrewCorner {
    InnerLeft,
    InnerRight,
    OuterLeft,
    OuterRight,
}

impl ScrewCorner {
    pub fn code(self) -> &'static str {
        match self {
            ScrewCorner::InnerLeft => "il",
            ScrewCorner::InnerRight => "ir",
            ScrewCorner::OuterLeft => "ol",
            ScrewCorner::OuterRight => "or",
        }
    }
}

/// Screw placement on ring-sector panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrewLayout {
    /// Screws in report order.
    pub corners: Vec<ScrewCorner>,
    /// Distance (m) the screws sit inside the true panel corners, both radially
    /// and along the arc.
    pub offset: f64,
}

impl Default for ScrewLayout {
    fn default() -> Self {
        Self {
            corners: vec![
                ScrewCorner::InnerLeft,
                ScrewCorner::InnerRight,
                ScrewCorner::OuterLeft,
                ScrewCorner::OuterRight,
            ],
            offset: 1e-2,
        }
    }
}

/// Concentric-ring panel layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RingLayout {
    /// Inner radius of each ring (m).
    pub inner_radii: Vec<f64>,
    /// Outer radius of each ring (m).
    pub outer_radii: Vec<f64>,
    /// Number of panels in each ring.
    pub panel_counts: Vec<usize>,
    pub numbering: PanelNumbering,
    pub screws: ScrewLayout,
}

impl RingLayout {
    pub fn n_rings(&self) -> usize {
        self.panel_counts.len()
    }

    pub fn n_panels(&self) -> usize {
        self.panel_counts.iter().sum()
    }
}

/// A single panel of a polygon layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonPanelSpec {
    pub label: String,
    /// Full panel outline, vertices in order.
    pub polygon: Vec<[f64; 2]>,
    /// Already-shrunk outline of the region used for fitting.
    pub margin_polygon: Vec<[f64; 2]>,
    /// Screw positions (m).
    pub screws: Vec<[f64; 2]>,
}

/// How the reflector is divided into panels.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelLayout {
    Rings(RingLayout),
    Polygons(Vec<PolygonPanelSpec>),
}

/// Static mechanical description of an antenna.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeGeometry {
    pub name: String,
    /// Dish diameter (m).
    pub diameter: f64,
    /// Primary focal length (m).
    pub focal_length: f64,
    /// Radius (m) inside which the aperture is blocked, e.g. by the subreflector.
    pub inner_limit: f64,
    /// Radius (m) beyond which the aperture is not analyzed.
    pub outer_limit: f64,
    pub layout: PanelLayout,
}

impl TelescopeGeometry {
    /// The VLA 25 m antenna: 6 rings, 172 panels.
    pub fn vla() -> Self {
        Self {
            name: "VLA".to_string(),
            diameter: 25.0,
            focal_length: 8.8,
            inner_limit: 2.0,
            outer_limit: 12.0,
            layout: PanelLayout::Rings(RingLayout {
                inner_radii: vec![1.983, 3.683, 5.563, 7.391, 9.144, 10.87],
                outer_radii: vec![3.683, 5.563, 7.391, 9.144, 10.87, 12.5],
                panel_counts: vec![12, 16, 24, 40, 40, 40],
                numbering: PanelNumbering::RingClockwiseTop,
                screws: ScrewLayout::default(),
            }),
        }
    }

    /// The ALMA 12 m DA antenna: 5 rings grouped into 8 sectors, 120 panels.
    pub fn alma_da() -> Self {
        Self {
            name: "ALMA_DA".to_string(),
            diameter: 12.0,
            focal_length: 4.8,
            inner_limit: 0.75,
            outer_limit: 5.94,
            layout: PanelLayout::Rings(RingLayout {
                inner_radii: vec![0.375, 1.5, 2.5, 3.5, 4.75],
                outer_radii: vec![1.5, 2.5, 3.5, 4.75, 6.0],
                panel_counts: vec![8, 16, 24, 32, 40],
                numbering: PanelNumbering::SectorCounterclockwiseRight,
                screws: ScrewLayout::default(),
            }),
        }
    }

    pub fn is_ringed(&self) -> bool {
        matches!(self.layout, PanelLayout::Rings(_))
    }

    pub fn rings(&self) -> Option<&RingLayout> {
        match &self.layout {
            PanelLayout::Rings(rings) => Some(rings),
            PanelLayout::Polygons(_) => None,
        }
    }

    /// Total number of panels on the surface.
    pub fn n_panels(&self) -> usize {
        match &self.layout {
            PanelLayout::Rings(rings) => rings.n_panels(),
            PanelLayout::Polygons(panels) => panels.len(),
        }
    }

    /// Check the layout for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !(self.diameter > 0.0 && self.focal_length > 0.0) {
            return Err(SurfaceError::InvalidGeometry(
                "diameter and focal length must be positive".to_string(),
            ));
        }
        if self.inner_limit >= self.outer_limit {
            return Err(SurfaceError::InvalidGeometry(format!(
                "inner limit {} must be below outer limit {}",
                self.inner_limit, self.outer_limit
            )));
        }
        match &self.layout {
            PanelLayout::Rings(rings) => {
                let n = rings.n_rings();
                if n == 0 || rings.inner_radii.len() != n || rings.outer_radii.len() != n {
                    return Err(SurfaceError::InvalidGeometry(format!(
                        "ring arrays disagree: {} panel counts, {} inner radii, {} outer radii",
                        n,
                        rings.inner_radii.len(),
                        rings.outer_radii.len()
                    )));
                }
                for iring in 0..n {
                    if rings.panel_counts[iring] == 0 {
                        return Err(SurfaceError::InvalidGeometry(format!(
                            "ring {} has no panels",
                            iring + 1
                        )));
                    }
                    if rings.inner_radii[iring] >= rings.outer_radii[iring] {
                        return Err(SurfaceError::InvalidGeometry(format!(
                            "ring {} inner radius is not below its outer radius",
                            iring + 1
                        )));
                    }
                    if iring > 0 && rings.inner_radii[iring] < rings.outer_radii[iring - 1] {
                        return Err(SurfaceError::InvalidGeometry(format!(
                            "ring {} overlaps ring {}",
                            iring + 1,
                            iring
                        )));
                    }
                }
            }
            PanelLayout::Polygons(panels) => {
                if panels.is_empty() {
                    return Err(SurfaceError::InvalidGeometry(
                        "polygon layout has no panels".to_string(),
                    ));
                }
                for panel in panels {
                    if panel.polygon.len() < 3 || panel.margin_polygon.len() < 3 {
                        return Err(SurfaceError::InvalidGeometry(format!(
                            "panel {} outline needs at least 3 vertices",
                            panel.label
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Human readable label of panel `panel` (0-based) in ring `ring` (0-based).
    ///
    /// Polygon layouts return the label stored with the panel, with `ring` ignored.
    pub fn panel_label(&self, ring: usize, panel: usize) -> String {
        match &self.layout {
            PanelLayout::Rings(rings) => match rings.numbering {
                PanelNumbering::RingClockwiseTop => format!("{}-{}", ring + 1, panel + 1),
                PanelNumbering::SectorCounterclockwiseRight => {
                    sector_label(&rings.panel_counts, ring, panel)
                }
            },
            PanelLayout::Polygons(panels) => panels
                .get(panel)
                .map(|p| p.label.clone())
                .unwrap_or_else(|| format!("{}", panel + 1)),
        }
    }

    /// Index into the flat panel list for 1-based `ring` and `panel` numbers.
    pub fn panel_index(&self, ring: usize, panel: usize) -> Option<usize> {
        if ring == 0 || panel == 0 {
            return None;
        }
        match &self.layout {
            PanelLayout::Rings(rings) => {
                let count = *rings.panel_counts.get(ring - 1)?;
                if panel > count {
                    return None;
                }
                let before: usize = rings.panel_counts[..ring - 1].iter().sum();
                Some(before + panel - 1)
            }
            PanelLayout::Polygons(panels) => (panel <= panels.len()).then(|| panel - 1),
        }
    }
}

/// Sector-based label: the panel's mid-angle picks a sector of the first ring,
/// the position within that sector picks the row.
fn sector_label(panel_counts: &[usize], ring: usize, panel: usize) -> String {
    let n_sectors = panel_counts[0] as f64;
    let n_ring = panel_counts[ring] as f64;
    let angle = TAU / n_ring;
    let sector_angle = TAU / n_sectors;
    let theta = TAU - (panel as f64 + 0.5) * angle;
    let mut sector = ((theta / sector_angle + 1.0 + n_sectors / 4.0) % n_sectors) as usize;
    if sector == 0 {
        sector = panel_counts[0];
    }
    let per_sector = n_ring / n_sectors;
    let row = (per_sector - (panel as f64 % per_sector)) as usize;
    format!("{}-{}{}", sector, ring + 1, row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_parse() {
        assert_eq!(
            "ring, clockwise, top".parse::<PanelNumbering>().unwrap(),
            PanelNumbering::RingClockwiseTop
        );
        assert_eq!(
            "sector, counterclockwise, right".parse::<PanelNumbering>().unwrap(),
            PanelNumbering::SectorCounterclockwiseRight
        );
        let err = "spiral, outward".parse::<PanelNumbering>().unwrap_err();
        assert_eq!(err, SurfaceError::UnknownPanelNumbering("spiral, outward".to_string()));
    }

    #[test]
    fn test_presets_validate() {
        let vla = TelescopeGeometry::vla();
        vla.validate().unwrap();
        assert_eq!(vla.n_panels(), 172);
        assert!(vla.is_ringed());

        let alma = TelescopeGeometry::alma_da();
        alma.validate().unwrap();
        assert_eq!(alma.n_panels(), 120);
    }

    #[test]
    fn test_ring_labels() {
        let vla = TelescopeGeometry::vla();
        assert_eq!(vla.panel_label(0, 0), "1-1");
        assert_eq!(vla.panel_label(1, 11), "2-12");
        assert_eq!(vla.panel_label(5, 39), "6-40");
    }

    #[test]
    fn test_sector_labels() {
        let alma = TelescopeGeometry::alma_da();
        // First ring: one panel per sector, row is always 1.
        let labels: Vec<String> = (0..8).map(|i| alma.panel_label(0, i)).collect();
        for label in &labels {
            assert!(label.ends_with("-11"), "unexpected label {}", label);
        }
        // Sectors of the first ring are all distinct and within [1, 8].
        let mut sectors: Vec<usize> = labels
            .iter()
            .map(|l| l.split('-').next().unwrap().parse().unwrap())
            .collect();
        sectors.sort_unstable();
        assert_eq!(sectors, (1..=8).collect::<Vec<_>>());

        // Second ring has two panels per sector, rows alternate 2, 1.
        assert!(alma.panel_label(1, 0).ends_with("-22"));
        assert!(alma.panel_label(1, 1).ends_with("-21"));
        // Both panels of a sector share the sector number.
        let s0 = alma.panel_label(1, 0).split('-').next().unwrap().to_string();
        let s1 = alma.panel_label(1, 1).split('-').next().unwrap().to_string();
        assert_eq!(s0, s1);
    }

    #[test]
    fn test_panel_index() {
        let vla = TelescopeGeometry::vla();
        assert_eq!(vla.panel_index(1, 1), Some(0));
        assert_eq!(vla.panel_index(2, 2), Some(13));
        assert_eq!(vla.panel_index(6, 40), Some(171));
        assert_eq!(vla.panel_index(6, 41), None);
        assert_eq!(vla.panel_index(0, 1), None);
        assert_eq!(vla.panel_index(7, 1), None);
    }

    #[test]
    fn test_validate_rejects_bad_rings() {
        let mut geometry = TelescopeGeometry::vla();
        if let PanelLayout::Rings(rings) = &mut geometry.layout {
            rings.outer_radii.pop();
        }
        assert!(matches!(
            geometry.validate(),
            Err(SurfaceError::InvalidGeometry(_))
        ));
    }
}
