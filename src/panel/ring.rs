//! Ring-sector panels: an annular sector bounded by two radii and two azimuths.

use std::f64::consts::TAU;

use crate::telescope::{ScrewCorner, ScrewLayout};

/// Annular sector geometry of a panel on a ringed dish.
///
/// Azimuths follow the crate convention (from +Y toward +X). A margin fraction
/// `m` shrinks the fit region by `m·(outer − inner)` radially and by `m·α`
/// angularly on each side, `α` being the panel's angular width.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSector {
    /// Ring index (0-based).
    pub ring: usize,
    /// Panel index within the ring (0-based).
    pub index: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Start azimuth (rad).
    pub theta1: f64,
    /// End azimuth (rad).
    pub theta2: f64,
    /// Mid azimuth (rad).
    pub zeta: f64,
    margin_inner: f64,
    margin_outer: f64,
    margin_theta1: f64,
    margin_theta2: f64,
}

impl RingSector {
    /// Sector `index` of a ring with `n_panels` equal panels.
    pub fn new(
        ring: usize,
        index: usize,
        n_panels: usize,
        inner_radius: f64,
        outer_radius: f64,
        margin: f64,
    ) -> Self {
        let angle = TAU / n_panels as f64;
        let theta1 = index as f64 * angle;
        let theta2 = (index + 1) as f64 * angle;
        let width = outer_radius - inner_radius;
        Self {
            ring,
            index,
            inner_radius,
            outer_radius,
            theta1,
            theta2,
            zeta: (index as f64 + 0.5) * angle,
            margin_inner: inner_radius + margin * width,
            margin_outer: outer_radius - margin * width,
            margin_theta1: theta1 + margin * angle,
            margin_theta2: theta2 - margin * angle,
        }
    }

    /// Centre of the sector at mid radius and mid azimuth.
    pub fn center(&self) -> [f64; 2] {
        let rt = 0.5 * (self.inner_radius + self.outer_radius);
        [rt * self.zeta.sin(), rt * self.zeta.cos()]
    }

    /// Returns `(is_sample, is_inside)`; all bounds are inclusive.
    pub fn contains(&self, radius: f64, azimuth: f64) -> (bool, bool) {
        let inside = radius >= self.inner_radius
            && radius <= self.outer_radius
            && azimuth >= self.theta1
            && azimuth <= self.theta2;
        let sample = inside
            && radius >= self.margin_inner
            && radius <= self.margin_outer
            && azimuth >= self.margin_theta1
            && azimuth <= self.margin_theta2;
        (sample, inside)
    }

    /// Screw positions for `layout`, moved inwards from the true corners by the
    /// layout offset, radially and along the arc.
    pub fn screws(&self, layout: &ScrewLayout) -> Vec<[f64; 2]> {
        layout
            .corners
            .iter()
            .map(|corner| {
                let (radius, theta, rsign, asign) = match corner {
                    ScrewCorner::InnerLeft => (self.inner_radius, self.theta1, 1.0, 1.0),
                    ScrewCorner::InnerRight => (self.inner_radius, self.theta2, 1.0, -1.0),
                    ScrewCorner::OuterLeft => (self.outer_radius, self.theta1, -1.0, 1.0),
                    ScrewCorner::OuterRight => (self.outer_radius, self.theta2, -1.0, -1.0),
                };
                let r = radius + rsign * layout.offset;
                let phi = theta + asign * layout.offset / r;
                [r * phi.sin(), r * phi.cos()]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector() -> RingSector {
        // 12 panels: 30° wide, panel 1 spans [30°, 60°].
        RingSector::new(0, 1, 12, 2.0, 4.0, 0.2)
    }

    #[test]
    fn test_bounds() {
        let s = sector();
        assert!((s.theta1 - 30f64.to_radians()).abs() < 1e-12);
        assert!((s.theta2 - 60f64.to_radians()).abs() < 1e-12);
        assert!((s.zeta - 45f64.to_radians()).abs() < 1e-12);
        let c = s.center();
        assert!((c[0] - 3.0 * 45f64.to_radians().sin()).abs() < 1e-12);
        assert!((c[1] - c[0]).abs() < 1e-12);
    }

    #[test]
    fn test_contains_sample_margin_outside() {
        let s = sector();
        let mid = 45f64.to_radians();
        assert_eq!(s.contains(3.0, mid), (true, true));
        // Radial margin: 2.0 + 0.2·2.0 = 2.4
        assert_eq!(s.contains(2.2, mid), (false, true));
        // Angular margin: 30° + 6° = 36°
        assert_eq!(s.contains(3.0, 33f64.to_radians()), (false, true));
        assert_eq!(s.contains(4.5, mid), (false, false));
        assert_eq!(s.contains(3.0, 90f64.to_radians()), (false, false));
    }

    #[test]
    fn test_boundaries_inclusive() {
        let s = sector();
        let mid = 45f64.to_radians();
        // Exactly on the fit-region edge counts as sample.
        assert_eq!(s.contains(s.margin_inner, mid), (true, true));
        assert_eq!(s.contains(3.0, s.margin_theta2), (true, true));
        // Exactly on the outer panel edge counts as inside.
        assert_eq!(s.contains(4.0, mid), (false, true));
        assert_eq!(s.contains(3.0, s.theta1), (false, true));
    }

    #[test]
    fn test_screws_inside_panel() {
        let s = sector();
        let screws = s.screws(&ScrewLayout::default());
        assert_eq!(screws.len(), 4);
        for screw in &screws {
            let r = screw[0].hypot(screw[1]);
            let phi = screw[0].atan2(screw[1]).rem_euclid(TAU);
            let (_, inside) = s.contains(r, phi);
            assert!(inside, "screw {:?} outside its panel", screw);
        }
        // Inner-left screw sits 1 cm above the inner radius.
        let r_il = screws[0][0].hypot(screws[0][1]);
        assert!((r_il - 2.01).abs() < 1e-12);
    }
}
