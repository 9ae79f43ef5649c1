//! # holopanel
//!
//! Reflector **panel fitting and screw adjustments** from radio-telescope
//! holography aperture maps.
//!
//! Given an aperture amplitude map and a phase (or surface deviation) map from a
//! holography measurement, `holopanel` splits the dish into its physical panels,
//! fits a surface model to each panel, and reports the screw adjustments that
//! bring every panel back onto the ideal paraboloid, together with the surface
//! RMS and aperture gain before and after correction.
//!
//! ## Features
//!
//! - **Ringed and polygon layouts**: concentric-ring dishes (VLA, ALMA presets)
//!   or explicit panel outlines
//! - **Five surface models**: mean, rigid (tilted plane), xy-paraboloid,
//!   rotated paraboloid, co-rotated paraboloid
//! - **Margins**: pixels near panel edges are corrected but excluded from the fit
//! - **Degenerate fits are data**: under-determined panels get NaN parameters and
//!   a [`FitStatus`] instead of an error
//! - **Products**: maps, metrics and per-panel results serialize with
//!   [rkyv](https://docs.rs/rkyv)
//!
//! ## Example
//!
//! ```no_run
//! use holopanel::{
//!     AntennaSurface, ApertureInput, LengthUnit, PanelModelKind, Spectral, SurfaceConfig,
//!     SurfaceMap, TelescopeGeometry,
//! };
//! use nalgebra::DMatrix;
//!
//! let n = 256;
//! let step = 26.0 / n as f64;
//! let axis: Vec<f64> = (0..n).map(|i| (i as f64 - n as f64 / 2.0) * step).collect();
//! let input = ApertureInput {
//!     antenna_name: "ea01".to_string(),
//!     amplitude: DMatrix::from_element(n, n, 1.0),
//!     surface: SurfaceMap::Deviation(DMatrix::zeros(n, n)),
//!     u_axis: axis.clone(),
//!     v_axis: axis,
//!     spectral: Spectral::Wavelength(0.0128),
//!     aperture_points: None,
//! };
//!
//! let config = SurfaceConfig {
//!     model: PanelModelKind::Rigid,
//!     ..Default::default()
//! };
//! let mut surface = AntennaSurface::new(input, &TelescopeGeometry::vla(), config).unwrap();
//! surface.fit_surface();
//! surface.correct_surface().unwrap();
//!
//! let rms = surface.rms(LengthUnit::Millimeter);
//! println!("RMS {:.3} mm -> {:.3} mm", rms.before, rms.after.unwrap());
//! print!("{}", surface.screw_report(LengthUnit::Millimeter));
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Grid**: polar coordinates for every pixel; azimuth from +Y toward +X
//! 2. **Mask**: amplitude cutoff, blocked centre, outer rim, NaN pixels
//! 3. **Assignment**: each masked pixel goes to the first panel containing it,
//!    as a fit sample or as an edge margin
//! 4. **Fit**: per-panel linear least squares (SVD)
//! 5. **Correct**: model values subtracted from the deviation map; phase
//!    products follow from the deviation ↔ phase relation
//! 6. **Metrics**: masked RMS and Ruze-style gain

pub mod error;
pub mod model;
pub mod panel;
pub mod surface;
pub mod telescope;
pub mod units;

pub use error::SurfaceError;
pub use model::{FitStatus, PanelModelKind, SurfaceModel};
pub use panel::{Panel, PanelDiagnostics, PanelGeometry, PanelPoint, PanelPosition};
pub use surface::report::{PanelRecord, SurfaceProducts};
pub use surface::{
    AntennaSurface, ApertureInput, AssignmentSummary, Corrections, GainReport, RmsReport,
    Spectral, SurfaceConfig, SurfaceMap, SurfaceState,
};
pub use telescope::{
    PanelLayout, PanelNumbering, PolygonPanelSpec, RingLayout, ScrewCorner, ScrewLayout,
    TelescopeGeometry,
};
pub use units::{AngleUnit, LengthUnit};
