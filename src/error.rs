//! Error taxonomy for surface analysis.
//!
//! Configuration and precondition failures are reported as [`SurfaceError`].
//! Under-determined panel fits are not errors; they are reported through
//! [`FitStatus`](crate::panel::FitStatus) on each panel.

use thiserror::Error;

/// Fatal configuration or precondition error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// The panel numbering convention string is not recognized.
    #[error("unknown panel numbering convention: {0:?}")]
    UnknownPanelNumbering(String),

    /// The panel model kind string is not recognized.
    #[error("unknown panel model kind: {0:?}")]
    UnknownModel(String),

    /// The panel model kind cannot be used with this panel geometry.
    #[error("panel model {model} is not supported for {geometry} panels")]
    UnsupportedModel {
        /// Requested model kind.
        model: &'static str,
        /// Geometry variant that rejected it.
        geometry: &'static str,
    },

    /// A unit string is not recognized for the requested quantity.
    #[error("unknown {quantity} unit: {unit:?}")]
    UnknownUnit {
        /// Quantity kind ("length" or "angle").
        quantity: &'static str,
        /// Offending unit string.
        unit: String,
    },

    /// The input holds more than one spectral channel.
    #[error("only single channel holographies are supported, got {nchan} channels")]
    MultiChannel {
        /// Number of channels supplied.
        nchan: usize,
    },

    /// Map shape does not match the coordinate axes or the other maps.
    #[error("map {name} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        /// Name of the offending map.
        name: &'static str,
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Actual (rows, cols).
        found: (usize, usize),
    },

    /// Telescope geometry is internally inconsistent.
    #[error("invalid telescope geometry: {0}")]
    InvalidGeometry(String),

    /// Corrections were requested before the panels were fitted.
    #[error("panels must be fitted before attempting a correction")]
    NotFitted,
}

/// Result alias for fallible surface operations.
pub type Result<T> = std::result::Result<T, SurfaceError>;
