//! Physical unit handling for report outputs.
//!
//! All internal quantities are SI: lengths in meters, angles in radians.
//! Units are only applied at the output boundary (RMS, screw adjustments).

use std::fmt;
use std::str::FromStr;

use crate::error::SurfaceError;

/// Length unit used for RMS values and screw adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    Kilometer,
    Meter,
    Centimeter,
    #[default]
    Millimeter,
    Micrometer,
    /// Thousandths of an inch.
    Mil,
    Inch,
    Foot,
    Yard,
    Mile,
}

impl LengthUnit {
    /// Size of one unit, in meters.
    pub fn meters(self) -> f64 {
        match self {
            LengthUnit::Kilometer => 1e3,
            LengthUnit::Meter => 1.0,
            LengthUnit::Centimeter => 1e-2,
            LengthUnit::Millimeter => 1e-3,
            LengthUnit::Micrometer => 1e-6,
            LengthUnit::Mil => 2.54e-5,
            LengthUnit::Inch => 2.54e-2,
            LengthUnit::Foot => 0.3048,
            LengthUnit::Yard => 0.9144,
            LengthUnit::Mile => 1609.344,
        }
    }

    /// Factor that converts a value in meters into this unit.
    pub fn from_meters(self) -> f64 {
        1.0 / self.meters()
    }

    /// Factor converting values in `self` into `other`.
    pub fn factor_to(self, other: LengthUnit) -> f64 {
        self.meters() / other.meters()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Kilometer => "km",
            LengthUnit::Meter => "m",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Millimeter => "mm",
            LengthUnit::Micrometer => "um",
            LengthUnit::Mil => "mils",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
            LengthUnit::Yard => "yd",
            LengthUnit::Mile => "mi",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "km" => Ok(LengthUnit::Kilometer),
            "m" => Ok(LengthUnit::Meter),
            "cm" => Ok(LengthUnit::Centimeter),
            "mm" => Ok(LengthUnit::Millimeter),
            "um" => Ok(LengthUnit::Micrometer),
            "mils" | "miliinches" => Ok(LengthUnit::Mil),
            "in" => Ok(LengthUnit::Inch),
            "ft" => Ok(LengthUnit::Foot),
            "yd" => Ok(LengthUnit::Yard),
            "mi" => Ok(LengthUnit::Mile),
            other => Err(SurfaceError::UnknownUnit {
                quantity: "length",
                unit: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Angle unit for phase maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Radian,
    Degree,
}

impl AngleUnit {
    /// Factor that converts a value in radians into this unit.
    pub fn from_radians(self) -> f64 {
        match self {
            AngleUnit::Radian => 1.0,
            AngleUnit::Degree => 180.0 / std::f64::consts::PI,
        }
    }
}

impl FromStr for AngleUnit {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rad" => Ok(AngleUnit::Radian),
            "deg" => Ok(AngleUnit::Degree),
            other => Err(SurfaceError::UnknownUnit {
                quantity: "angle",
                unit: other.to_string(),
            }),
        }
    }
}

/// Convert a linear power ratio to decibels.
pub fn to_db(x: f64) -> f64 {
    10.0 * x.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!("mm".parse::<LengthUnit>().unwrap(), LengthUnit::Millimeter);
        assert_eq!("miliinches".parse::<LengthUnit>().unwrap(), LengthUnit::Mil);
        assert_eq!("m".parse::<LengthUnit>().unwrap(), LengthUnit::Meter);
        let err = "furlong".parse::<LengthUnit>().unwrap_err();
        assert!(matches!(err, SurfaceError::UnknownUnit { quantity: "length", .. }));
    }

    #[test]
    fn test_length_conversion() {
        let mm = LengthUnit::Millimeter;
        assert!((mm.from_meters() - 1000.0).abs() < 1e-9);
        assert!((LengthUnit::Inch.factor_to(LengthUnit::Mil) - 1000.0).abs() < 1e-9);
        assert!((LengthUnit::Meter.factor_to(mm) * mm.factor_to(LengthUnit::Meter) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_angle_units() {
        let deg: AngleUnit = "deg".parse().unwrap();
        assert!((std::f64::consts::PI * deg.from_radians() - 180.0).abs() < 1e-12);
        assert!("grad".parse::<AngleUnit>().is_err());
    }

    #[test]
    fn test_to_db() {
        assert!((to_db(100.0) - 20.0).abs() < 1e-12);
        assert!(to_db(1.0).abs() < 1e-15);
    }
}
