//! Core type definitions for parameters and units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Design parameter kinds tracked by the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Total (moist) unit weight.
    UnitWeight,
    /// Effective friction angle.
    FrictionAngle,
    /// Undrained shear strength Su.
    UndrainedShearStrength,
    /// Modulus of elasticity.
    ModulusElasticity,
    /// Hydraulic conductivity.
    Permeability,
    /// Preconsolidation pressure Pc.
    PreconsolidationPressure,
    /// Compression index Cc.
    CompressionIndex,
    /// Coefficient of consolidation cv.
    CoefficientConsolidation,
}

impl ParameterKind {
    /// All parameter kinds, in report order.
    pub const ALL: [ParameterKind; 8] = [
        ParameterKind::UnitWeight,
        ParameterKind::FrictionAngle,
        ParameterKind::UndrainedShearStrength,
        ParameterKind::ModulusElasticity,
        ParameterKind::Permeability,
        ParameterKind::PreconsolidationPressure,
        ParameterKind::CompressionIndex,
        ParameterKind::CoefficientConsolidation,
    ];

    /// Stable snake_case identifier, matching the serialized form.
    pub fn id(&self) -> &'static str {
        match self {
            ParameterKind::UnitWeight => "unit_weight",
            ParameterKind::FrictionAngle => "friction_angle",
            ParameterKind::UndrainedShearStrength => "undrained_shear_strength",
            ParameterKind::ModulusElasticity => "modulus_elasticity",
            ParameterKind::Permeability => "permeability",
            ParameterKind::PreconsolidationPressure => "preconsolidation_pressure",
            ParameterKind::CompressionIndex => "compression_index",
            ParameterKind::CoefficientConsolidation => "coefficient_consolidation",
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterKind::UnitWeight => "Unit Weight",
            ParameterKind::FrictionAngle => "Friction Angle",
            ParameterKind::UndrainedShearStrength => "Undrained Shear Strength",
            ParameterKind::ModulusElasticity => "Modulus of Elasticity",
            ParameterKind::Permeability => "Permeability",
            ParameterKind::PreconsolidationPressure => "Preconsolidation Pressure",
            ParameterKind::CompressionIndex => "Compression Index",
            ParameterKind::CoefficientConsolidation => "Coefficient of Consolidation",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Physical dimension of a unit. Conversion is only defined within a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    UnitWeight,
    Angle,
    Stress,
    Velocity,
    ConsolidationRate,
    Length,
    Dimensionless,
}

/// Measurement units used across test records and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    PoundsPerCubicFoot,
    KilonewtonsPerCubicMeter,
    Degrees,
    Radians,
    PoundsPerSquareFoot,
    KipsPerSquareFoot,
    Kilopascals,
    CentimetersPerSecond,
    MetersPerSecond,
    SquareInchesPerMinute,
    SquareCentimetersPerSecond,
    Feet,
    Meters,
    Dimensionless,
}

impl Unit {
    /// The physical dimension this unit measures.
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::PoundsPerCubicFoot | Unit::KilonewtonsPerCubicMeter => Dimension::UnitWeight,
            Unit::Degrees | Unit::Radians => Dimension::Angle,
            Unit::PoundsPerSquareFoot | Unit::KipsPerSquareFoot | Unit::Kilopascals => {
                Dimension::Stress
            }
            Unit::CentimetersPerSecond | Unit::MetersPerSecond => Dimension::Velocity,
            Unit::SquareInchesPerMinute | Unit::SquareCentimetersPerSecond => {
                Dimension::ConsolidationRate
            }
            Unit::Feet | Unit::Meters => Dimension::Length,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Conversion factor from this unit to the dimension's base unit
    /// (pcf, degrees, psf, cm/s, in2/min, ft).
    pub(crate) fn to_base(&self) -> f64 {
        match self {
            Unit::PoundsPerCubicFoot => 1.0,
            // 1 pcf = 0.1571 kN/m3
            Unit::KilonewtonsPerCubicMeter => 1.0 / 0.1571,
            Unit::Degrees => 1.0,
            Unit::Radians => 180.0 / std::f64::consts::PI,
            Unit::PoundsPerSquareFoot => 1.0,
            Unit::KipsPerSquareFoot => 1000.0,
            // 1 psf = 47.88026 Pa
            Unit::Kilopascals => 1000.0 / 47.880_26,
            Unit::CentimetersPerSecond => 1.0,
            Unit::MetersPerSecond => 100.0,
            Unit::SquareInchesPerMinute => 1.0,
            // 1 cm2 = 0.15500031 in2, 1/s = 60/min
            Unit::SquareCentimetersPerSecond => 0.155_000_31 * 60.0,
            Unit::Feet => 1.0,
            Unit::Meters => 3.280_84,
            Unit::Dimensionless => 1.0,
        }
    }

    /// Conventional symbol for reports and error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::PoundsPerCubicFoot => "pcf",
            Unit::KilonewtonsPerCubicMeter => "kN/m3",
            Unit::Degrees => "deg",
            Unit::Radians => "rad",
            Unit::PoundsPerSquareFoot => "psf",
            Unit::KipsPerSquareFoot => "ksf",
            Unit::Kilopascals => "kPa",
            Unit::CentimetersPerSecond => "cm/s",
            Unit::MetersPerSecond => "m/s",
            Unit::SquareInchesPerMinute => "in2/min",
            Unit::SquareCentimetersPerSecond => "cm2/s",
            Unit::Feet => "ft",
            Unit::Meters => "m",
            Unit::Dimensionless => "-",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
