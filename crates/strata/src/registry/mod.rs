//! Canonical units and valid numeric ranges per design parameter.
//!
//! The registry is an immutable configuration object passed explicitly to
//! the resolver and validator, so profiles interpreted under different
//! regional range standards can coexist without shared mutable state.

mod types;

pub use types::{Dimension, ParameterKind, Unit};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Valid numeric range for a parameter, in its canonical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    /// Check whether a value falls inside the range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Whether a candidate value falls inside the registry's published range.
///
/// Out-of-range values are flagged, never clamped or discarded, so the
/// engineer can see and judge them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFlag {
    InRange,
    OutOfRange,
}

/// Canonical unit and valid range for one parameter kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub unit: Unit,
    pub range: ParameterRange,
}

/// Registry of canonical units and published parameter ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    entries: IndexMap<ParameterKind, ParameterSpec>,
}

impl Registry {
    /// Create an empty registry. Use [`Registry::with_parameter`] to populate.
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The standard registry, with ranges from published geotechnical
    /// literature. Deployments with regional standards build their own.
    pub fn standard() -> &'static Registry {
        static STANDARD: Lazy<Registry> = Lazy::new(|| {
            Registry::empty()
                .with_parameter(ParameterKind::UnitWeight, Unit::PoundsPerCubicFoot, 80.0, 150.0)
                .with_parameter(ParameterKind::FrictionAngle, Unit::Degrees, 15.0, 45.0)
                .with_parameter(
                    ParameterKind::UndrainedShearStrength,
                    Unit::PoundsPerSquareFoot,
                    0.0,
                    5000.0,
                )
                .with_parameter(
                    ParameterKind::ModulusElasticity,
                    Unit::KipsPerSquareFoot,
                    1000.0,
                    100_000.0,
                )
                .with_parameter(
                    ParameterKind::Permeability,
                    Unit::CentimetersPerSecond,
                    1e-9,
                    1e-3,
                )
                .with_parameter(
                    ParameterKind::PreconsolidationPressure,
                    Unit::PoundsPerSquareFoot,
                    500.0,
                    20_000.0,
                )
                .with_parameter(ParameterKind::CompressionIndex, Unit::Dimensionless, 0.01, 2.0)
                .with_parameter(
                    ParameterKind::CoefficientConsolidation,
                    Unit::SquareInchesPerMinute,
                    1e-5,
                    1e-1,
                )
        });
        &STANDARD
    }

    /// Add or replace the spec for a parameter kind.
    pub fn with_parameter(mut self, kind: ParameterKind, unit: Unit, min: f64, max: f64) -> Self {
        self.entries.insert(
            kind,
            ParameterSpec {
                unit,
                range: ParameterRange { min, max },
            },
        );
        self
    }

    /// The canonical unit candidates and resolved values are expressed in.
    ///
    /// Panics if the kind is not registered; the standard registry covers
    /// every [`ParameterKind`].
    pub fn canonical_unit(&self, kind: ParameterKind) -> Unit {
        self.entries[&kind].unit
    }

    /// The published valid range for a parameter kind, in its canonical unit.
    pub fn valid_range(&self, kind: ParameterKind) -> ParameterRange {
        self.entries[&kind].range
    }

    /// Convert a value between units of the same dimension.
    pub fn convert(&self, value: f64, from: Unit, to: Unit) -> Result<f64> {
        if from.dimension() != to.dimension() {
            return Err(StrataError::UnitMismatch { from, to });
        }
        Ok(value * from.to_base() / to.to_base())
    }

    /// Flag a value against the published range for its kind.
    pub fn classify(&self, kind: ParameterKind, value: f64) -> RangeFlag {
        if self.valid_range(kind).contains(value) {
            RangeFlag::InRange
        } else {
            RangeFlag::OutOfRange
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_all_kinds() {
        let registry = Registry::standard();
        for kind in ParameterKind::ALL {
            let range = registry.valid_range(kind);
            assert!(range.min < range.max, "degenerate range for {kind}");
        }
    }

    #[test]
    fn test_canonical_units() {
        let registry = Registry::standard();
        assert_eq!(
            registry.canonical_unit(ParameterKind::UnitWeight),
            Unit::PoundsPerCubicFoot
        );
        assert_eq!(
            registry.canonical_unit(ParameterKind::Permeability),
            Unit::CentimetersPerSecond
        );
    }

    #[test]
    fn test_convert_within_dimension() {
        let registry = Registry::standard();
        let ksf = registry
            .convert(2000.0, Unit::PoundsPerSquareFoot, Unit::KipsPerSquareFoot)
            .unwrap();
        assert!((ksf - 2.0).abs() < 1e-12);

        let deg = registry
            .convert(std::f64::consts::PI, Unit::Radians, Unit::Degrees)
            .unwrap();
        assert!((deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_round_trip() {
        let registry = Registry::standard();
        let kpa = registry
            .convert(1500.0, Unit::PoundsPerSquareFoot, Unit::Kilopascals)
            .unwrap();
        let back = registry
            .convert(kpa, Unit::Kilopascals, Unit::PoundsPerSquareFoot)
            .unwrap();
        assert!((back - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_across_dimensions_fails() {
        let registry = Registry::standard();
        let err = registry
            .convert(10.0, Unit::Feet, Unit::Degrees)
            .unwrap_err();
        assert!(matches!(err, StrataError::UnitMismatch { .. }));
    }

    #[test]
    fn test_classify_flags_never_clamps() {
        let registry = Registry::standard();
        assert_eq!(
            registry.classify(ParameterKind::FrictionAngle, 30.0),
            RangeFlag::InRange
        );
        assert_eq!(
            registry.classify(ParameterKind::FrictionAngle, 47.5),
            RangeFlag::OutOfRange
        );
        assert_eq!(
            registry.classify(ParameterKind::FrictionAngle, 14.9),
            RangeFlag::OutOfRange
        );
    }

    #[test]
    fn test_custom_registry_overrides_range() {
        let registry = Registry::empty().with_parameter(
            ParameterKind::FrictionAngle,
            Unit::Degrees,
            20.0,
            50.0,
        );
        assert_eq!(
            registry.classify(ParameterKind::FrictionAngle, 47.5),
            RangeFlag::InRange
        );
    }
}
