//! Error types for the strata library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{ParameterKind, Unit};
use crate::store::TestType;

/// Rejection reasons for stratum boundary sequences.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryError {
    /// Fewer than two boundary depths were supplied.
    #[error("at least two boundary depths are required, got {count}")]
    TooFew { count: usize },

    /// Boundaries must be strictly increasing with depth.
    #[error("boundary depths must be strictly increasing: {value} at position {index}")]
    NotIncreasing { index: usize, value: f64 },

    /// A boundary falls outside the borehole's logged depth range.
    #[error("boundary {value} lies outside the logged depth range 0-{logged_depth}")]
    OutsideLoggedRange { value: f64, logged_depth: f64 },
}

/// Failure of a single correlation method.
///
/// These are caught and recorded per-candidate inside the resolver;
/// one failing method never aborts resolution of a parameter.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MethodError {
    /// No qualifying test record of the required type.
    #[error("no qualifying {test_type} record in stratum")]
    MissingInput { test_type: TestType },

    /// An input measurement is outside the method's domain.
    #[error("input out of domain: {message}")]
    InputOutOfDomain { message: String },

    /// The empirical formula failed numerically.
    #[error("numeric failure: {message}")]
    NumericFailure { message: String },
}

impl MethodError {
    /// Shorthand for an out-of-domain input.
    pub fn out_of_domain(message: impl Into<String>) -> Self {
        MethodError::InputOutOfDomain {
            message: message.into(),
        }
    }

    /// Shorthand for a numeric failure.
    pub fn numeric(message: impl Into<String>) -> Self {
        MethodError::NumericFailure {
            message: message.into(),
        }
    }
}

/// Main error type for strata operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrataError {
    /// Units are dimensionally incompatible.
    #[error("cannot convert {from} to {to}: incompatible dimensions")]
    UnitMismatch { from: Unit, to: Unit },

    /// A stratum boundary sequence was rejected.
    #[error("invalid stratum boundaries: {0}")]
    InvalidBoundary(#[from] BoundaryError),

    /// A correlation method failed.
    #[error("correlation method failed: {0}")]
    Method(#[from] MethodError),

    /// No correlation method produced a candidate.
    #[error("no candidate for {parameter} in stratum '{stratum}'")]
    Unresolvable {
        stratum: String,
        parameter: ParameterKind,
    },

    /// Borehole id not present in the record store.
    #[error("unknown borehole '{0}'")]
    UnknownBorehole(String),

    /// Stratum id not present in the profile.
    #[error("unknown stratum '{0}'")]
    UnknownStratum(String),
}

/// Result type alias for strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;
