//! Strata: parameter derivation and soil-profile modeling for
//! subsurface exploration records.
//!
//! Strata turns raw borehole logs and lab/field test results into an
//! engineer-reviewed soil profile: depth strata carrying design
//! parameters derived by competing published correlations, with
//! provenance and confidence tracked per value.
//!
//! # Core Principles
//!
//! - **Multi-method**: every applicable correlation produces a
//!   candidate; reconciliation is explicit and configurable
//! - **Non-destructive**: imported records are never modified, and
//!   resolved values are superseded, never edited in place
//! - **Full provenance**: every candidate, rejection, override, and
//!   re-derivation is retained as queryable state
//!
//! # Example
//!
//! ```no_run
//! use strata::{
//!     ParameterKind, ProfileValidator, ProjectMetadata, Resolver, SegmentationConfig,
//!     SoilProfile, TestRecordStore,
//! };
//!
//! let store = TestRecordStore::new(); // populated by the import adapter
//! let mut profile = SoilProfile::new(ProjectMetadata::new("Riverfront Levee", "24-117"), store);
//!
//! let ids = profile
//!     .segment_borehole("B-1", &[0.0, 6.5, 18.0], &SegmentationConfig::default())
//!     .unwrap();
//!
//! let resolver = Resolver::new();
//! let phi = resolver
//!     .resolve(&mut profile, &ids[0], ParameterKind::FrictionAngle)
//!     .unwrap();
//! println!("phi = {} {} ({})", phi.value, phi.unit, phi.source.label());
//!
//! let findings = ProfileValidator::new().validate(&profile);
//! println!("findings: {}", findings.len());
//! ```
//!
//! The core is single-threaded and free of I/O; import, export, and
//! display are external collaborators. Resolutions of distinct
//! (stratum, parameter) pairs touch disjoint log slots, so a host may
//! run them in parallel as long as re-segmentation is serialized
//! against in-flight resolutions for the same borehole.

pub mod correlation;
pub mod error;
pub mod profile;
pub mod registry;
pub mod resolution;
pub mod segmentation;
pub mod store;
pub mod validation;

pub use correlation::{
    CorrelationMethod, EvaluationContext, MethodId, MethodLibrary, MethodOutcome,
    ParameterCandidate,
};
pub use error::{BoundaryError, MethodError, Result, StrataError};
pub use profile::{ProjectMetadata, SoilProfile};
pub use registry::{Dimension, ParameterKind, ParameterRange, RangeFlag, Registry, Unit};
pub use resolution::{
    OverrideEntry, ParameterHistory, ParameterLog, ParameterSource, RejectedMethod,
    ResolutionConfig, ResolvedParameter, Resolver, TieBreak,
};
pub use segmentation::{samples_within, segment, SegmentationConfig, Stratum};
pub use store::{
    Borehole, DepthInterval, Location, Sample, SoilClass, TestData, TestRecord, TestRecordStore,
    TestType,
};
pub use validation::{
    FindingCounts, FindingKind, ProfileValidator, Severity, ValidationFinding, ValidationSummary,
    ValidatorConfig,
};
