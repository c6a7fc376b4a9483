//! Profile validation: geological and numeric consistency checks over a
//! resolved profile.

mod finding;
mod validator;

pub use finding::{FindingCounts, FindingKind, Severity, ValidationFinding, ValidationSummary};
pub use validator::{ProfileValidator, ValidatorConfig};
