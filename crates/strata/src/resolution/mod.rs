//! Parameter resolution: candidate reconciliation, manual overrides,
//! and the append-only audit history.

mod history;
mod resolver;

pub use history::{
    OverrideEntry, ParameterHistory, ParameterLog, ParameterSource, RejectedMethod,
    ResolvedParameter,
};
pub use resolver::{ResolutionConfig, Resolver, TieBreak};
