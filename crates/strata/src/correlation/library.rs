//! Registered correlation methods with per-deployment weight overrides.

use std::collections::HashMap;

use crate::error::MethodError;
use crate::registry::{ParameterKind, Registry};

use super::methods::all_methods;
use super::{build_candidate, CorrelationMethod, EvaluationContext, MethodId, ParameterCandidate};

/// The set of correlation methods available to the resolver.
#[derive(Debug, Clone)]
pub struct MethodLibrary {
    methods: Vec<CorrelationMethod>,
    weight_overrides: HashMap<MethodId, f64>,
}

impl MethodLibrary {
    /// The standard library: every published method at its default
    /// confidence weight.
    pub fn standard() -> Self {
        Self {
            methods: all_methods(),
            weight_overrides: HashMap::new(),
        }
    }

    /// Override a method's confidence weight for this deployment.
    pub fn with_weight(mut self, id: MethodId, weight: f64) -> Self {
        self.weight_overrides.insert(id, weight);
        self
    }

    /// All registered methods.
    pub fn methods(&self) -> &[CorrelationMethod] {
        &self.methods
    }

    /// Look up a method by id.
    pub fn get(&self, id: MethodId) -> Option<&CorrelationMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Methods that estimate the given parameter kind.
    pub fn for_parameter(
        &self,
        kind: ParameterKind,
    ) -> impl Iterator<Item = &CorrelationMethod> {
        self.methods.iter().filter(move |m| m.parameter == kind)
    }

    /// The effective base weight of a method, after any override.
    pub fn weight_of(&self, method: &CorrelationMethod) -> f64 {
        self.weight_overrides
            .get(&method.id)
            .copied()
            .unwrap_or(method.weight)
    }

    /// Evaluate one method against a stratum, producing a range-flagged
    /// candidate.
    pub fn evaluate(
        &self,
        method: &CorrelationMethod,
        ctx: &EvaluationContext,
        registry: &Registry,
    ) -> Result<ParameterCandidate, MethodError> {
        let outcome = (method.evaluate)(ctx)?;
        Ok(build_candidate(method, self.weight_of(method), outcome, registry))
    }
}

impl Default for MethodLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::Stratum;
    use crate::store::{DepthInterval, Sample, SoilClass, TestData, TestRecord};

    #[test]
    fn test_standard_library_covers_every_parameter() {
        let library = MethodLibrary::standard();
        for kind in ParameterKind::ALL {
            assert!(
                library.for_parameter(kind).count() > 0,
                "no method registered for {kind}"
            );
        }
    }

    #[test]
    fn test_weight_override() {
        let library =
            MethodLibrary::standard().with_weight(MethodId::SptPeckHansonThornburn, 0.4);
        let method = library.get(MethodId::SptPeckHansonThornburn).unwrap();
        assert_eq!(library.weight_of(method), 0.4);

        let untouched = library.get(MethodId::TriaxialDrained).unwrap();
        assert_eq!(library.weight_of(untouched), 0.95);
    }

    #[test]
    fn test_evaluate_builds_range_flagged_candidate() {
        let library = MethodLibrary::standard();
        let registry = Registry::standard();

        let stratum = Stratum::new("B-1", DepthInterval::new(0.0, 10.0))
            .with_classification(SoilClass::Sw);
        let sample = Sample::new("s_1", DepthInterval::new(4.0, 6.0), "sand").with_record(
            TestRecord::new(
                "tr_1",
                "s_1",
                DepthInterval::new(4.0, 5.5),
                TestData::Spt { n_value: 20.0 },
            ),
        );
        let ctx = EvaluationContext::new(&stratum, vec![&sample]);

        let method = library.get(MethodId::SptPeckHansonThornburn).unwrap();
        let candidate = library.evaluate(method, &ctx, registry).unwrap();

        // 47.5 degrees exceeds the published 45-degree ceiling: returned
        // and flagged, not clamped.
        assert!(candidate.value > 45.0);
        assert!(!candidate.is_in_range());
        assert_eq!(candidate.inputs, vec!["tr_1"]);
        assert_eq!(candidate.weight, 0.70);
    }
}
