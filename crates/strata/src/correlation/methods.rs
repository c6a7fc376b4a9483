//! The standard correlation methods and their evaluation functions.
//!
//! Values are computed in each parameter's canonical unit: densities in
//! pcf, strengths and pressures in psf, modulus in ksf, friction angles
//! in degrees, permeability in cm/s, cv in in2/min.

use crate::error::MethodError;
use crate::registry::ParameterKind;
use crate::store::{TestData, TestType};

use super::{CorrelationMethod, EvaluationContext, MethodId, MethodOutcome};

/// g/nu for water at 20 C, 1/(cm*s); converts intrinsic permeability in
/// cm2 to hydraulic conductivity in cm/s.
const WATER_G_OVER_NU: f64 = 9.81e4;

pub(super) fn all_methods() -> Vec<CorrelationMethod> {
    vec![
        CorrelationMethod {
            id: MethodId::MeasuredWetDensity,
            parameter: ParameterKind::UnitWeight,
            required_tests: &[TestType::MoistureDensity],
            reference: "ASTM D7263",
            weight: 0.90,
            evaluate: measured_wet_density,
        },
        CorrelationMethod {
            id: MethodId::MoistureAdjustedDryDensity,
            parameter: ParameterKind::UnitWeight,
            required_tests: &[TestType::MoistureDensity],
            reference: "Coduto, Geotechnical Engineering (1999)",
            weight: 0.85,
            evaluate: moisture_adjusted_dry_density,
        },
        CorrelationMethod {
            id: MethodId::TriaxialDrained,
            parameter: ParameterKind::FrictionAngle,
            required_tests: &[TestType::Triaxial],
            reference: "ASTM D4767",
            weight: 0.95,
            evaluate: triaxial_drained,
        },
        CorrelationMethod {
            id: MethodId::DirectShearRegression,
            parameter: ParameterKind::FrictionAngle,
            required_tests: &[TestType::DirectShear],
            reference: "ASTM D3080",
            weight: 0.90,
            evaluate: direct_shear_regression,
        },
        CorrelationMethod {
            id: MethodId::SptPeckHansonThornburn,
            parameter: ParameterKind::FrictionAngle,
            required_tests: &[TestType::Spt],
            reference: "Peck, Hanson, and Thornburn (1974)",
            weight: 0.70,
            evaluate: spt_friction_angle,
        },
        CorrelationMethod {
            id: MethodId::TriaxialUndrained,
            parameter: ParameterKind::UndrainedShearStrength,
            required_tests: &[TestType::Triaxial],
            reference: "ASTM D4767",
            weight: 0.90,
            evaluate: triaxial_undrained,
        },
        CorrelationMethod {
            id: MethodId::UnconfinedCompression,
            parameter: ParameterKind::UndrainedShearStrength,
            required_tests: &[TestType::UnconfinedCompression],
            reference: "ASTM D2166",
            weight: 0.85,
            evaluate: unconfined_compression,
        },
        CorrelationMethod {
            id: MethodId::FieldVane,
            parameter: ParameterKind::UndrainedShearStrength,
            required_tests: &[TestType::FieldVane],
            reference: "ASTM D2573",
            weight: 0.80,
            evaluate: field_vane,
        },
        CorrelationMethod {
            id: MethodId::SptModulus,
            parameter: ParameterKind::ModulusElasticity,
            required_tests: &[TestType::Spt],
            reference: "Bowles (1996)",
            weight: 0.60,
            evaluate: spt_modulus,
        },
        CorrelationMethod {
            id: MethodId::UnconfinedModulus,
            parameter: ParameterKind::ModulusElasticity,
            required_tests: &[TestType::UnconfinedCompression],
            reference: "Duncan and Buchignani (1976)",
            weight: 0.65,
            evaluate: unconfined_modulus,
        },
        CorrelationMethod {
            id: MethodId::LaboratoryPermeability,
            parameter: ParameterKind::Permeability,
            required_tests: &[TestType::Permeability],
            reference: "ASTM D5084",
            weight: 0.90,
            evaluate: laboratory_permeability,
        },
        CorrelationMethod {
            id: MethodId::Hazen,
            parameter: ParameterKind::Permeability,
            required_tests: &[TestType::Gradation],
            reference: "Hazen (1892)",
            weight: 0.70,
            evaluate: hazen,
        },
        CorrelationMethod {
            id: MethodId::KozenyCarman,
            parameter: ParameterKind::Permeability,
            required_tests: &[TestType::Gradation],
            reference: "Kozeny (1927), Carman (1937)",
            weight: 0.50,
            evaluate: kozeny_carman,
        },
        CorrelationMethod {
            id: MethodId::Casagrande,
            parameter: ParameterKind::PreconsolidationPressure,
            required_tests: &[TestType::Consolidation],
            reference: "Casagrande (1936)",
            weight: 0.85,
            evaluate: casagrande,
        },
        CorrelationMethod {
            id: MethodId::OedometerCompression,
            parameter: ParameterKind::CompressionIndex,
            required_tests: &[TestType::Consolidation],
            reference: "ASTM D2435",
            weight: 0.90,
            evaluate: oedometer_compression,
        },
        CorrelationMethod {
            id: MethodId::TerzaghiPeck,
            parameter: ParameterKind::CompressionIndex,
            required_tests: &[TestType::Atterberg],
            reference: "Terzaghi and Peck (1967)",
            weight: 0.50,
            evaluate: terzaghi_peck,
        },
        CorrelationMethod {
            id: MethodId::OedometerConsolidation,
            parameter: ParameterKind::CoefficientConsolidation,
            required_tests: &[TestType::Consolidation],
            reference: "ASTM D2435",
            weight: 0.85,
            evaluate: oedometer_consolidation,
        },
    ]
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn missing(test_type: TestType) -> MethodError {
    MethodError::MissingInput { test_type }
}

/// Measured wet density is the total unit weight directly.
fn measured_wet_density(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::MoistureDensity) {
        if let TestData::MoistureDensity {
            wet_density: Some(wet),
            ..
        } = record.data
        {
            values.push(wet);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::MoistureDensity));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note(format!("mean of {} measured wet densities", values.len())))
}

/// gamma = gamma_d * (1 + w/100) from dry density and natural moisture.
fn moisture_adjusted_dry_density(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::MoistureDensity) {
        if let TestData::MoistureDensity {
            dry_density: Some(dry),
            natural_moisture: Some(moisture),
            ..
        } = record.data
        {
            if moisture < 0.0 {
                return Err(MethodError::out_of_domain(format!(
                    "negative moisture content {moisture}"
                )));
            }
            values.push(dry * (1.0 + moisture / 100.0));
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::MoistureDensity));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note("wet density computed from dry density and moisture content"))
}

/// Mean friction angle across drained triaxial tests.
fn triaxial_drained(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Triaxial) {
        if let TestData::Triaxial {
            friction_angle: Some(phi),
            ..
        } = record.data
        {
            values.push(phi);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::Triaxial));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note(format!("mean of {} drained triaxial tests", values.len())))
}

/// Least-squares fit of tau = c + sigma*tan(phi) over direct shear points.
fn direct_shear_regression(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut points = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::DirectShear) {
        if let TestData::DirectShear {
            normal_stress,
            shear_strength,
        } = record.data
        {
            points.push((normal_stress, shear_strength));
            inputs.push(record.id.clone());
        }
    }
    if points.len() < 2 {
        return Err(MethodError::out_of_domain(format!(
            "at least two direct shear points required, got {}",
            points.len()
        )));
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < 1e-10 {
        return Err(MethodError::numeric(
            "direct shear points share a single normal stress",
        ));
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let phi = slope.atan().to_degrees();

    Ok(MethodOutcome::new(phi)
        .with_inputs(inputs)
        .with_note(format!("least-squares fit over {} points", points.len())))
}

/// phi = 28 + 15*log10(N), granular soils only.
fn spt_friction_angle(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    match ctx.classification() {
        Some(class) if class.is_granular() => {}
        Some(class) => {
            return Err(MethodError::out_of_domain(format!(
                "SPT friction angle correlation applies to granular soils, stratum is {class}"
            )));
        }
        None => {
            return Err(MethodError::out_of_domain(
                "stratum has no classification; SPT correlation requires a granular soil",
            ));
        }
    }

    let (n_value, inputs) = mean_spt_n(ctx)?;
    if n_value <= 0.0 {
        return Err(MethodError::out_of_domain(format!(
            "non-positive N-value {n_value}"
        )));
    }

    let phi = 28.0 + 15.0 * n_value.log10();
    let mut outcome = MethodOutcome::new(phi)
        .with_inputs(inputs)
        .with_note(format!("phi = 28 + 15*log10(N) for N = {n_value:.1}"));
    if n_value < 10.0 {
        // Low blow counts correlate poorly.
        outcome = outcome.with_weight_scale(0.6 / 0.7);
    }
    Ok(outcome)
}

/// Mean peak strength across undrained triaxial tests.
fn triaxial_undrained(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Triaxial) {
        if let TestData::Triaxial { peak_strength, .. } = record.data {
            values.push(peak_strength);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::Triaxial));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note(format!("mean of {} undrained triaxial tests", values.len())))
}

/// Su = qu / 2.
fn unconfined_compression(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::UnconfinedCompression) {
        if let TestData::UnconfinedCompression { qu } = record.data {
            if qu <= 0.0 {
                return Err(MethodError::out_of_domain(format!(
                    "non-positive unconfined strength {qu}"
                )));
            }
            values.push(qu / 2.0);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::UnconfinedCompression));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note("Su = qu/2"))
}

/// Vane shear strength taken directly.
fn field_vane(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::FieldVane) {
        if let TestData::FieldVane { undrained_strength } = record.data {
            values.push(undrained_strength);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::FieldVane));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note(format!("mean of {} vane tests", values.len())))
}

/// E = 500*N ksf for granular soils, E = 300*N for fine-grained.
fn spt_modulus(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let (n_value, inputs) = mean_spt_n(ctx)?;
    if n_value <= 0.0 {
        return Err(MethodError::out_of_domain(format!(
            "non-positive N-value {n_value}"
        )));
    }

    let granular = ctx.classification().is_some_and(|c| c.is_granular());
    let (coefficient, note) = if granular {
        (500.0, "E = 500*N for granular soils")
    } else {
        (300.0, "E = 300*N for fine-grained soils")
    };

    let mut outcome = MethodOutcome::new(coefficient * n_value)
        .with_inputs(inputs)
        .with_note(note);
    if !granular {
        outcome = outcome.with_weight_scale(0.5 / 0.6);
    }
    Ok(outcome)
}

/// E = 300*qu for fine-grained soils.
fn unconfined_modulus(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    if ctx.classification().is_some_and(|c| c.is_granular()) {
        return Err(MethodError::out_of_domain(
            "qu-modulus correlation applies to fine-grained soils",
        ));
    }

    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::UnconfinedCompression) {
        if let TestData::UnconfinedCompression { qu } = record.data {
            if qu <= 0.0 {
                return Err(MethodError::out_of_domain(format!(
                    "non-positive unconfined strength {qu}"
                )));
            }
            // qu in psf, modulus in ksf.
            values.push(300.0 * qu / 1000.0);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::UnconfinedCompression));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note("E = 300*qu, mid-range of the published 100-500 band"))
}

/// Direct laboratory measurement; vertical conductivity governs seepage
/// and is preferred when both orientations were tested.
fn laboratory_permeability(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut vertical = Vec::new();
    let mut horizontal = Vec::new();
    let mut vertical_inputs = Vec::new();
    let mut horizontal_inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Permeability) {
        if let TestData::Permeability {
            horizontal: h,
            vertical: v,
        } = record.data
        {
            if let Some(v) = v {
                vertical.push(v);
                vertical_inputs.push(record.id.clone());
            }
            if let Some(h) = h {
                horizontal.push(h);
                horizontal_inputs.push(record.id.clone());
            }
        }
    }

    if !vertical.is_empty() {
        Ok(MethodOutcome::new(mean(&vertical))
            .with_inputs(vertical_inputs)
            .with_note(format!(
                "mean of {} vertical measurements",
                vertical.len()
            )))
    } else if !horizontal.is_empty() {
        Ok(MethodOutcome::new(mean(&horizontal))
            .with_inputs(horizontal_inputs)
            .with_note(format!(
                "mean of {} horizontal measurements (no vertical data)",
                horizontal.len()
            )))
    } else {
        Err(missing(TestType::Permeability))
    }
}

/// k = C*(d10)^2 for clean sands; C = 100 with d10 in cm gives cm/s.
fn hazen(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    match ctx.classification() {
        Some(class) if matches!(class, crate::store::SoilClass::Sw | crate::store::SoilClass::Sp) => {}
        Some(class) => {
            return Err(MethodError::out_of_domain(format!(
                "Hazen formula applies to clean sands (SW/SP), stratum is {class}"
            )));
        }
        None => {
            return Err(MethodError::out_of_domain(
                "stratum has no classification; Hazen requires a clean sand",
            ));
        }
    }

    let mut d10_values = Vec::new();
    let mut cu_values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Gradation) {
        if let TestData::Gradation {
            fines_percent,
            d10,
            cu,
            ..
        } = record.data
        {
            if fines_percent.unwrap_or(100.0) >= 5.0 {
                return Err(MethodError::out_of_domain(
                    "Hazen formula requires less than 5% fines",
                ));
            }
            if let Some(d10) = d10 {
                d10_values.push(d10);
                inputs.push(record.id.clone());
            }
            if let Some(cu) = cu {
                cu_values.push(cu);
            }
        }
    }
    if d10_values.is_empty() {
        return Err(missing(TestType::Gradation));
    }

    let d10 = mean(&d10_values);
    if d10 <= 0.0 {
        return Err(MethodError::out_of_domain(format!("non-positive d10 {d10}")));
    }
    let d10_cm = d10 / 10.0;
    let k = 100.0 * d10_cm * d10_cm;

    let mut outcome = MethodOutcome::new(k)
        .with_inputs(inputs)
        .with_note(format!("k = 100*d10^2 for d10 = {d10} mm"));
    // Well-sorted sands (Cu < 5) fit the correlation best.
    if !cu_values.iter().any(|&cu| cu < 5.0) {
        outcome = outcome.with_weight_scale(0.6 / 0.7);
    }
    Ok(outcome)
}

/// Kozeny-Carman with porosity estimated from the USCS group.
fn kozeny_carman(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut d10_values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Gradation) {
        if let TestData::Gradation {
            gravel_percent: Some(_),
            sand_percent: Some(_),
            fines_percent: Some(_),
            d10: Some(d10),
            ..
        } = record.data
        {
            d10_values.push(d10);
            inputs.push(record.id.clone());
        }
    }
    if d10_values.is_empty() {
        return Err(missing(TestType::Gradation));
    }

    let d10 = mean(&d10_values);
    if d10 <= 0.0 {
        return Err(MethodError::out_of_domain(format!("non-positive d10 {d10}")));
    }

    let (porosity, porosity_note) = match ctx.classification() {
        Some(class) => (class.typical_porosity(), format!("porosity {} assumed for {class}", class.typical_porosity())),
        None => (0.40, "porosity 0.40 assumed (unclassified)".to_string()),
    };

    let d10_cm = d10 / 10.0;
    let k = WATER_G_OVER_NU * d10_cm * d10_cm * porosity.powi(3)
        / (180.0 * (1.0 - porosity).powi(2));

    Ok(MethodOutcome::new(k)
        .with_inputs(inputs)
        .with_note(porosity_note))
}

/// Preconsolidation pressure from oedometer curves.
fn casagrande(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    consolidation_field(ctx, |data| match data {
        TestData::Consolidation {
            preconsolidation_pressure,
            ..
        } => *preconsolidation_pressure,
        _ => None,
    })
}

/// Compression index measured in the oedometer.
fn oedometer_compression(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    consolidation_field(ctx, |data| match data {
        TestData::Consolidation {
            compression_index, ..
        } => *compression_index,
        _ => None,
    })
}

/// Cc = 0.009*(LL - 10) from the liquid limit.
fn terzaghi_peck(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Atterberg) {
        if let TestData::Atterberg {
            liquid_limit: Some(ll),
            ..
        } = record.data
        {
            values.push(ll);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::Atterberg));
    }

    let ll = mean(&values);
    if ll <= 10.0 {
        return Err(MethodError::out_of_domain(format!(
            "liquid limit {ll} at or below the correlation floor of 10"
        )));
    }
    Ok(MethodOutcome::new(0.009 * (ll - 10.0))
        .with_inputs(inputs)
        .with_note(format!("Cc = 0.009*(LL - 10) for LL = {ll:.1}")))
}

/// Coefficient of consolidation measured in the oedometer.
fn oedometer_consolidation(ctx: &EvaluationContext) -> Result<MethodOutcome, MethodError> {
    consolidation_field(ctx, |data| match data {
        TestData::Consolidation {
            coefficient_consolidation,
            ..
        } => *coefficient_consolidation,
        _ => None,
    })
}

fn consolidation_field(
    ctx: &EvaluationContext,
    extract: fn(&TestData) -> Option<f64>,
) -> Result<MethodOutcome, MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Consolidation) {
        if let Some(value) = extract(&record.data) {
            values.push(value);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::Consolidation));
    }
    Ok(MethodOutcome::new(mean(&values))
        .with_inputs(inputs)
        .with_note(format!("mean of {} consolidation tests", values.len())))
}

fn mean_spt_n(ctx: &EvaluationContext) -> Result<(f64, Vec<String>), MethodError> {
    let mut values = Vec::new();
    let mut inputs = Vec::new();
    for record in ctx.records_of_type(TestType::Spt) {
        if let TestData::Spt { n_value } = record.data {
            values.push(n_value);
            inputs.push(record.id.clone());
        }
    }
    if values.is_empty() {
        return Err(missing(TestType::Spt));
    }
    Ok((mean(&values), inputs))
}
