//! Decision post-processor.
//!
//! `FeverDecisionPolicy` turns a classifier decision and its distribution
//! into the client-facing `DecisionResult`. Every rule here is a fixed
//! function of its inputs; there is no configuration and no I/O.
//!
//! Recovery probability by decision:
//!
//! | decision              | recovery_probability        |
//! |-----------------------|-----------------------------|
//! | `LIKELY_SAFE_TO_STOP` | P(LIKELY_SAFE_TO_STOP)      |
//! | `CONTINUE`            | P(LIKELY_SAFE_TO_STOP)      |
//! | `CONSULT_DOCTOR`      | 1 − P(CONSULT_DOCTOR)       |

use tracing::debug;

use febris_contracts::{
    decision::{Decision, DecisionResult, ProbabilityDistribution, RiskAssessment},
    features::FeatureVector,
};
use febris_core::traits::DecisionPolicy;

pub const ELEVATED_TEMPERATURE: f64 = 38.5;
pub const NORMAL_TEMPERATURE: f64 = 37.5;
pub const HIGH_FEVER_WARNING: f64 = 39.0;
pub const PROLONGED_DURATION: f64 = 7.0;
pub const LOW_COMPLIANCE: f64 = 60.0;
pub const EXCELLENT_COMPLIANCE: f64 = 90.0;
/// More than this many of Headache/Body_Ache/Fatigue counts as "multiple".
pub const MULTIPLE_SYMPTOMS: f64 = 2.0;

pub const STANDARD_FACTORS: &str = "Standard recovery parameters";
pub const DEFAULT_WARNING: &str = "Monitor for any new or worsening symptoms";

/// The stock post-processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeverDecisionPolicy;

impl FeverDecisionPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionPolicy for FeverDecisionPolicy {
    fn postprocess(
        &self,
        decision: Decision,
        probabilities: &ProbabilityDistribution,
        features: &FeatureVector,
        confidence: f64,
    ) -> DecisionResult {
        let result = DecisionResult {
            decision,
            recovery_probability: recovery_probability(decision, probabilities),
            confidence,
            explanation: explanation(decision, features),
            key_factors: key_factors(features),
            risk_assessment: risk_assessment(decision),
            next_steps: next_steps(decision),
            warning_signs: warning_signs(features),
            probabilities: *probabilities,
            input_features: *features,
        };

        debug!(
            decision = %result.decision,
            risk = %result.risk_assessment,
            recovery_probability = result.recovery_probability,
            factors = result.key_factors.len(),
            "decision post-processed"
        );

        result
    }
}

pub fn recovery_probability(decision: Decision, probabilities: &ProbabilityDistribution) -> f64 {
    match decision {
        Decision::LikelySafeToStop | Decision::Continue => {
            probabilities.get(Decision::LikelySafeToStop)
        }
        Decision::ConsultDoctor => 1.0 - probabilities.get(Decision::ConsultDoctor),
    }
}

pub fn risk_assessment(decision: Decision) -> RiskAssessment {
    match decision {
        Decision::ConsultDoctor => RiskAssessment::High,
        Decision::Continue => RiskAssessment::Medium,
        Decision::LikelySafeToStop => RiskAssessment::Low,
    }
}

/// One sentence per decision, quoting temperature, duration, and compliance.
pub fn explanation(decision: Decision, f: &FeatureVector) -> String {
    let (t, d, c) = (f.temperature, f.fever_duration, f.compliance_rate);
    match decision {
        Decision::Continue => format!(
            "With a temperature of {t}°C after {d} days and {c}% medication compliance, \
             the fever is still active: continue the current medication as prescribed."
        ),
        Decision::ConsultDoctor => format!(
            "A temperature of {t}°C over {d} days with {c}% medication compliance needs \
             professional review: consult a doctor before changing the medication."
        ),
        Decision::LikelySafeToStop => format!(
            "Temperature has settled at {t}°C after {d} days with {c}% medication compliance: \
             it is likely safe to stop the medication."
        ),
    }
}

/// Notable inputs, in a fixed order. Each check is independent.
pub fn key_factors(f: &FeatureVector) -> Vec<String> {
    let mut factors = Vec::new();

    if f.temperature > ELEVATED_TEMPERATURE {
        factors.push(format!("Elevated temperature ({}°C)", f.temperature));
    } else if f.temperature < NORMAL_TEMPERATURE {
        factors.push(format!("Normal temperature ({}°C)", f.temperature));
    }

    if f.fever_duration > PROLONGED_DURATION {
        factors.push(format!("Prolonged fever duration ({} days)", f.fever_duration));
    }

    if f.compliance_rate < LOW_COMPLIANCE {
        factors.push(format!("Low medication compliance ({}%)", f.compliance_rate));
    } else if f.compliance_rate > EXCELLENT_COMPLIANCE {
        factors.push(format!("Excellent medication compliance ({}%)", f.compliance_rate));
    }

    if f.has_chronic_conditions() {
        factors.push("Presence of chronic conditions".to_string());
    }

    if f.symptom_count() > MULTIPLE_SYMPTOMS {
        factors.push("Multiple symptoms present".to_string());
    }

    if factors.is_empty() {
        factors.push(STANDARD_FACTORS.to_string());
    }
    factors
}

pub fn next_steps(decision: Decision) -> Vec<String> {
    let steps: [&str; 5] = match decision {
        Decision::Continue => [
            "Continue taking the medication exactly as prescribed",
            "Check and record your temperature every 6 to 8 hours",
            "Drink plenty of fluids and get adequate rest",
            "Do not skip or double doses",
            "Reassess in 24 to 48 hours",
        ],
        Decision::ConsultDoctor => [
            "Contact your doctor or visit a clinic within 24 hours",
            "Bring a record of your temperature readings and doses taken",
            "Do not stop or change the medication without medical advice",
            "Stay hydrated and rest while you arrange the visit",
            "Seek emergency care if symptoms worsen suddenly",
        ],
        Decision::LikelySafeToStop => [
            "Confirm with your doctor before stopping the medication",
            "Keep monitoring your temperature for the next 48 hours",
            "Resume care and contact a doctor if the fever returns",
            "Continue to rest and stay hydrated",
            "Finish any course of antibiotics as prescribed",
        ],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

/// Threshold alerts, in a fixed order. Each check is independent.
pub fn warning_signs(f: &FeatureVector) -> Vec<String> {
    let mut signs = Vec::new();

    if f.temperature > HIGH_FEVER_WARNING {
        signs.push(format!(
            "Temperature above {HIGH_FEVER_WARNING}°C: seek care if it does not respond to medication"
        ));
    }
    if f.fever_duration > PROLONGED_DURATION {
        signs.push(format!(
            "Fever lasting more than {PROLONGED_DURATION} days needs medical evaluation"
        ));
    }
    if f.compliance_rate < LOW_COMPLIANCE {
        signs.push("Low medication compliance may reduce treatment effectiveness".to_string());
    }
    if f.has_chronic_conditions() {
        signs.push("Chronic conditions raise the risk of complications".to_string());
    }

    if signs.is_empty() {
        signs.push(DEFAULT_WARNING.to_string());
    }
    signs
}
