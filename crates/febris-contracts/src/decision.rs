//! Decision, probability, and result types.
//!
//! A `Prediction` is what the classifier says. A `DecisionResult` is what the
//! post-processor derives from it, and `PredictionResponse` is the envelope
//! handed back to the transport layer.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::triage::EmergencyAlert;

/// Tolerance used when checking that a distribution sums to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Static disclaimer attached to every response.
pub const DISCLAIMER: &str = "This is an AI-assisted recommendation and not a clinical diagnosis. \
Always consult a qualified healthcare professional before changing or stopping medication.";

/// The recommended action. Closed set; nothing else is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Continue,
    ConsultDoctor,
    LikelySafeToStop,
}

impl Decision {
    /// Every variant, in declaration order.
    pub const ALL: [Decision; 3] = [
        Decision::Continue,
        Decision::ConsultDoctor,
        Decision::LikelySafeToStop,
    ];

    /// The wire label, e.g. `"CONSULT_DOCTOR"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "CONTINUE",
            Self::ConsultDoctor => "CONSULT_DOCTOR",
            Self::LikelySafeToStop => "LIKELY_SAFE_TO_STOP",
        }
    }

    /// Parse a wire label. Case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == label)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAssessment {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Probability mass per decision.
///
/// Serializes as an object keyed by the decision labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityDistribution {
    #[serde(rename = "CONTINUE")]
    pub continue_medication: f64,
    #[serde(rename = "CONSULT_DOCTOR")]
    pub consult_doctor: f64,
    #[serde(rename = "LIKELY_SAFE_TO_STOP")]
    pub likely_safe_to_stop: f64,
}

impl ProbabilityDistribution {
    /// Build a distribution from `(decision, probability)` pairs.
    ///
    /// Decisions that do not appear get zero mass; a repeated decision keeps
    /// the last value.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Decision, f64)>) -> Self {
        let mut dist = Self {
            continue_medication: 0.0,
            consult_doctor: 0.0,
            likely_safe_to_stop: 0.0,
        };
        for (decision, p) in pairs {
            match decision {
                Decision::Continue => dist.continue_medication = p,
                Decision::ConsultDoctor => dist.consult_doctor = p,
                Decision::LikelySafeToStop => dist.likely_safe_to_stop = p,
            }
        }
        dist
    }

    /// Probability assigned to `decision`.
    pub fn get(&self, decision: Decision) -> f64 {
        match decision {
            Decision::Continue => self.continue_medication,
            Decision::ConsultDoctor => self.consult_doctor,
            Decision::LikelySafeToStop => self.likely_safe_to_stop,
        }
    }

    /// Sum of all three probabilities.
    pub fn total(&self) -> f64 {
        self.continue_medication + self.consult_doctor + self.likely_safe_to_stop
    }

    /// True when every entry is in [0, 1] and the total is one within
    /// [`PROBABILITY_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        Decision::ALL
            .iter()
            .all(|d| (0.0..=1.0).contains(&self.get(*d)))
            && (self.total() - 1.0).abs() <= PROBABILITY_TOLERANCE
    }
}

/// Raw classifier output for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub decision: Decision,
    pub probabilities: ProbabilityDistribution,
    /// Maximum probability in the distribution.
    pub confidence: f64,
}

/// The post-processed decision returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub recovery_probability: f64,
    pub confidence: f64,
    pub explanation: String,
    pub key_factors: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub next_steps: Vec<String>,
    pub warning_signs: Vec<String>,
    pub probabilities: ProbabilityDistribution,
    pub input_features: FeatureVector,
}

/// Response envelope: the decision result, the triage alert, and the
/// disclaimer, serialized flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub result: DecisionResult,
    pub emergency_alert: EmergencyAlert,
    pub disclaimer: String,
}

impl PredictionResponse {
    pub fn new(result: DecisionResult, emergency_alert: EmergencyAlert) -> Self {
        Self {
            result,
            emergency_alert,
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}
