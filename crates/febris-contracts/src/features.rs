//! The canonical feature vector.
//!
//! `FeatureVector` is the only contract between the normalizer and the
//! classifier. It always carries exactly nine named values in the order
//! given by [`FEATURE_NAMES`]; the model artifact must declare the same order.

use serde::{Deserialize, Serialize};

use crate::error::{FebrisError, FebrisResult};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 9;

/// Canonical feature names, in classifier column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Temperature",
    "Age",
    "BMI",
    "Fever_Duration",
    "Compliance_Rate",
    "Headache",
    "Body_Ache",
    "Fatigue",
    "Chronic_Conditions",
];

/// Normalized patient features.
///
/// Binary fields (`headache` through `chronic_conditions`) are always exactly
/// 0.0 or 1.0. Serializes with the canonical names, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Fever_Duration")]
    pub fever_duration: f64,
    #[serde(rename = "Compliance_Rate")]
    pub compliance_rate: f64,
    #[serde(rename = "Headache")]
    pub headache: f64,
    #[serde(rename = "Body_Ache")]
    pub body_ache: f64,
    #[serde(rename = "Fatigue")]
    pub fatigue: f64,
    #[serde(rename = "Chronic_Conditions")]
    pub chronic_conditions: f64,
}

impl FeatureVector {
    /// Values in canonical order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.age,
            self.bmi,
            self.fever_duration,
            self.compliance_rate,
            self.headache,
            self.body_ache,
            self.fatigue,
            self.chronic_conditions,
        ]
    }

    /// Look up a feature by its canonical name.
    ///
    /// Returns `FebrisError::MissingField` for a name outside [`FEATURE_NAMES`].
    pub fn value_of(&self, name: &str) -> FebrisResult<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.to_array()[idx])
            .ok_or_else(|| FebrisError::MissingField {
                field: name.to_string(),
            })
    }

    /// Build a classifier row following `order`.
    ///
    /// `order` is normally the feature list declared by the model artifact,
    /// which has already been checked against [`FEATURE_NAMES`] at load time.
    pub fn row_for(&self, order: &[String]) -> FebrisResult<Vec<f64>> {
        order.iter().map(|name| self.value_of(name)).collect()
    }

    /// Number of symptom flags set (0–3).
    pub fn symptom_count(&self) -> f64 {
        self.headache + self.body_ache + self.fatigue
    }

    /// True when the chronic-condition flag is set.
    pub fn has_chronic_conditions(&self) -> bool {
        self.chronic_conditions == 1.0
    }
}
