//! Patient-reported input types.
//!
//! These types hold what the client actually sent, after key aliases have
//! been resolved and numbers coerced, but before any defaults are applied.
//! Turning a `PatientInput` into a `FeatureVector` is the normalizer's job.

use serde::{Deserialize, Serialize};

/// How the client described the patient's symptoms.
///
/// The two forms are mutually exclusive: a free-text list always wins, and
/// the direct flags are only consulted when no list was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomReport {
    /// An ordered list of free-text symptom descriptions.
    Described(Vec<String>),

    /// Direct binary flags, already coerced to 0 or 1.
    Flags {
        headache: f64,
        body_ache: f64,
        fatigue: f64,
    },
}

impl Default for SymptomReport {
    fn default() -> Self {
        Self::Flags {
            headache: 0.0,
            body_ache: 0.0,
            fatigue: 0.0,
        }
    }
}

/// Untrusted patient data for a single request.
///
/// `None` means the client did not supply the field under any recognized
/// key; the normalizer substitutes the documented default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Body temperature in °C.
    pub temperature: Option<f64>,
    /// Age in years.
    pub age: Option<f64>,
    /// Fever duration in days.
    pub duration: Option<f64>,
    /// Medication compliance, percent 0–100.
    pub compliance: Option<f64>,
    /// Body mass index.
    pub bmi: Option<f64>,
    pub symptoms: SymptomReport,
    /// Free-text comorbidities, when supplied as a list.
    pub comorbidities: Option<Vec<String>>,
    /// Direct chronic-condition flag (0 or 1), used when no comorbidity
    /// list implies one.
    pub chronic_conditions: Option<f64>,
}

impl PatientInput {
    /// Symptom descriptions, or an empty slice when flags were supplied.
    pub fn symptom_texts(&self) -> &[String] {
        match &self.symptoms {
            SymptomReport::Described(texts) => texts,
            SymptomReport::Flags { .. } => &[],
        }
    }

    /// Comorbidity descriptions, or an empty slice when none were listed.
    pub fn comorbidity_texts(&self) -> &[String] {
        self.comorbidities.as_deref().unwrap_or(&[])
    }
}
