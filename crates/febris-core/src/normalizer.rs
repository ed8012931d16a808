//! Feature normalizer: loosely-shaped patient payload → `FeatureVector`.
//!
//! Normalization runs in two steps:
//!
//! 1. [`parse_payload`] resolves key aliases and coerces values into a typed
//!    `PatientInput`. This is the only step that can fail, and only with
//!    `FebrisError::InvalidInput` when a supplied value is not numeric.
//! 2. [`normalize`] applies defaults and symptom matching. It is total.
//!
//! Aliases are tried in table order and the first key present with a
//! non-null value wins.

use serde_json::{Map, Value};
use tracing::debug;

use febris_contracts::{
    error::{FebrisError, FebrisResult},
    features::FeatureVector,
    patient::{PatientInput, SymptomReport},
};

pub const DEFAULT_TEMPERATURE: f64 = 37.0;
pub const DEFAULT_AGE: f64 = 30.0;
pub const DEFAULT_DURATION: f64 = 3.0;
pub const DEFAULT_COMPLIANCE: f64 = 80.0;

/// Candidate keys per logical field, highest priority first.
pub const TEMPERATURE_KEYS: &[&str] = &["temperature", "Temperature"];
pub const AGE_KEYS: &[&str] = &["age", "Age"];
pub const DURATION_KEYS: &[&str] = &["duration", "Fever_Duration", "fever_duration"];
pub const COMPLIANCE_KEYS: &[&str] = &["compliance", "Compliance_Rate", "compliance_rate"];
pub const BMI_KEYS: &[&str] = &["BMI", "bmi"];
pub const HEADACHE_KEYS: &[&str] = &["Headache"];
pub const BODY_ACHE_KEYS: &[&str] = &["Body_Ache"];
pub const FATIGUE_KEYS: &[&str] = &["Fatigue"];
pub const CHRONIC_KEYS: &[&str] = &["Chronic_Conditions"];

pub const SYMPTOMS_KEY: &str = "symptoms";
pub const COMORBIDITIES_KEY: &str = "comorbidities";

/// Substrings that set each symptom flag when matched against the
/// lower-cased, space-joined symptom list.
///
/// "ache" also matches "headache", so a headache alone sets `Body_Ache` too.
const HEADACHE_TERMS: &[&str] = &["headache"];
const BODY_ACHE_TERMS: &[&str] = &["body", "ache", "pain"];
const FATIGUE_TERMS: &[&str] = &["fatigue", "tired", "weak"];

/// BMI estimate used when the client does not report one.
pub fn default_bmi(age: f64) -> f64 {
    22.0 + (age - 30.0) * 0.1
}

/// Resolve aliases and coerce values into a `PatientInput`.
///
/// `payload` must be a JSON object. Unknown keys are ignored.
pub fn parse_payload(payload: &Value) -> FebrisResult<PatientInput> {
    let fields = payload.as_object().ok_or_else(|| {
        FebrisError::invalid_input("patientData", "expected a JSON object of patient fields")
    })?;

    let symptoms = match fields.get(SYMPTOMS_KEY) {
        Some(Value::Array(items)) => SymptomReport::Described(text_list(SYMPTOMS_KEY, items)?),
        _ => SymptomReport::Flags {
            headache: flag(fields, HEADACHE_KEYS)?.unwrap_or(0.0),
            body_ache: flag(fields, BODY_ACHE_KEYS)?.unwrap_or(0.0),
            fatigue: flag(fields, FATIGUE_KEYS)?.unwrap_or(0.0),
        },
    };

    let comorbidities = match fields.get(COMORBIDITIES_KEY) {
        Some(Value::Array(items)) => Some(text_list(COMORBIDITIES_KEY, items)?),
        _ => None,
    };

    Ok(PatientInput {
        temperature: number(fields, TEMPERATURE_KEYS)?,
        age: number(fields, AGE_KEYS)?,
        duration: number(fields, DURATION_KEYS)?,
        compliance: number(fields, COMPLIANCE_KEYS)?,
        bmi: number(fields, BMI_KEYS)?,
        symptoms,
        comorbidities,
        chronic_conditions: flag(fields, CHRONIC_KEYS)?,
    })
}

/// Apply defaults and symptom matching. Never fails.
pub fn normalize(input: &PatientInput) -> FeatureVector {
    let age = input.age.unwrap_or(DEFAULT_AGE);

    let (headache, body_ache, fatigue) = match &input.symptoms {
        SymptomReport::Described(texts) => {
            let joined = texts.join(" ").to_lowercase();
            (
                matches_any(&joined, HEADACHE_TERMS),
                matches_any(&joined, BODY_ACHE_TERMS),
                matches_any(&joined, FATIGUE_TERMS),
            )
        }
        SymptomReport::Flags {
            headache,
            body_ache,
            fatigue,
        } => (to_flag(*headache), to_flag(*body_ache), to_flag(*fatigue)),
    };

    let chronic_conditions = match &input.comorbidities {
        Some(list) if !list.is_empty() => 1.0,
        _ => input.chronic_conditions.map(to_flag).unwrap_or(0.0),
    };

    FeatureVector {
        temperature: input.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        age,
        bmi: input.bmi.unwrap_or_else(|| default_bmi(age)),
        fever_duration: input.duration.unwrap_or(DEFAULT_DURATION),
        compliance_rate: input.compliance.unwrap_or(DEFAULT_COMPLIANCE),
        headache,
        body_ache,
        fatigue,
        chronic_conditions,
    }
}

/// `parse_payload` followed by `normalize`.
pub fn normalize_payload(payload: &Value) -> FebrisResult<(PatientInput, FeatureVector)> {
    let input = parse_payload(payload)?;
    let features = normalize(&input);
    debug!(?features, "normalized patient payload");
    Ok((input, features))
}

// ── Coercion helpers ──────────────────────────────────────────────────────────

/// First alias present with a non-null value.
fn resolve<'v>(fields: &'v Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'v Value)> {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
}

fn number(fields: &Map<String, Value>, keys: &[&'static str]) -> FebrisResult<Option<f64>> {
    resolve(fields, keys)
        .map(|(key, value)| coerce_number(key, value))
        .transpose()
}

fn flag(fields: &Map<String, Value>, keys: &[&'static str]) -> FebrisResult<Option<f64>> {
    Ok(number(fields, keys)?.map(to_flag))
}

/// Accepts JSON numbers, booleans, and numeric strings. Rejects anything
/// that does not yield a finite value.
fn coerce_number(key: &str, value: &Value) -> FebrisResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(FebrisError::invalid_input(
            key,
            format!("expected a finite number, got {value}"),
        )),
    }
}

fn text_list(key: &str, items: &[Value]) -> FebrisResult<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                FebrisError::invalid_input(format!("{key}[{idx}]"), format!("expected text, got {item}"))
            })
        })
        .collect()
}

fn to_flag(x: f64) -> f64 {
    if x != 0.0 {
        1.0
    } else {
        0.0
    }
}

fn matches_any(haystack: &str, terms: &[&str]) -> f64 {
    if terms.iter().any(|t| haystack.contains(t)) {
        1.0
    } else {
        0.0
    }
}
