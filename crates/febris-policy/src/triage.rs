//! Rule-based emergency triage.
//!
//! Rules are tested in order; the first match decides the alert:
//!
//! 1. RED    temperature ≥ 40.0
//! 2. RED    a symptom contains a critical phrase
//! 3. RED    age < 5 with temperature ≥ 38.5, or the exact symptom
//!           "persistent vomiting" or "drowsiness"
//! 4. YELLOW 38.0 ≤ temperature < 40.0 and duration > 5 days
//! 5. YELLOW a symptom contains a warning phrase
//! 6. YELLOW age ≥ 60, or any listed comorbidity
//! 7. GREEN  otherwise
//!
//! Temperature, age, and duration come from the normalized features so that
//! triage and the model always see the same values. Symptom and comorbidity
//! text comes from the raw input; flag-only requests have no text.

use tracing::debug;

use febris_contracts::{
    features::FeatureVector,
    patient::PatientInput,
    triage::{AlertSeverity, EmergencyAlert},
};
use febris_core::traits::Triage;

pub const CRITICAL_SYMPTOMS: &[&str] = &[
    "difficulty breathing",
    "confusion",
    "convulsions",
    "seizures",
    "unconscious",
    "severe rash",
    "low blood pressure",
    "sepsis",
    "chest pain",
    "severe headache",
    "stiff neck",
    "vomiting blood",
];

pub const WARNING_SYMPTOMS: &[&str] = &[
    "severe pain",
    "rash",
    "persistent vomiting",
    "drowsiness",
    "dehydration",
    "severe chills",
    "weakness",
    "dizziness",
];

/// Symptoms that escalate a young child straight to RED. Matched exactly.
pub const PEDIATRIC_RED_SYMPTOMS: &[&str] = &["persistent vomiting", "drowsiness"];

pub const CRITICAL_TEMPERATURE: f64 = 40.0;
pub const PEDIATRIC_TEMPERATURE: f64 = 38.5;
pub const FEVER_TEMPERATURE: f64 = 38.0;
pub const PEDIATRIC_AGE: f64 = 5.0;
pub const SENIOR_AGE: f64 = 60.0;
pub const PROLONGED_FEVER_DAYS: f64 = 5.0;

pub const EMERGENCY_NUMBERS: &[&str] = &["108", "102"];

#[derive(Debug, Clone, Copy, Default)]
pub struct EmergencyTriage;

impl EmergencyTriage {
    pub fn new() -> Self {
        Self
    }
}

impl Triage for EmergencyTriage {
    fn assess(&self, input: &PatientInput, features: &FeatureVector) -> EmergencyAlert {
        let alert = evaluate(
            features.temperature,
            features.age,
            features.fever_duration,
            input.symptom_texts(),
            input.comorbidity_texts(),
        );
        debug!(severity = ?alert.severity, reason = %alert.reason, "triage assessed");
        alert
    }
}

/// First symptom whose lower-cased text contains any of `phrases`.
fn find_symptom<'a>(symptoms: &'a [String], phrases: &[&str]) -> Option<&'a String> {
    symptoms.iter().find(|s| {
        let lower = s.to_lowercase();
        phrases.iter().any(|p| lower.contains(p))
    })
}

pub fn evaluate(
    temperature: f64,
    age: f64,
    duration: f64,
    symptoms: &[String],
    comorbidities: &[String],
) -> EmergencyAlert {
    if temperature >= CRITICAL_TEMPERATURE {
        return red(
            "EMERGENCY ALERT: Seek medical help now",
            format!("Critical fever: {temperature}°C"),
            [
                "Call emergency services immediately",
                "Remove excess clothing",
                "Apply cool, damp cloths to the forehead",
                "Do not give medication without medical advice",
                "Monitor breathing and consciousness",
            ],
        );
    }

    if let Some(symptom) = find_symptom(symptoms, CRITICAL_SYMPTOMS) {
        return red(
            "EMERGENCY ALERT: Seek medical help now",
            format!("Critical symptom detected: {symptom}"),
            [
                "Call emergency services immediately",
                "Stay with the patient",
                "Monitor breathing and pulse",
                "Be ready to perform CPR if needed",
                "Do not leave the patient alone",
            ],
        );
    }

    let pediatric_symptom = symptoms
        .iter()
        .any(|s| PEDIATRIC_RED_SYMPTOMS.contains(&s.as_str()));
    if age < PEDIATRIC_AGE && (temperature >= PEDIATRIC_TEMPERATURE || pediatric_symptom) {
        return red(
            "EMERGENCY ALERT: Child needs immediate care",
            format!("Young child ({age} years) with concerning symptoms"),
            [
                "Children under 5 need immediate medical attention",
                "Call emergency services now",
                "Keep the child comfortable and hydrated",
                "Monitor temperature every 15 minutes",
                "Be prepared to go to hospital",
            ],
        );
    }

    if (FEVER_TEMPERATURE..CRITICAL_TEMPERATURE).contains(&temperature)
        && duration > PROLONGED_FEVER_DAYS
    {
        return yellow(
            "CAUTION: Consult a doctor today",
            format!("Prolonged fever: {temperature}°C for {duration} days"),
            "Book a doctor appointment",
            [
                "Contact your doctor within 24 hours",
                "Continue monitoring temperature",
                "Maintain hydration",
                "Take prescribed medications as directed",
                "Watch for worsening symptoms",
            ],
        );
    }

    if let Some(symptom) = find_symptom(symptoms, WARNING_SYMPTOMS) {
        return yellow(
            "CAUTION: Medical consultation recommended",
            format!("Warning symptom: {symptom}"),
            "Consult a doctor today",
            [
                "Schedule a medical consultation soon",
                "Monitor symptoms closely",
                "Keep a symptom diary",
                "Stay hydrated and rest",
                "Seek immediate help if symptoms worsen",
            ],
        );
    }

    if age >= SENIOR_AGE || !comorbidities.is_empty() {
        let reason = if age >= SENIOR_AGE {
            format!("Senior patient ({age} years)")
        } else {
            format!("Chronic conditions: {}", comorbidities.join(", "))
        };
        return yellow(
            "CAUTION: Higher risk patient",
            reason,
            "Consult a doctor",
            [
                "Higher risk patients need medical monitoring",
                "Contact your regular doctor",
                "Continue prescribed medications",
                "Monitor symptoms more frequently",
                "Have emergency contacts ready",
            ],
        );
    }

    EmergencyAlert {
        severity: AlertSeverity::Green,
        message: "STABLE: Continue home care".to_string(),
        reason: format!("Manageable fever: {temperature}°C"),
        action: "Monitor at home".to_string(),
        advice: owned(&[
            "Continue the current treatment plan",
            "Monitor temperature twice daily",
            "Stay well hydrated",
            "Get plenty of rest",
            "Contact a doctor if symptoms worsen",
        ]),
        emergency_numbers: Vec::new(),
    }
}

fn red(message: &str, reason: String, advice: [&str; 5]) -> EmergencyAlert {
    EmergencyAlert {
        severity: AlertSeverity::Red,
        message: message.to_string(),
        reason,
        action: format!("Call an ambulance ({})", EMERGENCY_NUMBERS.join("/")),
        advice: owned(&advice),
        emergency_numbers: owned(EMERGENCY_NUMBERS),
    }
}

fn yellow(message: &str, reason: String, action: &str, advice: [&str; 5]) -> EmergencyAlert {
    EmergencyAlert {
        severity: AlertSeverity::Yellow,
        message: message.to_string(),
        reason,
        action: action.to_string(),
        advice: owned(&advice),
        emergency_numbers: Vec::new(),
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
