//! The three validation scenarios a trained artifact is tuned against.

use serde_json::{json, Value};

use febris_contracts::decision::Decision;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub payload: Value,
    pub expected: Decision,
}

pub fn validation_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "active fever, good compliance",
            payload: json!({
                "Temperature": 39.2,
                "Age": 28,
                "BMI": 24.5,
                "Fever_Duration": 3,
                "Compliance_Rate": 85,
                "Headache": 1,
                "Body_Ache": 1,
                "Fatigue": 1,
                "Chronic_Conditions": 0
            }),
            expected: Decision::Continue,
        },
        Scenario {
            name: "low compliance",
            payload: json!({
                "Temperature": 38.0,
                "Age": 35,
                "BMI": 26.0,
                "Fever_Duration": 4,
                "Compliance_Rate": 60,
                "Headache": 1,
                "Body_Ache": 0,
                "Fatigue": 0,
                "Chronic_Conditions": 0
            }),
            expected: Decision::ConsultDoctor,
        },
        Scenario {
            name: "fever resolved",
            payload: json!({
                "Temperature": 37.1,
                "Age": 25,
                "BMI": 22.0,
                "Fever_Duration": 7,
                "Compliance_Rate": 95,
                "Headache": 0,
                "Body_Ache": 0,
                "Fatigue": 0,
                "Chronic_Conditions": 0
            }),
            expected: Decision::LikelySafeToStop,
        },
    ]
}
