//! # febris-core
//!
//! The request pipeline of the Febris fever decision-support service.
//!
//! This crate provides:
//! - The three trait seams (`Classifier`, `DecisionPolicy`, `Triage`)
//! - The feature normalizer (payload → `FeatureVector`)
//! - The `Predictor`, which guards the feature contract at load time
//! - The `InferenceService` that wires everything together per request
//! - `ServiceConfig`, the TOML-backed service configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use febris_core::{InferenceService, Predictor};
//!
//! let predictor = Predictor::new(Arc::new(artifact))?;
//! let service = InferenceService::new(predictor, Box::new(policy), Box::new(triage));
//! let response = service.analyze(&request_json)?;
//! ```

pub mod config;
pub mod normalizer;
pub mod predictor;
pub mod service;
pub mod traits;

pub use config::ServiceConfig;
pub use predictor::Predictor;
pub use service::InferenceService;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use febris_contracts::{
        decision::{Decision, DecisionResult, ProbabilityDistribution, RiskAssessment},
        error::{FebrisError, FebrisResult},
        features::{FeatureVector, FEATURE_NAMES},
        patient::{PatientInput, SymptomReport},
        triage::{AlertSeverity, EmergencyAlert},
    };

    use crate::normalizer::{normalize, normalize_payload, parse_payload};
    use crate::traits::{argmax, Classifier, DecisionPolicy, Triage};
    use crate::{InferenceService, Predictor, ServiceConfig};

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// A classifier that returns a fixed distribution and counts calls.
    /// With `failure` set it errors instead.
    struct FixedClassifier {
        names: Vec<String>,
        classes: Vec<Decision>,
        output: Vec<f64>,
        failure: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(output: Vec<f64>) -> Self {
            Self {
                names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                classes: vec![
                    Decision::ConsultDoctor,
                    Decision::Continue,
                    Decision::LikelySafeToStop,
                ],
                output,
                failure: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                failure: Some(reason.to_string()),
                ..Self::new(vec![])
            }
        }
    }

    impl Classifier for FixedClassifier {
        fn feature_names(&self) -> &[String] {
            &self.names
        }
        fn classes(&self) -> &[Decision] {
            &self.classes
        }
        fn predict_proba(&self, row: &[f64]) -> FebrisResult<Vec<f64>> {
            assert_eq!(row.len(), FEATURE_NAMES.len());
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.failure {
                Some(reason) => Err(FebrisError::ConfigError {
                    reason: reason.clone(),
                }),
                None => Ok(self.output.clone()),
            }
        }
    }

    /// Echoes the prediction back with placeholder text.
    struct EchoPolicy;

    impl DecisionPolicy for EchoPolicy {
        fn postprocess(
            &self,
            decision: Decision,
            probabilities: &ProbabilityDistribution,
            features: &FeatureVector,
            confidence: f64,
        ) -> DecisionResult {
            DecisionResult {
                decision,
                recovery_probability: probabilities.get(Decision::LikelySafeToStop),
                confidence,
                explanation: "echo".to_string(),
                key_factors: vec![],
                risk_assessment: RiskAssessment::Medium,
                next_steps: vec![],
                warning_signs: vec![],
                probabilities: *probabilities,
                input_features: *features,
            }
        }
    }

    /// Counts `postprocess` calls, otherwise behaves like `EchoPolicy`.
    struct CountingPolicy {
        calls: Arc<AtomicUsize>,
    }

    impl DecisionPolicy for CountingPolicy {
        fn postprocess(
            &self,
            decision: Decision,
            probabilities: &ProbabilityDistribution,
            features: &FeatureVector,
            confidence: f64,
        ) -> DecisionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            EchoPolicy.postprocess(decision, probabilities, features, confidence)
        }
    }

    struct GreenTriage;

    impl Triage for GreenTriage {
        fn assess(&self, _input: &PatientInput, _features: &FeatureVector) -> EmergencyAlert {
            EmergencyAlert {
                severity: AlertSeverity::Green,
                message: "stable".to_string(),
                reason: "test".to_string(),
                action: "none".to_string(),
                advice: vec![],
                emergency_numbers: vec![],
            }
        }
    }

    fn service_with(classifier: Arc<FixedClassifier>) -> InferenceService {
        let predictor = Predictor::new(classifier).unwrap();
        InferenceService::new(predictor, Box::new(EchoPolicy), Box::new(GreenTriage))
    }

    // ── 1. Normalizer defaults ────────────────────────────────────────────────

    #[test]
    fn empty_payload_uses_documented_defaults() {
        let (_, f) = normalize_payload(&json!({})).unwrap();
        assert_eq!(f.temperature, 37.0);
        assert_eq!(f.age, 30.0);
        assert_eq!(f.bmi, 22.0);
        assert_eq!(f.fever_duration, 3.0);
        assert_eq!(f.compliance_rate, 80.0);
        assert_eq!(f.headache, 0.0);
        assert_eq!(f.body_ache, 0.0);
        assert_eq!(f.fatigue, 0.0);
        assert_eq!(f.chronic_conditions, 0.0);
    }

    #[test]
    fn default_bmi_tracks_age() {
        let (_, f) = normalize_payload(&json!({ "age": 50 })).unwrap();
        assert!((f.bmi - 24.0).abs() < 1e-9);

        let (_, f) = normalize_payload(&json!({ "Age": 20, "bmi": 19.5 })).unwrap();
        assert_eq!(f.bmi, 19.5);
    }

    #[test]
    fn normalize_is_total_over_typed_input() {
        let f = normalize(&PatientInput::default());
        assert_eq!(f.to_array().len(), FEATURE_NAMES.len());
        assert!(f.to_array().iter().all(|v| v.is_finite()));
    }

    // ── 2. Alias resolution ───────────────────────────────────────────────────

    #[test]
    fn first_alias_in_table_order_wins() {
        let payload = json!({
            "Temperature": 36.6,
            "temperature": 39.1,
            "fever_duration": 9,
            "Fever_Duration": 5,
            "compliance_rate": 40,
            "Compliance_Rate": 70,
        });
        let (_, f) = normalize_payload(&payload).unwrap();
        assert_eq!(f.temperature, 39.1);
        assert_eq!(f.fever_duration, 5.0);
        assert_eq!(f.compliance_rate, 70.0);
    }

    #[test]
    fn null_values_fall_through_to_next_alias() {
        let (_, f) = normalize_payload(&json!({ "duration": null, "Fever_Duration": 6 })).unwrap();
        assert_eq!(f.fever_duration, 6.0);
    }

    #[test]
    fn numeric_strings_and_booleans_are_coerced() {
        let payload = json!({
            "temperature": " 38.4 ",
            "Headache": true,
            "Body_Ache": "0",
            "Fatigue": 2,
        });
        let (_, f) = normalize_payload(&payload).unwrap();
        assert_eq!(f.temperature, 38.4);
        assert_eq!(f.headache, 1.0);
        assert_eq!(f.body_ache, 0.0);
        assert_eq!(f.fatigue, 1.0);
    }

    #[test]
    fn non_numeric_temperature_is_invalid_input() {
        match parse_payload(&json!({ "temperature": "hot" })) {
            Err(FebrisError::InvalidInput { field, reason }) => {
                assert_eq!(field, "temperature");
                assert!(reason.contains("hot"), "unexpected reason: {reason}");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        assert!(matches!(
            parse_payload(&json!({ "Age": "NaN" })),
            Err(FebrisError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_payload(&json!({ "compliance": "inf" })),
            Err(FebrisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn non_object_payload_is_invalid_input() {
        assert!(matches!(
            parse_payload(&json!([1, 2, 3])),
            Err(FebrisError::InvalidInput { .. })
        ));
    }

    // ── 3. Symptom and comorbidity handling ───────────────────────────────────

    #[test]
    fn symptom_text_matching_is_case_insensitive() {
        let (_, f) = normalize_payload(&json!({ "symptoms": ["Feeling TIRED", "Joint Pain"] })).unwrap();
        assert_eq!(f.headache, 0.0);
        assert_eq!(f.body_ache, 1.0);
        assert_eq!(f.fatigue, 1.0);
    }

    #[test]
    fn headache_text_also_sets_body_ache() {
        let (_, f) = normalize_payload(&json!({ "symptoms": ["headache"] })).unwrap();
        assert_eq!(f.headache, 1.0);
        assert_eq!(f.body_ache, 1.0);
        assert_eq!(f.fatigue, 0.0);
    }

    #[test]
    fn symptom_list_ignores_direct_flags() {
        let payload = json!({
            "symptoms": [],
            "Headache": 1,
            "Body_Ache": 1,
            "Fatigue": 1,
        });
        let (input, f) = normalize_payload(&payload).unwrap();
        assert_eq!(input.symptoms, SymptomReport::Described(vec![]));
        assert_eq!(f.symptom_count(), 0.0);
    }

    #[test]
    fn non_list_symptoms_use_direct_flags() {
        let payload = json!({ "symptoms": "headache", "Fatigue": 1 });
        let (_, f) = normalize_payload(&payload).unwrap();
        assert_eq!(f.headache, 0.0);
        assert_eq!(f.fatigue, 1.0);
    }

    #[test]
    fn non_text_symptom_entry_is_invalid_input() {
        match parse_payload(&json!({ "symptoms": ["cough", 7] })) {
            Err(FebrisError::InvalidInput { field, .. }) => assert_eq!(field, "symptoms[1]"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn comorbidity_list_overrides_direct_flag() {
        let (_, f) = normalize_payload(&json!({ "comorbidities": ["asthma"], "Chronic_Conditions": 0 }))
            .unwrap();
        assert_eq!(f.chronic_conditions, 1.0);
    }

    #[test]
    fn empty_comorbidity_list_falls_back_to_direct_flag() {
        let (_, f) = normalize_payload(&json!({ "comorbidities": [], "Chronic_Conditions": 1 }))
            .unwrap();
        assert_eq!(f.chronic_conditions, 1.0);

        let (_, f) = normalize_payload(&json!({ "comorbidities": [] })).unwrap();
        assert_eq!(f.chronic_conditions, 0.0);
    }

    // ── 4. Predictor ──────────────────────────────────────────────────────────

    #[test]
    fn argmax_prefers_first_index_on_tie() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn predictor_maps_class_index_through_encoder_order() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.1, 0.7, 0.2]));
        let predictor = Predictor::new(classifier).unwrap();
        let (_, features) = normalize_payload(&json!({})).unwrap();

        let prediction = predictor.predict(&features).unwrap();
        assert_eq!(prediction.decision, Decision::Continue);
        assert_eq!(prediction.confidence, 0.7);
        assert_eq!(prediction.probabilities.get(Decision::ConsultDoctor), 0.1);
        assert!((prediction.probabilities.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn predictor_rejects_reordered_features() {
        let mut classifier = FixedClassifier::new(vec![0.2, 0.3, 0.5]);
        classifier.names.swap(0, 1);
        match Predictor::new(Arc::new(classifier)) {
            Err(FebrisError::ArtifactUnavailable { reason }) => {
                assert!(reason.contains("feature order"), "unexpected reason: {reason}");
            }
            other => panic!("expected ArtifactUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn predictor_rejects_duplicate_classes() {
        let mut classifier = FixedClassifier::new(vec![0.2, 0.3, 0.5]);
        classifier.classes = vec![Decision::Continue, Decision::Continue, Decision::ConsultDoctor];
        assert!(matches!(
            Predictor::new(Arc::new(classifier)),
            Err(FebrisError::ArtifactUnavailable { .. })
        ));
    }

    #[test]
    fn predictor_rejects_unnormalized_output() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.5, 0.5, 0.5]));
        let predictor = Predictor::new(classifier).unwrap();
        let (_, features) = normalize_payload(&json!({})).unwrap();
        assert!(matches!(
            predictor.predict(&features),
            Err(FebrisError::InferenceFailure { .. })
        ));
    }

    #[test]
    fn predictor_rejects_wrong_length_output() {
        let classifier = Arc::new(FixedClassifier::new(vec![1.0]));
        let predictor = Predictor::new(classifier).unwrap();
        let (_, features) = normalize_payload(&json!({})).unwrap();
        assert!(matches!(
            predictor.predict(&features),
            Err(FebrisError::InferenceFailure { .. })
        ));
    }

    // ── 5. Inference service ──────────────────────────────────────────────────

    #[test]
    fn unavailable_service_reports_artifact_unavailable() {
        let service = InferenceService::unavailable(
            "fever_model.json not found",
            Box::new(EchoPolicy),
            Box::new(GreenTriage),
        );
        assert!(!service.is_ready());
        assert!(service.artifact_info().is_none());
        assert!(matches!(
            service.check_ready(),
            Err(FebrisError::ArtifactUnavailable { .. })
        ));

        let err = service.analyze(&json!({})).unwrap_err();
        assert_eq!(err.http_status(), 503);
        assert!(err.to_string().contains("fever_model.json"));
    }

    #[test]
    fn nested_and_top_level_payloads_agree() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.6, 0.3, 0.1]));
        let service = service_with(classifier);

        let fields = json!({ "temperature": 38.9, "duration": 2, "symptoms": ["tired"] });
        let top = service.analyze(&fields).unwrap();
        let nested = service.analyze(&json!({ "patientData": fields })).unwrap();

        assert_eq!(top.result, nested.result);
        assert_eq!(top.result.decision, Decision::ConsultDoctor);
        assert_eq!(top.result.input_features.temperature, 38.9);
        assert_eq!(top.result.input_features.fatigue, 1.0);
        assert!(top.disclaimer.contains("not a clinical diagnosis"));
    }

    #[test]
    fn invalid_input_never_reaches_the_classifier() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.6, 0.3, 0.1]));
        let service = service_with(Arc::clone(&classifier));

        let err = service
            .analyze(&json!({ "patientData": { "compliance": "most days" } }))
            .unwrap_err();
        assert!(matches!(err, FebrisError::InvalidInput { .. }));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn classifier_error_surfaces_as_inference_failure() {
        let classifier = Arc::new(FixedClassifier::failing("booster handle closed"));
        let policy_calls = Arc::new(AtomicUsize::new(0));
        let predictor = Predictor::new(Arc::clone(&classifier) as Arc<dyn Classifier>).unwrap();
        let service = InferenceService::new(
            predictor,
            Box::new(CountingPolicy {
                calls: Arc::clone(&policy_calls),
            }),
            Box::new(GreenTriage),
        );

        let err = service.analyze(&json!({})).unwrap_err();
        assert_eq!(err.http_status(), 500);
        match err {
            FebrisError::InferenceFailure { reason } => {
                assert!(reason.contains("booster handle closed"), "{reason}")
            }
            other => panic!("expected InferenceFailure, got {other:?}"),
        }
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(policy_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_object_envelope_is_invalid_input() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.6, 0.3, 0.1]));
        let service = service_with(classifier);
        match service.analyze(&json!({ "patientData": "39.0" })) {
            Err(FebrisError::InvalidInput { field, .. }) => assert_eq!(field, "patientData"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn service_is_shareable_across_threads() {
        let classifier = Arc::new(FixedClassifier::new(vec![0.2, 0.5, 0.3]));
        let service = Arc::new(service_with(Arc::clone(&classifier)));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    service
                        .analyze(&json!({ "temperature": 38.0 + i as f64 * 0.1 }))
                        .unwrap()
                        .result
                        .decision
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Decision::Continue);
        }
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 4);
    }

    // ── 6. Configuration ──────────────────────────────────────────────────────

    #[test]
    fn config_defaults_when_empty() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.model.dir, std::path::PathBuf::from("models"));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn config_reads_model_section() {
        let toml = r#"
            [model]
            dir = "/srv/febris/models"
            expected_sha256 = "abc123"

            [logging]
            filter = "febris_core=debug"
        "#;
        let config = ServiceConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.model.dir, std::path::PathBuf::from("/srv/febris/models"));
        assert_eq!(config.model.expected_sha256.as_deref(), Some("abc123"));
        assert_eq!(config.logging.filter, "febris_core=debug");
    }

    #[test]
    fn config_parse_error_is_config_error() {
        match ServiceConfig::from_toml_str("[model\ndir = ") {
            Err(FebrisError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse service config TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
