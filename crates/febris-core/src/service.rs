//! The inference service: the request-level pipeline.
//!
//!   request → unwrap `patientData` → parse → normalize → predict → post-process
//!
//! The service is built once at startup. When the model artifact could not
//! be loaded it is built in the unavailable state instead and answers every
//! request with `ArtifactUnavailable`; there is no per-request retry.
//! `analyze` takes `&self`, so one service can be shared across threads.

use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use febris_contracts::{
    artifact::ArtifactInfo,
    decision::PredictionResponse,
    error::{FebrisError, FebrisResult},
};

use crate::normalizer::normalize_payload;
use crate::predictor::Predictor;
use crate::traits::{DecisionPolicy, Triage};

/// Key under which clients may nest the patient payload.
pub const ENVELOPE_KEY: &str = "patientData";

pub struct InferenceService {
    predictor: Result<Predictor, String>,
    policy: Box<dyn DecisionPolicy>,
    triage: Box<dyn Triage>,
}

impl InferenceService {
    /// A ready service around a loaded predictor.
    pub fn new(
        predictor: Predictor,
        policy: Box<dyn DecisionPolicy>,
        triage: Box<dyn Triage>,
    ) -> Self {
        Self {
            predictor: Ok(predictor),
            policy,
            triage,
        }
    }

    /// A service whose artifact failed to load. `reason` is reported on
    /// every request.
    pub fn unavailable(
        reason: impl Into<String>,
        policy: Box<dyn DecisionPolicy>,
        triage: Box<dyn Triage>,
    ) -> Self {
        Self {
            predictor: Err(reason.into()),
            policy,
            triage,
        }
    }

    /// Build from the outcome of loading the artifact, logging which state
    /// the service starts in.
    pub fn from_load_result(
        loaded: FebrisResult<Predictor>,
        policy: Box<dyn DecisionPolicy>,
        triage: Box<dyn Triage>,
    ) -> Self {
        match loaded {
            Ok(predictor) => {
                info!("inference service ready");
                Self::new(predictor, policy, triage)
            }
            Err(e) => {
                warn!(error = %e, "model artifact not loaded; inference service unavailable");
                Self::unavailable(e.to_string(), policy, triage)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.predictor.is_ok()
    }

    /// `Ok` when the artifact is loaded, otherwise the load failure as
    /// `ArtifactUnavailable`.
    pub fn check_ready(&self) -> FebrisResult<()> {
        self.loaded_predictor().map(|_| ())
    }

    fn loaded_predictor(&self) -> FebrisResult<&Predictor> {
        self.predictor
            .as_ref()
            .map_err(|reason| FebrisError::ArtifactUnavailable {
                reason: reason.clone(),
            })
    }

    /// Provenance of the loaded artifact, if any.
    pub fn artifact_info(&self) -> Option<ArtifactInfo> {
        self.predictor
            .as_ref()
            .ok()
            .and_then(|p| p.classifier().artifact_info())
    }

    /// Run the full pipeline for one request.
    ///
    /// `request` holds the patient fields either at the top level or nested
    /// under `patientData`.
    ///
    /// # Errors
    ///
    /// - `ArtifactUnavailable` when the service started without a model
    /// - `InvalidInput` when a supplied field cannot be coerced
    /// - `MissingField` / `InferenceFailure` when the classifier call fails
    pub fn analyze(&self, request: &Value) -> FebrisResult<PredictionResponse> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analyze", %request_id);
        let _guard = span.enter();

        let predictor = self.loaded_predictor().map_err(|e| {
            warn!(error = %e, "rejecting request: model artifact unavailable");
            e
        })?;

        let payload = patient_payload(request)?;

        // Fail fast: nothing reaches the classifier unless the payload
        // normalized cleanly.
        let (input, features) = normalize_payload(payload).map_err(|e| {
            warn!(error = %e, "rejecting request: invalid patient data");
            e
        })?;

        let prediction = predictor.predict(&features).map_err(|e| {
            warn!(error = %e, "inference failed");
            e
        })?;

        let result = self.policy.postprocess(
            prediction.decision,
            &prediction.probabilities,
            &features,
            prediction.confidence,
        );
        let alert = self.triage.assess(&input, &features);

        debug!(
            key_factors = result.key_factors.len(),
            warning_signs = result.warning_signs.len(),
            severity = ?alert.severity,
            "post-processing complete"
        );
        info!(
            decision = %result.decision,
            confidence = result.confidence,
            recovery_probability = result.recovery_probability,
            risk = %result.risk_assessment,
            "prediction complete"
        );

        Ok(PredictionResponse::new(result, alert))
    }
}

/// The patient payload inside `request`: the `patientData` member when
/// present, the request itself otherwise.
pub fn patient_payload(request: &Value) -> FebrisResult<&Value> {
    match request.get(ENVELOPE_KEY) {
        None | Some(Value::Null) => Ok(request),
        Some(nested @ Value::Object(_)) => Ok(nested),
        Some(other) => Err(FebrisError::invalid_input(
            ENVELOPE_KEY,
            format!("expected a JSON object, got {other}"),
        )),
    }
}
