//! Trait seams of the Febris pipeline.
//!
//! - `Classifier`     — the model artifact (external collaborator, read-only)
//! - `DecisionPolicy` — turns a prediction into a client-facing result
//! - `Triage`         — rule-based emergency screening beside the model
//!
//! The inference service wires them together. Implementations live in
//! `febris-model` and `febris-policy`.

use febris_contracts::{
    artifact::ArtifactInfo,
    decision::{Decision, DecisionResult, ProbabilityDistribution},
    error::FebrisResult,
    features::FeatureVector,
    patient::PatientInput,
    triage::EmergencyAlert,
};

/// A trained multi-class classifier plus its label encoder and declared
/// feature order.
///
/// Implementations are shared across threads behind an `Arc` and must not
/// mutate any state during inference.
pub trait Classifier: Send + Sync {
    /// Feature names in the column order `predict_proba` expects.
    fn feature_names(&self) -> &[String];

    /// Decision for each class index, i.e. the label encoder's reverse mapping.
    fn classes(&self) -> &[Decision];

    /// Full probability distribution over class indices for one row. The
    /// predicted class is the `argmax` of this distribution.
    fn predict_proba(&self, row: &[f64]) -> FebrisResult<Vec<f64>>;

    /// Provenance of the loaded artifact, when the implementation tracks it.
    fn artifact_info(&self) -> Option<ArtifactInfo> {
        None
    }
}

/// The deterministic post-processor.
///
/// Implementations must be pure: same inputs, same `DecisionResult`, no I/O.
pub trait DecisionPolicy: Send + Sync {
    fn postprocess(
        &self,
        decision: Decision,
        probabilities: &ProbabilityDistribution,
        features: &FeatureVector,
        confidence: f64,
    ) -> DecisionResult;
}

/// Emergency screening computed alongside the model decision.
pub trait Triage: Send + Sync {
    fn assess(&self, input: &PatientInput, features: &FeatureVector) -> EmergencyAlert;
}

/// Index of the largest value; the first index wins an exact tie.
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}
