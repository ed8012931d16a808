//! The predictor: feature vector → classifier → `Prediction`.
//!
//! The predictor holds a shared, read-only handle to the classifier. Its
//! constructor is the load-time consistency gate: a classifier whose feature
//! order or class set does not match the canonical contract is refused, so
//! no request can ever feed columns in the wrong order.

use std::sync::Arc;

use tracing::{debug, warn};

use febris_contracts::{
    decision::{Decision, Prediction, ProbabilityDistribution},
    error::{FebrisError, FebrisResult},
    features::{FeatureVector, FEATURE_NAMES},
};

use crate::traits::{argmax, Classifier};

pub struct Predictor {
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("feature_names", &self.classifier.feature_names())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl Predictor {
    /// Wrap `classifier` after checking it against the canonical contract.
    ///
    /// Returns `FebrisError::ArtifactUnavailable` when the declared feature
    /// names differ from `FEATURE_NAMES` (count or order), or when the
    /// classes are not exactly the three decisions, each once.
    pub fn new(classifier: Arc<dyn Classifier>) -> FebrisResult<Self> {
        check_feature_order(classifier.feature_names())?;
        check_classes(classifier.classes())?;
        Ok(Self { classifier })
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Run the classifier on `features`.
    ///
    /// Fails with `InferenceFailure` when the classifier errors or returns a
    /// distribution of the wrong length, with non-finite entries, or that does
    /// not sum to one.
    pub fn predict(&self, features: &FeatureVector) -> FebrisResult<Prediction> {
        let row = features.row_for(self.classifier.feature_names())?;
        let classes = self.classifier.classes();

        let raw = self.classifier.predict_proba(&row).map_err(|e| match e {
            FebrisError::InferenceFailure { .. } => e,
            other => FebrisError::InferenceFailure {
                reason: other.to_string(),
            },
        })?;

        if raw.len() != classes.len() {
            return Err(FebrisError::InferenceFailure {
                reason: format!(
                    "classifier returned {} probabilities for {} classes",
                    raw.len(),
                    classes.len()
                ),
            });
        }
        if raw.iter().any(|p| !p.is_finite()) {
            return Err(FebrisError::InferenceFailure {
                reason: "classifier returned a non-finite probability".to_string(),
            });
        }

        let best = argmax(&raw);
        let probabilities =
            ProbabilityDistribution::from_pairs(classes.iter().copied().zip(raw.iter().copied()));

        if !probabilities.is_normalized() {
            warn!(total = probabilities.total(), "classifier distribution is not normalized");
            return Err(FebrisError::InferenceFailure {
                reason: format!(
                    "class probabilities sum to {:.6}, expected 1.0",
                    probabilities.total()
                ),
            });
        }

        let prediction = Prediction {
            decision: classes[best],
            probabilities,
            confidence: raw[best],
        };

        debug!(
            decision = %prediction.decision,
            confidence = prediction.confidence,
            "classifier prediction"
        );

        Ok(prediction)
    }
}

fn check_feature_order(declared: &[String]) -> FebrisResult<()> {
    if declared.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
        return Err(FebrisError::ArtifactUnavailable {
            reason: format!(
                "artifact feature order {:?} does not match the canonical order {:?}",
                declared, FEATURE_NAMES
            ),
        });
    }
    Ok(())
}

fn check_classes(classes: &[Decision]) -> FebrisResult<()> {
    let complete = classes.len() == Decision::ALL.len()
        && Decision::ALL
            .iter()
            .all(|d| classes.iter().filter(|c| *c == d).count() == 1);

    if !complete {
        return Err(FebrisError::ArtifactUnavailable {
            reason: format!(
                "artifact classes {:?} must be exactly {:?}, each once",
                classes,
                Decision::ALL
            ),
        });
    }
    Ok(())
}
