//! The model artifact: booster + label encoder + declared feature order.
//!
//! An artifact directory holds three JSON documents:
//!
//! | file                 | content                                      |
//! |----------------------|----------------------------------------------|
//! | `fever_model.json`   | the tree ensemble (see [`crate::booster`])   |
//! | `label_encoder.json` | `{"classes": [...]}`                         |
//! | `feature_names.json` | JSON array of feature names, column order    |
//!
//! The artifact is loaded once, validated for internal consistency, and then
//! shared read-only across requests. Any problem at load time is reported as
//! `FebrisError::ArtifactUnavailable`.
//!
//! Fingerprint input layout (bytes, in order, for each document above):
//!   1. file name as UTF-8 bytes
//!   2. document length as 8-byte little-endian
//!   3. document bytes

use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use febris_contracts::{
    artifact::ArtifactInfo,
    decision::Decision,
    error::{FebrisError, FebrisResult},
};
use febris_core::traits::Classifier;

use crate::booster::Booster;
use crate::encoder::LabelEncoder;

pub const MODEL_FILE: &str = "fever_model.json";
pub const ENCODER_FILE: &str = "label_encoder.json";
pub const FEATURES_FILE: &str = "feature_names.json";

/// Source label for artifacts built from in-memory documents.
pub const MEMORY_SOURCE: &str = "<memory>";

#[derive(Debug, Clone)]
pub struct ModelArtifact {
    booster: Booster,
    classes: Vec<Decision>,
    feature_names: Vec<String>,
    info: ArtifactInfo,
}

impl ModelArtifact {
    /// Read and validate the three artifact documents under `dir`.
    pub fn load_dir(dir: &Path) -> FebrisResult<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| FebrisError::ArtifactUnavailable {
                reason: format!("cannot read '{}': {}", path.display(), e),
            })
        };

        let model = read(MODEL_FILE)?;
        let encoder = read(ENCODER_FILE)?;
        let features = read(FEATURES_FILE)?;

        let artifact =
            Self::from_documents(&dir.display().to_string(), &model, &encoder, &features)?;

        info!(
            source = %artifact.info.source,
            fingerprint = %artifact.info.fingerprint,
            trees = artifact.info.tree_count,
            "model artifact loaded"
        );
        Ok(artifact)
    }

    /// Build an artifact from the raw JSON documents.
    ///
    /// Checks, in order: each document parses; the encoder decodes to known
    /// decisions with no duplicates; the booster's `num_class` equals the
    /// encoder's class count; the booster structure is valid for the
    /// declared feature count.
    pub fn from_documents(
        source: &str,
        model_json: &str,
        encoder_json: &str,
        features_json: &str,
    ) -> FebrisResult<Self> {
        let booster: Booster = parse(MODEL_FILE, model_json)?;
        let encoder: LabelEncoder = parse(ENCODER_FILE, encoder_json)?;
        let feature_names: Vec<String> = parse(FEATURES_FILE, features_json)?;

        let classes = encoder.decisions().map_err(unavailable)?;
        for (idx, class) in classes.iter().enumerate() {
            if classes[..idx].contains(class) {
                return Err(unavailable(format!(
                    "label encoder lists '{class}' more than once"
                )));
            }
        }

        if booster.num_class != classes.len() {
            return Err(unavailable(format!(
                "booster has {} classes but label encoder has {}",
                booster.num_class,
                classes.len()
            )));
        }
        if feature_names.is_empty() {
            return Err(unavailable("feature name list is empty".to_string()));
        }

        booster
            .validate(feature_names.len())
            .map_err(|e| unavailable(format!("invalid booster: {e}")))?;

        let fingerprint = fingerprint(&[
            (MODEL_FILE, model_json),
            (ENCODER_FILE, encoder_json),
            (FEATURES_FILE, features_json),
        ]);

        debug!(%fingerprint, classes = ?classes, "artifact documents validated");

        let info = ArtifactInfo {
            source: source.to_string(),
            fingerprint,
            classes: classes.clone(),
            feature_names: feature_names.clone(),
            tree_count: booster.trees.len(),
            loaded_at: Utc::now(),
        };

        Ok(Self {
            booster,
            classes,
            feature_names,
            info,
        })
    }

    /// Refuse the artifact unless its fingerprint equals `expected`
    /// (compared case-insensitively, surrounding whitespace ignored).
    pub fn verify_fingerprint(&self, expected: &str) -> FebrisResult<()> {
        let expected = expected.trim();
        if self.info.fingerprint.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(unavailable(format!(
                "artifact fingerprint {} does not match pinned {}",
                self.info.fingerprint, expected
            )))
        }
    }

    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }
}

impl Classifier for ModelArtifact {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[Decision] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> FebrisResult<Vec<f64>> {
        self.booster.predict_proba(row, self.feature_names.len())
    }

    fn artifact_info(&self) -> Option<ArtifactInfo> {
        Some(self.info.clone())
    }
}

/// Lowercase hex SHA-256 over the named documents.
pub fn fingerprint(documents: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();
    for (name, contents) in documents {
        hasher.update(name.as_bytes());
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(contents.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, json: &str) -> FebrisResult<T> {
    serde_json::from_str(json).map_err(|e| unavailable(format!("malformed {name}: {e}")))
}

fn unavailable(reason: String) -> FebrisError {
    FebrisError::ArtifactUnavailable { reason }
}
