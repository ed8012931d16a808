//! Model artifact for the Febris pipeline.
//!
//! Loads the externally trained tree ensemble, label encoder, and feature
//! order from an artifact directory, and exposes them through the
//! `febris_core::Classifier` trait.

pub mod artifact;
pub mod booster;
pub mod encoder;
pub mod scenarios;

use std::path::Path;
use std::sync::Arc;

use febris_contracts::error::FebrisResult;
use febris_core::Predictor;

pub use artifact::ModelArtifact;
pub use booster::Booster;
pub use encoder::LabelEncoder;

/// Load the artifact under `dir`, check the optional pinned fingerprint, and
/// wrap it in a `Predictor`.
pub fn load_predictor(dir: &Path, expected_sha256: Option<&str>) -> FebrisResult<Predictor> {
    let artifact = ModelArtifact::load_dir(dir)?;
    if let Some(expected) = expected_sha256 {
        artifact.verify_fingerprint(expected)?;
    }
    Predictor::new(Arc::new(artifact))
}
