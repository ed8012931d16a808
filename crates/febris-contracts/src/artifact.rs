//! Model artifact metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Summary of a loaded model artifact, for startup logs and readiness checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// Where the artifact was read from (directory path or `"<memory>"`).
    pub source: String,
    /// Lowercase hex SHA-256 over the three artifact documents.
    pub fingerprint: String,
    /// Label encoder classes, in class-index order.
    pub classes: Vec<Decision>,
    pub feature_names: Vec<String>,
    pub tree_count: usize,
    pub loaded_at: DateTime<Utc>,
}
