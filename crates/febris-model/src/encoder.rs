//! Label encoder: class index ↔ decision label.
//!
//! Stored as `{"classes": ["CONSULT_DOCTOR", "CONTINUE", "LIKELY_SAFE_TO_STOP"]}`,
//! where position `i` is the label for class index `i`. A fitted encoder
//! sorts its labels, which is why `CONSULT_DOCTOR` is usually index 0.

use serde::{Deserialize, Serialize};

use febris_contracts::decision::Decision;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Reverse mapping: the decision for each class index, in index order.
    /// Fails on the first label that is not a decision.
    pub fn decisions(&self) -> Result<Vec<Decision>, String> {
        self.classes
            .iter()
            .map(|label| {
                Decision::from_label(label)
                    .ok_or_else(|| format!("label encoder holds unknown class '{label}'"))
            })
            .collect()
    }
}
