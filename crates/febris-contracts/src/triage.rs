//! Emergency triage alert types.

use serde::{Deserialize, Serialize};

/// Urgency of an emergency alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    /// Seek medical help now.
    Red,
    /// Consult a doctor soon.
    Yellow,
    /// Stable; continue home care.
    Green,
}

/// A rule-based emergency alert computed alongside the model decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub severity: AlertSeverity,
    pub message: String,
    /// Which input triggered the alert, with the offending value.
    pub reason: String,
    pub action: String,
    pub advice: Vec<String>,
    /// Phone numbers to call. Empty unless the severity is `Red`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emergency_numbers: Vec<String>,
}
