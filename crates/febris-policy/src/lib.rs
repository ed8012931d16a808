//! # febris-policy
//!
//! Deterministic rules applied around the classifier:
//!
//! - [`FeverDecisionPolicy`] derives recovery probability, risk tier,
//!   explanation, key factors, next steps, and warning signs from a decision.
//! - [`EmergencyTriage`] screens the raw input for emergency conditions and
//!   produces the RED / YELLOW / GREEN alert attached to every response.

pub mod postprocess;
pub mod triage;

pub use postprocess::FeverDecisionPolicy;
pub use triage::EmergencyTriage;
