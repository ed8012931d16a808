//! # febris-contracts
//!
//! Shared types and contracts for the Febris fever decision-support pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, the canonical feature contract, and
//! error types.

pub mod artifact;
pub mod decision;
pub mod error;
pub mod features;
pub mod patient;
pub mod triage;
