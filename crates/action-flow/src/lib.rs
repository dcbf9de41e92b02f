//! Plan execution layer
//!
//! Turns untrusted, model-authored step lists into deterministic browser
//! interaction: normalization first, then sequential execution with a single
//! selector-healing attempt per failed interaction.

pub mod executor;
pub mod normalizer;
pub mod plan;

pub use executor::ExecutionEngine;
pub use normalizer::normalize_plan;
pub use plan::PlanDocument;
