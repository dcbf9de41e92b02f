//! Autoprobe library
//!
//! Configuration, the OpenAI-backed plan generator and selector suggester,
//! and run orchestration, exposed for the binary and for integration testing.

pub mod config;
pub mod llm;
pub mod runner;

pub use config::{Config, ConfigError, LoadedConfig};
pub use runner::{run_session, PlanSource, RunError, RunReport};
