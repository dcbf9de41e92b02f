//! Shared primitives for autoprobe: plan steps and the execution log.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod log;
mod step;

pub use log::{ExecutionLog, LogEntry, LogOutcome};
pub use step::{RawPlanValue, RawStep, Step, StepAction, StepError};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
