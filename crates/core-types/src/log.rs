use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal outcome recorded for a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    /// First attempt succeeded.
    Executed,
    /// Failed without a healing attempt (assertions, or healing disabled).
    Failed,
    /// First attempt failed, retry with a suggested selector succeeded.
    SelfHealed,
    /// Healing was attempted and did not recover the step.
    FinalFailure,
    /// Not executed: unknown action or invalid step.
    Skipped,
}

impl LogOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            LogOutcome::Executed => "Executed",
            LogOutcome::Failed => "Failed",
            LogOutcome::SelfHealed => "Self-healed",
            LogOutcome::FinalFailure => "Final failure",
            LogOutcome::Skipped => "Skipped",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LogOutcome::Executed | LogOutcome::SelfHealed)
    }
}

impl fmt::Display for LogOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position of the step in the normalized sequence.
    pub index: usize,
    pub outcome: LogOutcome,
    pub action: String,
    /// Selector that produced the outcome; the healed selector for `SelfHealed`.
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(
        index: usize,
        outcome: LogOutcome,
        action: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            index,
            outcome,
            action: action.into(),
            selector: selector.into(),
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} on {}", self.outcome, self.action, self.selector)?;
        if let Some(detail) = &self.detail {
            write!(f, " - {}", detail)?;
        }
        Ok(())
    }
}

/// Ordered, append-only record of step outcomes for one run.
///
/// Entries can only be pushed; there is no way to edit or remove one. The
/// execution engine pushes exactly one entry per step, in step order, and is
/// the only writer during a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn count(&self, outcome: LogOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    /// Rendered one-line-per-entry form, in order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
