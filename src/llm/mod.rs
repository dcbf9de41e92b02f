//! Language-model backed plan generation and selector suggestion

pub mod openai;
pub mod prompt;

pub use openai::{OpenAiClient, OpenAiConfig, OpenAiPlanGenerator, OpenAiSelectorSuggester};
pub use prompt::PromptBuilder;

use action_locator::SuggestError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure talking to the model endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// No API key, client setup failed or every request failed in transit
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// Endpoint answered with an error status or an unreadable body
    #[error("model rejected request: {0}")]
    Rejected(String),

    #[error("model returned no content")]
    EmptyResponse,
}

impl From<LlmError> for SuggestError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unavailable(reason) => SuggestError::Unavailable(reason),
            LlmError::Rejected(reason) => SuggestError::Rejected(reason),
            LlmError::EmptyResponse => SuggestError::EmptyResponse,
        }
    }
}

/// Loaded page handed to the model for drafting a test plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub url: String,
    /// Full page HTML captured after the page settled
    pub dom: String,
    /// Known-good field values keyed by id, name, placeholder or label
    #[serde(default)]
    pub test_data: Map<String, Value>,
}

/// Drafts test cases and automation steps for a loaded page.
///
/// Returns the model's reply text; turning it into steps is the
/// normalizer's job.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest) -> Result<String, LlmError>;
}
