use crate::llm::prompt::PromptBuilder;
use crate::llm::{LlmError, PlanGenerator, PlanRequest};
use action_locator::{SelectorSuggester, SuggestError, SuggestionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_keys: Vec<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// JSON-mode chat completions against an OpenAI-compatible endpoint.
///
/// A 429 moves on to the next configured API key; any other error status
/// ends the request.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_keys.is_empty() {
            return Err(LlmError::Unavailable("missing OpenAI API key".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| LlmError::Unavailable(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    fn request_body(&self, system: &str, user: String) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
        }
    }

    /// Send one system + user exchange and return the assistant text.
    pub async fn complete(
        &self,
        purpose: &str,
        system: &str,
        user: String,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = self.request_body(system, user);

        let mut last_error: Option<LlmError> = None;
        for (index, key) in self.config.api_keys.iter().enumerate() {
            let response = self
                .client
                .post(&url)
                .bearer_auth(key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(err) => {
                    last_error = Some(LlmError::Unavailable(format!(
                        "openai request failed: {err}"
                    )));
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<response unavailable>".to_string());
                if status.as_u16() == 429 && index + 1 < self.config.api_keys.len() {
                    let friendly = openai_rate_limit_message(&text);
                    warn!(
                        target: "openai",
                        message = %friendly,
                        purpose,
                        attempt = index + 1,
                        remaining = self.config.api_keys.len() - index - 1,
                        "OpenAI rate limited request; switching API key"
                    );
                    last_error = Some(LlmError::Rejected(friendly));
                    continue;
                }
                if status.as_u16() == 429 {
                    return Err(LlmError::Rejected(openai_rate_limit_message(&text)));
                }
                return Err(LlmError::Rejected(format!(
                    "openai returned {}: {}",
                    status, text
                )));
            }

            let response: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|err| LlmError::Rejected(format!("openai response invalid: {err}")))?;

            let content = response
                .choices
                .first()
                .and_then(|choice| choice.message.content.as_ref())
                .and_then(ChatCompletionContent::as_text)
                .filter(|text| !text.trim().is_empty())
                .ok_or(LlmError::EmptyResponse)?;

            debug!(target: "openai", purpose, chars = content.len(), "Completion received");
            return Ok(content);
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::Unavailable("OpenAI request exhausted all API keys".to_string())
        }))
    }
}

/// Selector suggestion over [`OpenAiClient`].
///
/// Returns the assistant text untouched; extracting the selector is the
/// healer's job.
pub struct OpenAiSelectorSuggester {
    client: OpenAiClient,
    prompt: PromptBuilder,
}

impl OpenAiSelectorSuggester {
    pub fn new(config: OpenAiConfig) -> Result<Self, SuggestError> {
        Ok(Self {
            client: OpenAiClient::new(config)?,
            prompt: PromptBuilder::new(),
        })
    }
}

#[async_trait]
impl SelectorSuggester for OpenAiSelectorSuggester {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestError> {
        let reply = self
            .client
            .complete(
                "selector",
                self.prompt.selector_system_prompt(),
                self.prompt.build_selector_prompt(request),
            )
            .await?;
        Ok(reply)
    }
}

/// Test plan drafting over [`OpenAiClient`].
pub struct OpenAiPlanGenerator {
    client: OpenAiClient,
    prompt: PromptBuilder,
}

impl OpenAiPlanGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: OpenAiClient::new(config)?,
            prompt: PromptBuilder::new(),
        })
    }
}

#[async_trait]
impl PlanGenerator for OpenAiPlanGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<String, LlmError> {
        debug!(
            target: "openai",
            url = %request.url,
            dom_chars = request.dom.len(),
            test_data_keys = request.test_data.len(),
            "Requesting test plan"
        );
        self.client
            .complete(
                "plan",
                self.prompt.plan_system_prompt(),
                self.prompt.build_plan_prompt(request),
            )
            .await
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<ChatCompletionContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatCompletionContent {
    Text(String),
    Parts(Vec<ChatCompletionPart>),
}

impl ChatCompletionContent {
    fn as_text(&self) -> Option<String> {
        match self {
            ChatCompletionContent::Text(value) => Some(value.clone()),
            ChatCompletionContent::Parts(parts) => {
                let text = parts
                    .iter()
                    .filter_map(|part| part.text.as_ref())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n");
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorMessage {
    message: Option<String>,
}

fn openai_rate_limit_message(raw: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<OpenAiErrorEnvelope>(raw) {
        if let Some(message) = envelope.error.message {
            return format!("OpenAI rate limit exceeded: {}", message.trim());
        }
    }
    "OpenAI rate limit exceeded".to_string()
}
