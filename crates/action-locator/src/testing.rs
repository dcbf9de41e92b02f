//! Scripted suggestion service for tests

use crate::{errors::SuggestError, healer::SelectorSuggester, types::SuggestionRequest};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replies with a fixed response and records every request.
pub struct ScriptedSuggester {
    reply: Result<String, SuggestError>,
    requests: Mutex<Vec<SuggestionRequest>>,
}

impl ScriptedSuggester {
    pub fn replying(response: &str) -> Self {
        Self {
            reply: Ok(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: SuggestError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SuggestionRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

#[async_trait]
impl SelectorSuggester for ScriptedSuggester {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestError> {
        self.requests
            .lock()
            .expect("request log lock")
            .push(request.clone());
        self.reply.clone()
    }
}
