//! Scripted LLM provider for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use nexus_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, StopReason,
    UsageStats,
};

/// What the provider does once its scripted responses run out.
#[derive(Debug, Clone)]
pub enum Exhausted {
    /// Never answer; the caller's timeout must fire
    Hang,
    Fail(LlmError),
    Panic,
}

pub struct MockLlmProvider {
    /// Responses returned in sequence; each call pops the first
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    exhausted: Exhausted,
    credentials: bool,
    calls: AtomicUsize,
    models_seen: Mutex<Vec<String>>,
    prompts_seen: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<LlmResult<LlmResponse>>, exhausted: Exhausted) -> Self {
        Self {
            responses: Mutex::new(responses),
            exhausted,
            credentials: true,
            calls: AtomicUsize::new(0),
            models_seen: Mutex::new(Vec::new()),
            prompts_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text_response(text: &str) -> Self {
        Self::new(vec![Ok(text_response(text))], Exhausted::Panic)
    }

    pub fn always(exhausted: Exhausted) -> Self {
        Self::new(Vec::new(), exhausted)
    }

    pub fn without_credentials() -> Self {
        Self {
            credentials: false,
            ..Self::always(Exhausted::Panic)
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn models_seen(&self) -> Vec<String> {
        self.models_seen.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts_seen.lock().unwrap().last().cloned()
    }
}

pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: Some(text.to_string()),
        stop_reason: StopReason::EndTurn,
        usage: UsageStats::default(),
        model: "mock-model".to_string(),
    }
}

pub fn server_error() -> LlmError {
    LlmError::ServerError {
        message: "upstream overloaded".to_string(),
        status: Some(503),
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models_seen.lock().unwrap().push(
            request_options
                .model_override
                .unwrap_or_else(|| self.model().to_string()),
        );
        if let Some(message) = messages.last() {
            self.prompts_seen.lock().unwrap().push(message.content.clone());
        }

        let scripted = {
            let mut responses = self.responses.lock().unwrap();
            (!responses.is_empty()).then(|| responses.remove(0))
        };
        if let Some(response) = scripted {
            return response;
        }

        match &self.exhausted {
            Exhausted::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(LlmError::Other {
                    message: "hang finished".to_string(),
                })
            }
            Exhausted::Fail(err) => Err(err.clone()),
            Exhausted::Panic => panic!("mock provider has no scripted response"),
        }
    }
}
