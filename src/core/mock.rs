use crate::domain::messages::{MessageRequest, MessageResponse, ResponseBlock, Role, Usage};
use crate::domain::ports::ChatClient;
use crate::utils::error::{ChatError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Scripted [`ChatClient`] that replays queued responses and records every request.
pub struct MockChatClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<MessageRequest>>,
    name: String,
}

#[derive(Debug)]
pub enum MockResponse {
    Reply(MessageResponse),
    Failure(ChatError),
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        MockResponse::Reply(MessageResponse::text(content))
    }

    pub fn with_usage(content: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        let mut response = MessageResponse::text(content);
        response.usage = Usage {
            input_tokens,
            output_tokens,
        };
        MockResponse::Reply(response)
    }

    /// A reply with no text block at all.
    pub fn empty() -> Self {
        MockResponse::Reply(MessageResponse {
            id: String::new(),
            model: String::new(),
            role: Role::Assistant,
            content: vec![ResponseBlock::Other],
            stop_reason: Some("end_turn".to_string()),
            usage: Usage::default(),
        })
    }

    pub fn error(error: ChatError) -> Self {
        MockResponse::Failure(error)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::with_name("MockChat")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        lock(&self.responses).extend(responses);
    }

    pub fn requests(&self) -> Vec<MessageRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<MessageRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse> {
        lock(&self.requests).push(request.clone());

        match lock(&self.responses).pop_front() {
            Some(MockResponse::Reply(response)) => Ok(response),
            Some(MockResponse::Failure(error)) => Err(error),
            None => Err(ChatError::InvalidResponse {
                message: "no mock response queued".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
