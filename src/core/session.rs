use crate::config::ChatConfig;
use crate::core::attachments::AttachmentProcessor;
use crate::core::conversation::build_messages;
use crate::domain::messages::MessageRequest;
use crate::domain::model::{ChatTurn, Transcript};
use crate::domain::ports::{ChatClient, ConfigProvider, Storage};
use crate::utils::error::{ChatError, Result};
use crate::utils::monitor::{UsageMonitor, UsageStats};
use chrono::Utc;
use std::time::Instant;

/// In-memory conversation with the pending attachments for the next message.
pub struct ChatSession<C: ChatClient, S: Storage> {
    client: C,
    processor: AttachmentProcessor<S>,
    config: ChatConfig,
    history: Vec<ChatTurn>,
    pending: Vec<String>,
    monitor: UsageMonitor,
}

impl<C: ChatClient, S: Storage> ChatSession<C, S> {
    pub fn new(client: C, storage: S, config: ChatConfig) -> Self {
        Self {
            processor: AttachmentProcessor::new(storage, &config),
            monitor: UsageMonitor::new(config.monitor),
            client,
            config,
            history: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn pending_attachments(&self) -> &[String] {
        &self.pending
    }

    pub fn usage(&self) -> UsageStats {
        self.monitor.get_stats()
    }

    /// Validates `path` now and queues it for the next message.
    pub async fn attach(&mut self, path: &str) -> Result<String> {
        let mime_type = self
            .processor
            .validate_file(path)
            .await
            .map_err(|e| ChatError::Attachment {
                path: path.to_string(),
                source: Box::new(e),
            })?;
        self.pending.push(path.to_string());
        tracing::debug!("Queued attachment {} ({})", path, mime_type);
        Ok(mime_type)
    }

    /// Sends one message with the given files on top of the current history.
    pub async fn chat(&self, message: &str, files: &[String]) -> Result<String> {
        let attachments = self.processor.process_attachments(files).await?;
        let request = MessageRequest {
            model: self.config.model().to_string(),
            max_tokens: self.config.max_tokens(),
            temperature: self.config.temperature(),
            messages: build_messages(&self.history, message, &attachments)?,
        };

        let started = Instant::now();
        let response = match self.client.create_message(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.monitor.record_failure();
                log_failure(&e);
                return Err(e);
            }
        };

        self.monitor.record_success(
            response.usage.input_tokens,
            response.usage.output_tokens,
            started.elapsed(),
        );
        tracing::info!("✅ Successfully received response from {}", self.client.name());

        response.first_text().map(str::to_string).ok_or_else(|| {
            let e = ChatError::InvalidResponse {
                message: "response contained no text content".to_string(),
            };
            log_failure(&e);
            e
        })
    }

    /// Sends `message` with the pending attachments and records the outcome as a turn.
    ///
    /// Errors never escape: they become an `Error: ...` reply. Pending attachments are
    /// cleared either way.
    pub async fn handle_chat(&mut self, message: &str) -> ChatTurn {
        let files = std::mem::take(&mut self.pending);

        let turn = match self.chat(message, &files).await {
            Ok(reply) => ChatTurn::reply(message, reply),
            Err(e) => ChatTurn::error(message, e.user_friendly_message()),
        }
        .with_attachments(files);

        self.history.push(turn.clone());
        turn
    }

    pub fn clear(&mut self) {
        tracing::info!("🧹 Clearing {} turns of chat history", self.history.len());
        self.history.clear();
        self.pending.clear();
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            app_version: self.config.app_version().to_string(),
            model: self.config.model().to_string(),
            exported_at: Utc::now(),
            turns: self.history.clone(),
        }
    }

    /// Writes the transcript as pretty JSON and returns the file name used.
    /// Never overwrites an earlier transcript.
    pub async fn save_transcript<T: Storage>(&self, storage: &T) -> Result<String> {
        let transcript = self.transcript();
        let stem = format!("transcript-{}", transcript.exported_at.format("%Y%m%dT%H%M%S%3fZ"));
        let mut file_name = format!("{}.json", stem);
        let mut suffix = 1;
        while storage.file_size(&file_name).await.is_ok() {
            suffix += 1;
            file_name = format!("{}-{}.json", stem, suffix);
        }

        let json = serde_json::to_string_pretty(&transcript)?;
        storage.write_file(&file_name, json.as_bytes()).await?;

        tracing::info!("💾 Saved {} turns to {}", transcript.turns.len(), file_name);
        Ok(file_name)
    }

    pub fn log_final_stats(&self) {
        self.monitor.log_final_stats();
    }
}

fn log_failure(error: &ChatError) {
    match error {
        ChatError::Connection { message } => tracing::error!("Connection error: {}", message),
        ChatError::RateLimited { message, .. } => {
            tracing::error!("Rate limit exceeded: {}", message)
        }
        ChatError::ApiStatus { status, message, .. } => {
            tracing::error!("API error: {} - {}", status, message)
        }
        ChatError::Attachment { .. } | ChatError::ValidationError { .. } => {
            tracing::warn!("Message not sent: {}", error)
        }
        other => tracing::error!("Unexpected error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::core::mock::{MockChatClient, MockResponse};
    use crate::domain::messages::{ContentBlock, Message};
    use tempfile::TempDir;

    fn session(temp_dir: &TempDir) -> ChatSession<MockChatClient, LocalStorage> {
        ChatSession::new(
            MockChatClient::new(),
            LocalStorage::new(temp_dir.path()),
            ChatConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_chat_uses_configured_parameters() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir);
        session.client().add_response(MockResponse::text("Hello!"));

        let reply = session.chat("Hi", &[]).await.unwrap();

        assert_eq!(reply, "Hello!");
        let request = session.client().last_request().unwrap();
        assert_eq!(request.model, "claude-3-5-sonnet-20241022");
        assert_eq!(request.max_tokens, 8192);
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.messages, vec![Message::user_text("Hi")]);
    }

    #[tokio::test]
    async fn test_chat_without_text_block_is_invalid_response() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir);
        session.client().add_response(MockResponse::empty());

        let result = session.chat("Hi", &[]).await;
        assert!(matches!(result, Err(ChatError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_handle_chat_appends_history() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session
            .client()
            .add_responses([MockResponse::text("one"), MockResponse::text("two")]);

        session.handle_chat("first").await;
        let turn = session.handle_chat("second").await;

        assert_eq!(turn.assistant, "two");
        assert_eq!(session.history().len(), 2);
        let request = session.client().last_request().unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[1], Message::assistant_text("one"));
    }

    #[tokio::test]
    async fn test_handle_chat_records_error_turn() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.client().add_response(MockResponse::error(ChatError::RateLimited {
            message: "slow down".to_string(),
            retry_after: None,
        }));

        let turn = session.handle_chat("hello").await;

        assert!(turn.failed);
        assert_eq!(
            turn.assistant,
            "Error: Rate limit exceeded: Please wait before sending new messages"
        );
        assert_eq!(session.usage().failures, 1);
    }

    #[tokio::test]
    async fn test_attachments_are_sent_once_and_cleared() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "remember the milk").unwrap();
        let mut session = session(&temp_dir);
        session
            .client()
            .add_responses([MockResponse::text("noted"), MockResponse::text("ok")]);

        let mime_type = session.attach("notes.txt").await.unwrap();
        assert_eq!(mime_type, "text/plain");
        assert_eq!(session.pending_attachments(), &["notes.txt".to_string()]);

        let turn = session.handle_chat("summarize").await;
        assert_eq!(turn.attachments, vec!["notes.txt".to_string()]);
        assert!(session.pending_attachments().is_empty());

        let first = session.client().requests()[0].clone();
        assert!(matches!(first.messages[0].content[0], ContentBlock::Document { .. }));

        session.handle_chat("and now?").await;
        let second = session.client().last_request().unwrap();
        assert_eq!(second.messages.last().unwrap().content.len(), 1);
    }

    #[tokio::test]
    async fn test_pending_attachments_cleared_even_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("data.json"), "{}").unwrap();
        let mut session = session(&temp_dir);
        session.attach("data.json").await.unwrap();
        std::fs::remove_file(temp_dir.path().join("data.json")).unwrap();

        let turn = session.handle_chat("read it").await;

        assert!(turn.failed);
        assert!(turn.assistant.starts_with("Error: File error:"));
        assert!(session.pending_attachments().is_empty());
        assert!(session.client().requests().is_empty());
    }

    #[tokio::test]
    async fn test_attach_rejects_unsupported_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("tool.exe"), [0u8; 4]).unwrap();
        let mut session = session(&temp_dir);

        let result = session.attach("tool.exe").await;

        assert!(matches!(result, Err(ChatError::Attachment { .. })));
        assert!(session.pending_attachments().is_empty());
    }

    #[tokio::test]
    async fn test_clear_resets_session() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        let mut session = session(&temp_dir);
        session.client().add_response(MockResponse::text("hi"));
        session.handle_chat("hello").await;
        session.attach("a.txt").await.unwrap();

        session.clear();

        assert!(session.history().is_empty());
        assert!(session.pending_attachments().is_empty());
    }

    #[tokio::test]
    async fn test_save_transcript() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.client().add_response(MockResponse::text("hi"));
        session.handle_chat("hello").await;

        let storage = LocalStorage::new(temp_dir.path().join("transcripts"));
        let file_name = session.save_transcript(&storage).await.unwrap();

        assert!(file_name.starts_with("transcript-"));
        let saved = std::fs::read_to_string(temp_dir.path().join("transcripts").join(&file_name)).unwrap();
        let transcript: Transcript = serde_json::from_str(&saved).unwrap();
        assert_eq!(transcript.app_version, "1.0");
        assert_eq!(transcript.turns.len(), 1);
        assert_eq!(transcript.turns[0].assistant, "hi");
    }

    #[tokio::test]
    async fn test_repeated_saves_keep_every_transcript() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir);
        let storage = LocalStorage::new(temp_dir.path().join("transcripts"));

        let first = session.save_transcript(&storage).await.unwrap();
        let second = session.save_transcript(&storage).await.unwrap();
        let third = session.save_transcript(&storage).await.unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        let saved = std::fs::read_dir(temp_dir.path().join("transcripts")).unwrap().count();
        assert_eq!(saved, 3);
    }

    #[tokio::test]
    async fn test_usage_tracks_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.client().add_responses([
            MockResponse::with_usage("one", 12, 3),
            MockResponse::with_usage("two", 20, 5),
        ]);

        session.handle_chat("first").await;
        session.handle_chat("second").await;

        let usage = session.usage();
        assert_eq!(usage.requests, 2);
        assert_eq!(usage.failures, 0);
        assert_eq!(usage.input_tokens, 32);
        assert_eq!(usage.output_tokens, 8);
    }
}
