use anthropic_chat::core::mock::{MockChatClient, MockResponse};
use anthropic_chat::{ChatConfig, ChatError, ChatSession, LocalStorage, Repl};
use tempfile::TempDir;

fn repl_in(temp_dir: &TempDir) -> Repl<MockChatClient, LocalStorage, LocalStorage> {
    let mut config = ChatConfig::default();
    config.app_version = "2.5".to_string();
    config.transcript_dir = temp_dir.path().join("transcripts").display().to_string();

    let session = ChatSession::new(
        MockChatClient::new(),
        LocalStorage::new(temp_dir.path()),
        config.clone(),
    );
    Repl::new(session, LocalStorage::new(&config.transcript_dir))
}

async fn run_script(repl: &mut Repl<MockChatClient, LocalStorage, LocalStorage>, script: &str) -> String {
    let mut output = Vec::new();
    repl.run(script.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_banner_and_reply() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session().client().add_response(MockResponse::text("Hello, human!"));

    let output = run_script(&mut repl, "Hi there\n/quit\n").await;

    assert!(output.contains("🤖 Claude 3.5 Sonnet Chat (v2.5)"));
    assert!(output.contains("Claude: Hello, human!"));
    assert!(output.contains("Goodbye!"));
    assert_eq!(repl.session().history().len(), 1);
}

#[tokio::test]
async fn test_end_of_input_ends_session() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);

    let output = run_script(&mut repl, "/files\n").await;

    assert!(output.contains("No files attached."));
    assert!(!output.contains("Goodbye!"));
}

#[tokio::test]
async fn test_attach_then_send() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("todo.txt"), "- write tests").unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session().client().add_response(MockResponse::text("One item."));

    let output = run_script(&mut repl, "/attach todo.txt\n/files\nHow many items?\n/files\n").await;

    assert!(output.contains("📎 Attached todo.txt (text/plain)"));
    assert!(output.contains("📎 todo.txt"));
    assert!(output.contains("Claude: One item."));
    assert!(output.contains("No files attached."));
    assert_eq!(repl.session().client().requests().len(), 1);
}

#[tokio::test]
async fn test_attach_error_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);

    let output = run_script(&mut repl, "/attach missing.txt\n").await;

    assert!(output.contains("❌ File error: IO error:"));
    assert!(repl.session().pending_attachments().is_empty());
}

#[tokio::test]
async fn test_failed_reply_and_history() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session()
        .client()
        .add_response(MockResponse::error(ChatError::Connection {
            message: "connection refused".to_string(),
        }));

    let output = run_script(&mut repl, "ping\n/history\n").await;

    assert!(output.contains("Error: Connection error: Please check your internet connection"));
    assert!(output.contains("You: ping"));
}

#[tokio::test]
async fn test_clear_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session().client().add_response(MockResponse::text("pong"));

    let output = run_script(&mut repl, "ping\n/save\n/clear\n/history\n").await;

    assert!(output.contains("💾 Saved transcript to"));
    assert!(output.contains("Chat history cleared."));
    assert!(output.contains("No messages yet."));

    let saved: Vec<_> = std::fs::read_dir(temp_dir.path().join("transcripts"))
        .unwrap()
        .collect();
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_empty_lines_and_unknown_commands() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);

    let output = run_script(&mut repl, "\n   \n/bogus\n/help\n").await;

    assert!(output.contains("Unknown command: /bogus"));
    assert!(output.contains("/attach <path>"));
    assert!(repl.session().client().requests().is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_line_does_not_end_session() {
    let temp_dir = TempDir::new().unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session()
        .client()
        .add_responses([MockResponse::text("Hello."), MockResponse::text("Bonjour.")]);

    let mut output = Vec::new();
    repl.run(&b"hi\ncaf\xe9\n/history\n/quit\n"[..], &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("You: caf\u{FFFD}"));
    assert!(output.contains("Claude: Bonjour."));
    assert!(output.contains("Goodbye!"));
    assert_eq!(repl.session().history().len(), 2);
}

#[tokio::test]
async fn test_empty_line_sends_queued_attachments() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();
    let mut repl = repl_in(&temp_dir);
    repl.session().client().add_response(MockResponse::text("A short report."));

    let output = run_script(&mut repl, "/attach report.pdf\n\n/files\n").await;

    assert!(output.contains("Claude: A short report."));
    assert!(output.contains("No files attached."));
    let request = repl.session().client().last_request().unwrap();
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].content.len(), 1);
    assert_eq!(repl.session().history()[0].attachments, vec!["report.pdf".to_string()]);
}
