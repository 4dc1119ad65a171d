use crate::app::commands::{parse_command, Command, HELP_TEXT};
use crate::core::session::ChatSession;
use crate::domain::ports::{ChatClient, ConfigProvider, Storage};
use crate::utils::error::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub fn banner(app_version: &str) -> String {
    format!("🤖 Claude 3.5 Sonnet Chat (v{})", app_version)
}

/// Line-oriented chat loop over any reader and writer.
pub struct Repl<C: ChatClient, S: Storage, T: Storage> {
    session: ChatSession<C, S>,
    transcripts: T,
}

impl<C: ChatClient, S: Storage, T: Storage> Repl<C, S, T> {
    pub fn new(session: ChatSession<C, S>, transcripts: T) -> Self {
        Self {
            session,
            transcripts,
        }
    }

    pub fn session(&self) -> &ChatSession<C, S> {
        &self.session
    }

    /// Input bytes that are not valid UTF-8 are replaced rather than ending the session.
    pub async fn run<R, W>(&mut self, mut input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(output, "{}", banner(self.session.config().app_version()))?;
        writeln!(output, "Type /help for commands.")?;

        let mut buffer = Vec::new();
        loop {
            write!(output, "> ")?;
            output.flush()?;

            buffer.clear();
            if input.read_until(b'\n', &mut buffer).await? == 0 {
                writeln!(output)?;
                break;
            }
            let line = String::from_utf8_lossy(&buffer);

            if !self.dispatch(parse_command(&line), output).await? {
                break;
            }
        }

        self.session.log_final_stats();
        Ok(())
    }

    /// Returns `false` once the user asked to leave.
    async fn dispatch<W: Write>(&mut self, command: Command, output: &mut W) -> Result<bool> {
        match command {
            Command::Empty if self.session.pending_attachments().is_empty() => {}
            Command::Empty => self.send("", output).await?,
            Command::Quit => {
                writeln!(output, "Goodbye!")?;
                return Ok(false);
            }
            Command::Help => writeln!(output, "{}", HELP_TEXT)?,
            Command::Invalid(message) => writeln!(output, "{}", message)?,
            Command::Attach(path) => match self.session.attach(&path).await {
                Ok(mime_type) => writeln!(output, "📎 Attached {} ({})", path, mime_type)?,
                Err(e) => writeln!(output, "❌ {}", e.user_friendly_message())?,
            },
            Command::Files => {
                let pending = self.session.pending_attachments();
                if pending.is_empty() {
                    writeln!(output, "No files attached.")?;
                } else {
                    for path in pending {
                        writeln!(output, "📎 {}", path)?;
                    }
                }
            }
            Command::Clear => {
                self.session.clear();
                writeln!(output, "Chat history cleared.")?;
            }
            Command::History => {
                if self.session.history().is_empty() {
                    writeln!(output, "No messages yet.")?;
                }
                for turn in self.session.history() {
                    writeln!(output, "You: {}", turn.user)?;
                    writeln!(output, "Claude: {}", turn.assistant)?;
                }
            }
            Command::Save => match self.session.save_transcript(&self.transcripts).await {
                Ok(file_name) => writeln!(
                    output,
                    "💾 Saved transcript to {}/{}",
                    self.session.config().transcript_dir.trim_end_matches('/'),
                    file_name
                )?,
                Err(e) => writeln!(output, "❌ {}", e.user_friendly_message())?,
            },
            Command::Message(message) => self.send(&message, output).await?,
        }
        Ok(true)
    }

    async fn send<W: Write>(&mut self, message: &str, output: &mut W) -> Result<()> {
        let turn = self.session.handle_chat(message).await;
        if turn.failed {
            writeln!(output, "{}", turn.assistant)?;
        } else {
            writeln!(output, "Claude: {}", turn.assistant)?;
        }
        Ok(())
    }
}
