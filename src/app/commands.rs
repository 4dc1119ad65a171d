/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Message(String),
    Attach(String),
    Files,
    Clear,
    History,
    Save,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /attach <path>  queue a file for the next message (max size and types from config)
  /files          list queued attachments
  /clear          clear chat history and queued attachments
  /history        show the conversation so far
  /save           write the conversation to a JSON transcript
  /help           show this help
  /quit, /exit    leave the chat
Anything else is sent as a message. An empty line sends queued attachments on their own.";

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Message(trimmed.to_string());
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "attach" if argument.is_empty() => Command::Invalid("Usage: /attach <path>".to_string()),
        "attach" => Command::Attach(unquote(argument).to_string()),
        "files" => Command::Files,
        "clear" => Command::Clear,
        "history" => Command::History,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("Unknown command: /{}. Type /help for commands.", other)),
    }
}

fn unquote(argument: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = argument
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    argument
}
