use crate::core::attachments::to_content_block;
use crate::domain::messages::{ContentBlock, Message};
use crate::domain::model::{Attachment, ChatTurn};
use crate::utils::error::{ChatError, Result};

/// Replays the history oldest first, then appends the new user message.
/// Failed turns are skipped since their assistant text never came from the model.
pub fn build_messages(
    history: &[ChatTurn],
    message: &str,
    attachments: &[Attachment],
) -> Result<Vec<Message>> {
    if message.trim().is_empty() && attachments.is_empty() {
        return Err(ChatError::validation("Message cannot be empty"));
    }

    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history.iter().filter(|turn| !turn.failed) {
        messages.push(Message::user_text(replayed_user_text(turn)));
        messages.push(Message::assistant_text(&turn.assistant));
    }

    let mut content: Vec<ContentBlock> = attachments.iter().map(to_content_block).collect();
    if !message.trim().is_empty() {
        content.push(ContentBlock::text(message));
    }
    messages.push(Message::user(content));

    Ok(messages)
}

/// Attachments are not re-sent; a turn that was attachments only is replayed by file name.
fn replayed_user_text(turn: &ChatTurn) -> String {
    if turn.user.trim().is_empty() {
        format!("[Attached: {}]", turn.attachments.join(", "))
    } else {
        turn.user.clone()
    }
}
