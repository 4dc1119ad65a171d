use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// A validated local file ready to be sent alongside a message.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "base64")]
pub struct Attachment {
    #[serde(skip)]
    pub file_name: String,
    pub media_type: String,
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// One exchange in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
    /// The assistant text is a rendered error, not a model reply.
    #[serde(default)]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl ChatTurn {
    pub fn reply(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
            timestamp: Utc::now(),
            failed: false,
            attachments: Vec::new(),
        }
    }

    pub fn error(user: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: format!("Error: {}", error_message.into()),
            timestamp: Utc::now(),
            failed: true,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub app_version: String,
    pub model: String,
    pub exported_at: DateTime<Utc>,
    pub turns: Vec<ChatTurn>,
}
