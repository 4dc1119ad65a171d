use crate::domain::messages::{ContentBlock, MediaSource};
use crate::domain::model::Attachment;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{ChatError, Result};
use std::path::Path;

const BYTES_PER_MB: u64 = 1024 * 1024;
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
/// Image formats the Messages API accepts in image blocks.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

pub fn guess_mime_type(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Checks and loads local files so they can travel with a message.
pub struct AttachmentProcessor<S: Storage> {
    storage: S,
    max_file_size_mb: u64,
    allowed_mime_types: Vec<String>,
}

impl<S: Storage> AttachmentProcessor<S> {
    pub fn new<C: ConfigProvider>(storage: S, config: &C) -> Self {
        Self {
            storage,
            max_file_size_mb: config.max_file_size_mb(),
            allowed_mime_types: config.allowed_mime_types().to_vec(),
        }
    }

    pub fn is_allowed(&self, mime_type: &str) -> bool {
        if mime_type.starts_with("image/") && !SUPPORTED_IMAGE_TYPES.contains(&mime_type) {
            return false;
        }
        self.allowed_mime_types
            .iter()
            .any(|prefix| mime_type.starts_with(prefix.as_str()))
    }

    /// Returns the guessed MIME type when the file is small enough and of an allowed kind.
    pub async fn validate_file(&self, path: &str) -> Result<String> {
        let size = self.storage.file_size(path).await?;
        if size > self.max_file_size_mb.saturating_mul(BYTES_PER_MB) {
            return Err(ChatError::FileTooLarge {
                path: path.to_string(),
                limit_mb: self.max_file_size_mb,
            });
        }

        match guess_mime_type(path) {
            Some(mime_type) if self.is_allowed(&mime_type) => Ok(mime_type),
            other => Err(ChatError::UnsupportedFileType {
                path: path.to_string(),
                mime_type: other.unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    async fn load(&self, path: &str) -> Result<Attachment> {
        let mime_type = self.validate_file(path).await?;
        let data = self.storage.read_file(path).await?;
        Ok(Attachment::new(file_name(path), mime_type, data))
    }

    /// Loads every file in order; the first failure aborts the whole batch.
    pub async fn process_attachments(&self, paths: &[String]) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::with_capacity(paths.len());

        for path in paths {
            match self.load(path).await {
                Ok(attachment) => {
                    tracing::info!(
                        "📎 Successfully processed file: {} ({}, {} bytes)",
                        path,
                        attachment.media_type,
                        attachment.size_bytes()
                    );
                    attachments.push(attachment);
                }
                Err(e) => {
                    tracing::error!("❌ File processing error: {}", e);
                    return Err(ChatError::Attachment {
                        path: path.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(attachments)
    }
}

/// Maps an attachment onto the content block the Messages API accepts for its type.
pub fn to_content_block(attachment: &Attachment) -> ContentBlock {
    let media_type = if attachment.media_type.is_empty() {
        FALLBACK_MEDIA_TYPE
    } else {
        attachment.media_type.as_str()
    };
    let title = Some(attachment.file_name.clone()).filter(|name| !name.is_empty());

    if media_type.starts_with("image/") {
        ContentBlock::Image {
            source: MediaSource::Base64 {
                media_type: media_type.to_string(),
                data: attachment.data.clone(),
            },
        }
    } else if media_type.starts_with("text/") || media_type == "application/json" {
        ContentBlock::Document {
            source: MediaSource::Text {
                media_type: "text/plain".to_string(),
                data: String::from_utf8_lossy(&attachment.data).into_owned(),
            },
            title,
        }
    } else {
        ContentBlock::Document {
            source: MediaSource::Base64 {
                media_type: media_type.to_string(),
                data: attachment.data.clone(),
            },
            title,
        }
    }
}
