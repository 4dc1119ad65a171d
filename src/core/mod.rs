pub mod attachments;
pub mod conversation;
pub mod mock;
pub mod session;

pub use crate::domain::model::{Attachment, ChatTurn, Transcript};
pub use crate::domain::ports::{ChatClient, ConfigProvider, Storage};
pub use crate::utils::error::Result;
