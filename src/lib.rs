pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{anthropic::AnthropicClient, storage::LocalStorage};
pub use app::repl::Repl;
pub use config::ChatConfig;
pub use core::session::ChatSession;
pub use utils::error::{ChatError, Result};
