use crate::config::toml_config::TomlConfig;
use crate::config::ChatConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "anthropic-chat")]
#[command(about = "Chat with Claude from the terminal, with file attachments")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Version shown in the banner and stored in transcripts
    #[arg(long, env = "APP_VERSION")]
    pub app_version: Option<String>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long)]
    pub max_file_size_mb: Option<u64>,

    /// Directory where `/save` writes transcripts
    #[arg(long)]
    pub transcript_dir: Option<String>,

    /// Send a single message, print the reply and exit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Attach a file to the one-shot message (repeatable)
    #[arg(short, long = "file", requires = "message")]
    pub files: Vec<String>,

    /// Log token usage and latency for every request
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Defaults, then the config file, then flags and environment.
    pub fn resolve(&self) -> Result<ChatConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?.into_chat_config()
            }
            None => ChatConfig::default(),
        };

        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(version) = &self.app_version {
            config.app_version = version.clone();
        }
        if let Some(base_url) = &self.api_base_url {
            config.api_base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(size) = self.max_file_size_mb {
            config.max_file_size_mb = size;
        }
        if let Some(dir) = &self.transcript_dir {
            config.transcript_dir = dir.clone();
        }
        if self.monitor {
            config.monitor = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nmodel = \"from-file\"\nmax_tokens = 100\n")
            .unwrap();

        let args = CliArgs::parse_from([
            "anthropic-chat",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--model",
            "from-flag",
            "--api-key",
            "sk-flag",
        ]);
        let config = args.resolve().unwrap();

        assert_eq!(config.model(), "from-flag");
        assert_eq!(config.max_tokens(), 100);
        assert_eq!(config.api_key(), Some("sk-flag"));
    }

    #[test]
    fn test_one_shot_files() {
        let args = CliArgs::parse_from([
            "anthropic-chat",
            "-m",
            "summarize",
            "-f",
            "a.txt",
            "--file",
            "b.pdf",
        ]);

        assert_eq!(args.message.as_deref(), Some("summarize"));
        assert_eq!(args.files, vec!["a.txt", "b.pdf"]);
    }

    #[test]
    fn test_file_requires_message() {
        let result = CliArgs::try_parse_from(["anthropic-chat", "--file", "a.txt"]);
        assert!(result.is_err());
    }
}
