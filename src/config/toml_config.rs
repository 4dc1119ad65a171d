use crate::config::ChatConfig;
use crate::utils::error::{ChatError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

fn env_placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub attachments: AttachmentSection,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentSection {
    pub max_file_size_mb: Option<u64>,
    pub allowed_mime_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    pub app_version: Option<String>,
    pub transcript_dir: Option<String>,
    pub monitor: Option<bool>,
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ChatError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ChatError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left untouched.
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Layer the values present in this file over `base`.
    pub fn apply_to(&self, mut base: ChatConfig) -> ChatConfig {
        let api = &self.api;
        if let Some(key) = &api.api_key {
            // An unresolved placeholder means the variable was not exported.
            if !env_placeholder().is_match(key) {
                base.api_key = Some(key.clone());
            }
        }
        if let Some(base_url) = &api.base_url {
            base.api_base_url = base_url.clone();
        }
        if let Some(model) = &api.model {
            base.model = model.clone();
        }
        if let Some(max_tokens) = api.max_tokens {
            base.max_tokens = max_tokens;
        }
        if let Some(temperature) = api.temperature {
            base.temperature = temperature;
        }
        if let Some(timeout) = api.timeout_seconds {
            base.timeout_seconds = timeout;
        }
        if let Some(retries) = api.max_retries {
            base.max_retries = retries;
        }
        if let Some(delay) = api.retry_base_delay_ms {
            base.retry_base_delay_ms = delay;
        }

        if let Some(size) = self.attachments.max_file_size_mb {
            base.max_file_size_mb = size;
        }
        if let Some(types) = &self.attachments.allowed_mime_types {
            base.allowed_mime_types = types.clone();
        }

        if let Some(version) = &self.session.app_version {
            base.app_version = version.clone();
        }
        if let Some(dir) = &self.session.transcript_dir {
            base.transcript_dir = dir.clone();
        }
        if let Some(monitor) = self.session.monitor {
            base.monitor = monitor;
        }
        base
    }

    pub fn into_chat_config(self) -> ChatConfig {
        self.apply_to(ChatConfig::default())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.apply_to(ChatConfig::default()).validate()
    }
}
