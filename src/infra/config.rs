// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cascade: CascadeConfig,

    /// Chat adapters in priority order. Empty means the built-in list.
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,

    /// Image adapters in priority order. Empty means the built-in list.
    #[serde(default)]
    pub image_providers: Vec<ImageProviderEntry>,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file for chat session history (relative to BOOOMERANGS_HOME).
    pub database: String,
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Pause between SSE chunks.
    pub stream_chunk_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            database: "booomerangs.db".into(),
            cors_origins: Vec::new(),
            stream_chunk_delay_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub default_timeout_ms: u64,
    /// Extra tries per adapter on network errors (capped at 3).
    pub max_retries: u32,
    pub retry_initial_delay_ms: u64,
    /// Empty picks a prompt from the message topic.
    pub system_prompt: String,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 9_000,
            max_retries: 2,
            retry_initial_delay_ms: 250,
            system_prompt: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompat,
    Huggingface,
    G4fBridge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub credential_env: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderEntry {
    fn new(name: &str, kind: ProviderKind, base_url: &str, model: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: base_url.into(),
            model: model.into(),
            credential_env: None,
            timeout_ms: None,
            enabled: true,
        }
    }

    fn with_credential(mut self, env_var: &str) -> Self {
        self.credential_env = Some(env_var.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProviderKind {
    Pollinations,
    Replicate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProviderEntry {
    pub name: String,
    pub kind: ImageProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub credential_env: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_turns: usize,
    pub context_turns: usize,
    pub sticky_minutes: i64,
    pub max_idle_minutes: i64,
    pub sweep_interval_minutes: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 20,
            context_turns: 5,
            sticky_minutes: 10,
            max_idle_minutes: 60,
            sweep_interval_minutes: 30,
        }
    }
}

/// Ceiling for minute-valued memory settings (ten years).
const MAX_MINUTES: u64 = 60 * 24 * 365 * 10;

impl MemoryConfig {
    pub fn sticky_window(&self) -> chrono::Duration {
        minutes_window(self.sticky_minutes)
    }

    pub fn max_idle(&self) -> chrono::Duration {
        minutes_window(self.max_idle_minutes)
    }

    /// At least one minute.
    pub fn sweep_interval(&self) -> std::time::Duration {
        let minutes = self.sweep_interval_minutes.clamp(1, MAX_MINUTES);
        std::time::Duration::from_secs(minutes * 60)
    }
}

/// Negative values mean zero; huge ones are capped.
fn minutes_window(minutes: i64) -> chrono::Duration {
    chrono::Duration::minutes(minutes.clamp(0, MAX_MINUTES as i64))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Fixed seed for reproducible canned replies.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Extra templates, tried after the built-in ones.
    #[serde(default)]
    pub templates: Vec<DemoTemplateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoTemplateEntry {
    pub pattern: String,
    pub responses: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Built-in chat adapter order.
pub fn default_chat_providers() -> Vec<ProviderEntry> {
    vec![
        ProviderEntry::new(
            "chatfree",
            ProviderKind::OpenaiCompat,
            "https://chatfree.org/api",
            "gpt-3.5-turbo",
        ),
        ProviderEntry::new(
            "chatfree-mirror",
            ProviderKind::OpenaiCompat,
            "https://chat-app-free.org/api",
            "gpt-3.5-turbo",
        ),
        ProviderEntry::new(
            "qwen",
            ProviderKind::G4fBridge,
            "http://localhost:5004",
            "Qwen_Qwen_2_5_Max",
        ),
        ProviderEntry::new(
            "phind",
            ProviderKind::G4fBridge,
            "http://localhost:5004",
            "Phind",
        ),
        ProviderEntry::new(
            "perplexity",
            ProviderKind::OpenaiCompat,
            "https://api.perplexity.ai",
            "sonar",
        )
        .with_credential("PERPLEXITY_API_KEY"),
        ProviderEntry::new(
            "huggingface",
            ProviderKind::Huggingface,
            "https://api-inference.huggingface.co",
            "microsoft/DialoGPT-medium",
        )
        .with_credential("HUGGINGFACE_API_KEY"),
    ]
}

/// Built-in image adapter order.
pub fn default_image_providers() -> Vec<ImageProviderEntry> {
    vec![
        ImageProviderEntry {
            name: "pollinations".into(),
            kind: ImageProviderKind::Pollinations,
            base_url: "https://image.pollinations.ai".into(),
            model: None,
            credential_env: None,
            timeout_ms: Some(30_000),
            enabled: true,
        },
        ImageProviderEntry {
            name: "replicate".into(),
            kind: ImageProviderKind::Replicate,
            base_url: "https://api.replicate.com/v1".into(),
            model: Some("black-forest-labs/flux-schnell".into()),
            credential_env: Some("REPLICATE_API_TOKEN".into()),
            timeout_ms: Some(60_000),
            enabled: true,
        },
    ]
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Enabled chat adapters, in priority order.
    pub fn chat_providers(&self) -> Vec<ProviderEntry> {
        let entries = if self.providers.is_empty() {
            default_chat_providers()
        } else {
            self.providers.clone()
        };
        entries.into_iter().filter(|p| p.enabled).collect()
    }

    /// Enabled image adapters, in priority order.
    pub fn image_providers(&self) -> Vec<ImageProviderEntry> {
        let entries = if self.image_providers.is_empty() {
            default_image_providers()
        } else {
            self.image_providers.clone()
        };
        entries.into_iter().filter(|p| p.enabled).collect()
    }
}
