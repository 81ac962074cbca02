//! Configuration loading for papermeta.
//! Reads papermeta.toml from the current directory or the path in the
//! PAPERMETA_CONFIG env var; a missing file means built-in defaults.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PapermetaConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host()             -> String      { "0.0.0.0".to_string() }
fn default_port()             -> u16         { 8000 }
fn default_cors_origins()     -> Vec<String> { vec!["http://localhost:3000".to_string()] }
fn default_max_upload_bytes() -> usize       { 50 * 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_log_dir()    -> PathBuf { PathBuf::from(".") }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { upload_dir: default_upload_dir(), log_dir: default_log_dir() }
    }
}

/// Which chat-completion API the metadata extractor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    #[serde(rename = "ollama")]
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi           => "https://api.openai.com",
            LlmProvider::OpenAiCompatible => "http://localhost:1234",
            LlmProvider::Ollama           => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, LlmProvider::OpenAi)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "bool_true")]
    pub json_mode: bool,
}

fn default_provider()     -> LlmProvider { LlmProvider::OpenAi }
fn default_model()        -> String      { "gpt-4o".to_string() }
fn default_api_key_env()  -> String      { "OPENAI_API_KEY".to_string() }
fn default_timeout_secs() -> u64         { 120 }
fn default_max_tokens()   -> u32         { 4096 }
fn default_temperature()  -> f32         { 0.1 }
fn bool_true()            -> bool        { true }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            json_mode: bool_true(),
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Text longer than this many characters is cut before it is sent.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_sample_chars")]
    pub sample_chars: usize,
}

fn default_max_input_chars() -> usize { 40_000 }
fn default_sample_chars()    -> usize { 500 }

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            sample_chars: default_sample_chars(),
        }
    }
}


impl PapermetaConfig {
    /// Load configuration from papermeta.toml, then apply environment overrides.
    /// Checks PAPERMETA_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("PAPERMETA_CONFIG")
            .unwrap_or_else(|_| "papermeta.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            tracing::info!(path = %path, "Loaded configuration file");
            Self::from_toml_str(&content)?
        } else {
            tracing::info!(path = %path, "No configuration file, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PAPERMETA_*` overrides. `lookup` resolves a variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = lookup("PAPERMETA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PAPERMETA_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PAPERMETA_PORT={port:?} is not a valid port: {e}"))?;
        }
        if let Some(dir) = lookup("PAPERMETA_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("PAPERMETA_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("PAPERMETA_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        Ok(())
    }

    /// The provider credential, read from the env var named by `llm.api_key_env`.
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }
}
