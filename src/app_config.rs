use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::language_utils::LanguageCode;
use crate::translation::router::RoutingMode;

// @module: Application configuration, read from and written to JSON

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Spoken language of the media (code or display name)
    pub source_language: String,

    /// Language of the generated subtitles (code or display name)
    pub target_language: String,

    /// Speech recognition config
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech recognition engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognitionConfig {
    /// Model size name (tiny, base, small, medium, large-v3)
    #[serde(default = "default_whisper_model")]
    pub model: String,

    /// Explicit ggml model file, overrides `model`
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// whisper.cpp command-line binary
    #[serde(default = "default_whisper_binary")]
    pub whisper_binary: String,

    /// ffmpeg binary used to decode media
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,

    /// Threads handed to the recognition engine
    #[serde(default)]
    pub threads: Option<u32>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model: default_whisper_model(),
            model_path: None,
            whisper_binary: default_whisper_binary(),
            ffmpeg_binary: default_ffmpeg_binary(),
            threads: None,
        }
    }
}

impl RecognitionConfig {
    /// Model file to load: the explicit path, else `ggml-<model>.bin` in the
    /// user data directory
    pub fn resolve_model_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.model_path {
            return Some(path.clone());
        }

        dirs::data_dir().map(|dir| {
            dir.join("vidtrans")
                .join("models")
                .join(format!("ggml-{}.bin", self.model))
        })
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable holding the API key, for hosted providers
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max translation calls in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint, concurrent_requests) = match provider_type {
            TranslationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint(), 2),
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint(), default_concurrent_requests()),
            TranslationProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint(), default_concurrent_requests()),
            TranslationProvider::LMStudio => (default_lmstudio_model(), default_lmstudio_endpoint(), 2),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            concurrent_requests,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_whisper_binary() -> String {
    if cfg!(target_os = "windows") {
        "whisper-cli.exe".to_string()
    } else {
        "whisper-cli".to_string()
    }
}

fn default_ffmpeg_binary() -> String {
    if cfg!(target_os = "windows") {
        "ffmpeg.exe".to_string()
    } else {
        "ffmpeg".to_string()
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the subtitle line you are given from {source_language} to {target_language}. Reply with the translation only, on a single line, without quotes or commentary.".to_string()
}

impl Config {
    /// Resolve both languages and the routing mode they select
    pub fn routing_mode(&self) -> std::result::Result<RoutingMode, crate::errors::AppError> {
        let source = LanguageCode::resolve(&self.source_language, "source")?;
        let target = LanguageCode::resolve(&self.target_language, "target")?;
        Ok(RoutingMode::select(&source, &target))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let mode = self.routing_mode()?;

        if self.recognition.whisper_binary.trim().is_empty() {
            return Err(anyhow!("Recognition engine binary must not be empty"));
        }
        if self.recognition.ffmpeg_binary.trim().is_empty() {
            return Err(anyhow!("ffmpeg binary must not be empty"));
        }

        // Hosted providers need a key, but only when a translation call will be made
        if mode.needs_translator() && self.translation.provider.api_key_env_var().is_some() {
            let api_key = self.translation.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!(
                    "Translation API key is required for {} provider",
                    self.translation.provider.display_name()
                ));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "zh".to_string(),
            target_language: "en".to_string(),
            recognition: RecognitionConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        ProviderConfig::new(self.provider.clone()).model
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider.api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        ProviderConfig::new(self.provider.clone()).endpoint
    }

    /// Get the number of translation calls allowed in flight
    pub fn get_concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests)
            .filter(|n| *n > 0)
            .unwrap_or_else(default_concurrent_requests)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|n| *n > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
