/*!
 * Core translation service implementation.
 *
 * This module contains the `Translator` trait used by the router for
 * per-segment translation, and `TranslationService`, which implements it on
 * top of one of the configured LLM providers.
 */

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils::{LanguageCode, get_language_name};
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

/// Output budget for a single subtitle line
const MAX_TRANSLATION_TOKENS: u32 = 1024;

/// Translator boundary: one synchronous call per piece of text
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError>;
}

/// Parse an endpoint string into a base URL with explicit scheme and port
fn normalize_endpoint(endpoint: &str) -> Result<String, TranslationError> {
    if endpoint.is_empty() {
        return Err(TranslationError::Configuration("Endpoint cannot be empty".to_string()));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
    .map_err(|e| TranslationError::Configuration(format!("Invalid endpoint {}: {}", endpoint, e)))?;

    let host = url.host_str()
        .ok_or_else(|| TranslationError::Configuration(format!("Invalid host in endpoint: {}", endpoint)))?;
    let port = url.port_or_known_default().unwrap_or(80);

    Ok(format!("{}://{}:{}", url.scheme(), host, port))
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        client: Ollama,
    },

    /// OpenAI API service, or LM Studio through the same API
    OpenAI {
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        client: Anthropic,
    },
}

/// Provider-backed translator for subtitle lines
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self, TranslationError> {
        let timeout_secs = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let base_url = normalize_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Ollama {
                    client: Ollama::new(base_url, config.get_model(), timeout_secs),
                }
            },
            ConfigTranslationProvider::OpenAI | ConfigTranslationProvider::LMStudio => {
                TranslationProviderImpl::OpenAI {
                    client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
                }
            },
            ConfigTranslationProvider::Anthropic => {
                TranslationProviderImpl::Anthropic {
                    client: Anthropic::new(config.get_api_key(), config.get_endpoint(), config.get_model(), timeout_secs),
                }
            },
        };

        Ok(Self { provider, config })
    }

    /// Build the system prompt for a language pair
    pub fn system_prompt(&self, source: &LanguageCode, target: &LanguageCode) -> String {
        let name = |lang: &LanguageCode| {
            get_language_name(lang.code()).unwrap_or_else(|_| lang.display_name().to_string())
        };

        self.config.common.system_prompt
            .replace("{source_language}", &name(source))
            .replace("{target_language}", &name(target))
    }

    /// Test the connection to the configured provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } => client.test_connection().await,
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
        }
    }

    async fn complete(&self, system_prompt: String, text: &str) -> Result<String, ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", text)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            },
            TranslationProviderImpl::OpenAI { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", text)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            },
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, MAX_TRANSLATION_TOKENS)
                    .system(system_prompt)
                    .add_message("user", text)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            },
        }
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        let text = text.trim();
        if text.is_empty() {
            // Nothing to translate; providers tend to answer blank input with chatter
            return Ok(String::new());
        }

        debug!("Translating {:?} ({} -> {})", text, source, target);
        let translated = self.complete(self.system_prompt(source, target), text).await?;
        let translated = translated.trim();

        if translated.is_empty() {
            warn!("{} returned an empty translation", self.config.provider.display_name());
            return Err(TranslationError::EmptyResponse(text.to_string()));
        }

        Ok(translated.to_string())
    }
}
