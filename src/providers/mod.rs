/*!
 * Provider implementations for the translation service.
 *
 * This module contains client implementations for the LLM providers that
 * can translate subtitle text:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use log::error;
use reqwest::{Response, StatusCode};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Turn a non-success HTTP response into the matching provider error
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", provider, status, message);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        },
    })
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
