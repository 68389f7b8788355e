/*!
 * Integration tests for the provider-backed translator against a local HTTP stub
 */

use anyhow::Result;

use vidtrans::app_config::{ProviderConfig, TranslationConfig, TranslationProvider};
use vidtrans::errors::{ProviderError, TranslationError};
use vidtrans::language_utils::LanguageCode;
use vidtrans::translation::{TranslationService, Translator};
use crate::common;

fn config_for_stub(provider: TranslationProvider, endpoint: &str) -> TranslationConfig {
    let mut provider_config = ProviderConfig::new(provider.clone());
    provider_config.endpoint = endpoint.to_string();
    provider_config.api_key = "test-key".to_string();
    provider_config.timeout_secs = 5;

    TranslationConfig {
        provider,
        available_providers: vec![provider_config],
        ..TranslationConfig::default()
    }
}

fn ollama_reply(content: &str) -> String {
    serde_json::json!({
        "model": "llama3.2:3b",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
    .to_string()
}

/// Test a translation through the Ollama chat endpoint
#[tokio::test]
async fn test_translate_withOllama_shouldReturnTrimmedReply() -> Result<()> {
    let (base_url, requests) = common::spawn_http_stub(vec![(200, ollama_reply("  Guten Morgen \n"))]).await?;
    let service = TranslationService::new(config_for_stub(TranslationProvider::Ollama, &base_url))?;

    let translated = service.translate("Good morning", &LanguageCode::English, &LanguageCode::German).await?;
    assert_eq!(translated, "Guten Morgen");

    let requests = requests.await?;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /api/chat"));
    assert!(requests[0].contains("Good morning"));
    assert!(requests[0].contains("from English to German"));
    Ok(())
}

/// Test that a blank reply is reported instead of producing an empty subtitle
#[tokio::test]
async fn test_translate_withBlankReply_shouldReportEmptyResponse() -> Result<()> {
    let (base_url, _requests) = common::spawn_http_stub(vec![(200, ollama_reply("   "))]).await?;
    let service = TranslationService::new(config_for_stub(TranslationProvider::Ollama, &base_url))?;

    let err = service
        .translate("Hello", &LanguageCode::English, &LanguageCode::French)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::EmptyResponse(_)));
    Ok(())
}

/// Test that a rejected key maps to an authentication error
#[tokio::test]
async fn test_translate_withUnauthorized_shouldReportAuthentication() -> Result<()> {
    let body = r#"{"error":{"message":"Incorrect API key provided"}}"#.to_string();
    let (base_url, requests) = common::spawn_http_stub(vec![(401, body)]).await?;
    let service = TranslationService::new(config_for_stub(TranslationProvider::OpenAI, &base_url))?;

    let err = service
        .translate("Hello", &LanguageCode::English, &LanguageCode::Spanish)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Provider(ProviderError::AuthenticationError(_))));
    let requests = requests.await?;
    assert!(requests[0].starts_with("POST /chat/completions"));
    assert!(requests[0].to_lowercase().contains("authorization: bearer test-key"));
    Ok(())
}

/// Test that server errors keep their status code
#[tokio::test]
async fn test_translate_withServerError_shouldReportApiError() -> Result<()> {
    let (base_url, _requests) = common::spawn_http_stub(vec![(503, "overloaded".to_string())]).await?;
    let service = TranslationService::new(config_for_stub(TranslationProvider::Anthropic, &base_url))?;

    let err = service
        .translate("Hello", &LanguageCode::English, &LanguageCode::Japanese)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TranslationError::Provider(ProviderError::ApiError { status_code: 503, .. })
    ));
    Ok(())
}

/// Test that blank input is answered without contacting the provider
#[tokio::test]
async fn test_translate_withBlankInput_shouldSkipProvider() -> Result<()> {
    let service = TranslationService::new(config_for_stub(TranslationProvider::Ollama, "http://127.0.0.1:9"))?;
    let translated = service.translate("  ", &LanguageCode::English, &LanguageCode::German).await?;
    assert_eq!(translated, "");
    Ok(())
}

/// Test that an unusable endpoint is rejected when the service is built
#[test]
fn test_new_withEmptyOllamaEndpoint_shouldFail() {
    let mut config = config_for_stub(TranslationProvider::Ollama, "");
    config.available_providers.clear();
    config.available_providers.push(ProviderConfig {
        endpoint: "http://".to_string(),
        ..ProviderConfig::new(TranslationProvider::Ollama)
    });

    assert!(matches!(TranslationService::new(config), Err(TranslationError::Configuration(_))));
}
