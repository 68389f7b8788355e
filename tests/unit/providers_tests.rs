/*!
 * Tests for provider response handling
 */

use vidtrans::providers::Provider;
use vidtrans::providers::anthropic::{Anthropic, AnthropicResponse};
use vidtrans::providers::ollama::{ChatRequest, ChatResponse, Ollama};
use vidtrans::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};

/// Test text extraction from an Ollama chat response
#[test]
fn test_ollama_extract_text_withChatResponse_shouldReturnContent() {
    let json = r#"{
        "model": "llama3.2:3b",
        "message": { "role": "assistant", "content": "Bonjour tout le monde" },
        "done": true,
        "eval_count": 7
    }"#;
    let response: ChatResponse = serde_json::from_str(json).unwrap();

    assert_eq!(Ollama::extract_text(&response), "Bonjour tout le monde");
}

/// Test text extraction takes the first OpenAI choice
#[test]
fn test_openai_extract_text_withChoices_shouldReturnFirst() {
    let json = r#"{
        "choices": [
            { "message": { "role": "assistant", "content": "Hallo Welt" } },
            { "message": { "role": "assistant", "content": "Servus Welt" } }
        ]
    }"#;
    let response: OpenAIResponse = serde_json::from_str(json).unwrap();

    assert_eq!(OpenAI::extract_text(&response), "Hallo Welt");
    assert!(response.usage.is_none());
}

/// Test that an OpenAI response without choices yields no text
#[test]
fn test_openai_extract_text_withNoChoices_shouldBeEmpty() {
    let response: OpenAIResponse = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
    assert_eq!(OpenAI::extract_text(&response), "");
}

/// Test that only text blocks of an Anthropic response are joined
#[test]
fn test_anthropic_extract_text_withMixedBlocks_shouldKeepText() {
    let json = r#"{
        "content": [
            { "type": "text", "text": "Hola " },
            { "type": "tool_use" },
            { "type": "text", "text": "mundo" }
        ],
        "usage": { "input_tokens": 12, "output_tokens": 4 }
    }"#;
    let response: AnthropicResponse = serde_json::from_str(json).unwrap();

    assert_eq!(Anthropic::extract_text(&response), "Hola mundo");
}

/// Test the request bodies sent to the chat endpoints
#[test]
fn test_requests_withSystemAndUser_shouldSerializeMessages() {
    let ollama = serde_json::to_value(
        ChatRequest::new("llama3.2:3b")
            .add_message("system", "Translate")
            .add_message("user", "Hello")
            .temperature(0.3),
    )
    .unwrap();
    assert_eq!(ollama["stream"], false);
    assert_eq!(ollama["messages"][1]["content"], "Hello");
    assert!(ollama["options"]["temperature"].is_number());

    let openai = serde_json::to_value(OpenAIRequest::new("gpt-4o-mini").add_message("user", "Hello")).unwrap();
    assert_eq!(openai["model"], "gpt-4o-mini");
    assert!(openai.get("temperature").is_none());
}
