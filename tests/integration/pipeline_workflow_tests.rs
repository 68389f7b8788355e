/*!
 * Integration tests for the recognition to SRT workflow
 */

use anyhow::Result;

use vidtrans::app_config::{Config, ProviderConfig, TranslationProvider};
use vidtrans::app_controller::{Controller, RunOutcome};
use vidtrans::errors::{AppError, TranslationError};
use vidtrans::transcription::RecognitionTask;
use crate::common;
use crate::common::mock_providers::{MockRecognitionFailure, MockRecognizer, MockTranslator};

fn controller(source: &str, target: &str) -> Controller {
    Controller::with_config(common::config_for(source, target))
        .unwrap()
        .without_progress()
}

fn config_with_ollama(source: &str, target: &str, endpoint: &str) -> Config {
    let mut config = common::config_for(source, target);
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.available_providers = vec![ProviderConfig {
        endpoint: endpoint.to_string(),
        timeout_secs: 5,
        ..ProviderConfig::new(TranslationProvider::Ollama)
    }];
    config
}

/// Test the reference Hello/Hello/World recording end to end
#[tokio::test]
async fn test_run_with_withReferenceRecording_shouldWriteTwoBlocks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "greeting.mp4")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.2, "Hello"), (1.2, 2.0, "Hello"), (2.0, 3.5, "World")]);
    let translator = MockTranslator::new();

    let outcome = controller("en", "en")
        .run_with(&recognizer, &translator, &media, None, false)
        .await?;

    let expected_path = temp_dir.path().join("greeting.en.srt");
    assert_eq!(outcome, RunOutcome::Written { path: expected_path.clone(), entries: 2 });
    assert_eq!(
        std::fs::read_to_string(&expected_path)?,
        "1\n00:00:00,000 --> 00:00:01,200\nHello\n\n2\n00:00:02,000 --> 00:00:03,500\nWorld\n\n"
    );
    Ok(())
}

/// Test the end-to-end passthrough case with one consecutive duplicate
#[tokio::test]
async fn test_run_with_withEnglishPassthrough_shouldWriteDedupedSrt() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "interview.mp4")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.2, "Hello"), (1.2, 2.5, "Hello"), (2.5, 4.0, "World")]);
    let translator = MockTranslator::new();

    let outcome = controller("en", "en")
        .run_with(&recognizer, &translator, &media, None, false)
        .await?;

    let expected_path = temp_dir.path().join("interview.en.srt");
    assert_eq!(outcome, RunOutcome::Written { path: expected_path.clone(), entries: 2 });
    assert_eq!(
        std::fs::read_to_string(&expected_path)?,
        "1\n00:00:00,000 --> 00:00:01,200\nHello\n\n2\n00:00:02,500 --> 00:00:04,000\nWorld\n\n"
    );
    assert_eq!(recognizer.call_count(), 1);
    assert_eq!(translator.call_count(), 0);
    Ok(())
}

/// Test that an English target uses the engine's translation and no LLM calls
#[tokio::test]
async fn test_run_with_withEnglishTarget_shouldNotCallTranslator() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "news.mkv")?;
    let output = temp_dir.path().join("subs").join("news.srt");

    let recognizer = MockRecognizer::with_lines(&[(0.0, 2.0, "Good evening")]);
    let translator = MockTranslator::new();

    controller("Chinese", "English")
        .run_with(&recognizer, &translator, &media, Some(output.clone()), false)
        .await?;

    assert_eq!(recognizer.calls()[0].task, RecognitionTask::TranslateToEnglish);
    assert_eq!(translator.call_count(), 0);
    assert!(std::fs::read_to_string(&output)?.contains("Good evening"));
    Ok(())
}

/// Test that translation happens before duplicates are removed
#[tokio::test]
async fn test_run_with_withCascade_shouldTranslateThenDedup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "talk.mp4")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.0, "hola"), (1.0, 2.0, "hola"), (2.0, 3.0, "adios")]);
    let translator = MockTranslator::new();

    let outcome = controller("es", "fr")
        .run_with(&recognizer, &translator, &media, None, false)
        .await?;

    // One call per recognized segment, duplicates included
    assert_eq!(translator.calls(), vec!["hola", "hola", "adios"]);
    let RunOutcome::Written { path, entries } = outcome else {
        panic!("expected subtitles to be written");
    };
    assert_eq!(entries, 2);
    assert_eq!(path.file_name().unwrap(), "talk.fr.srt");

    let body = std::fs::read_to_string(&path)?;
    assert!(body.contains("[fr] hola"));
    assert!(body.contains("2\n00:00:02,000 --> 00:00:03,000\n[fr] adios"));
    Ok(())
}

/// Test that a failed translation leaves no subtitle file behind
#[tokio::test]
async fn test_run_with_withTranslationFailure_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "talk.mp4")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.0, "eins"), (1.0, 2.0, "zwei")]);
    let translator = MockTranslator::failing_at(1);

    let err = controller("de", "es")
        .run_with(&recognizer, &translator, &media, None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Translation(_)));
    assert!(!temp_dir.path().join("talk.es.srt").exists());
    Ok(())
}

/// Test that recognition failures abort before any output
#[tokio::test]
async fn test_run_with_withUndecodableMedia_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "broken.avi")?;

    let recognizer = MockRecognizer::failing(MockRecognitionFailure::MediaDecode);
    let translator = MockTranslator::new();

    let err = controller("ja", "en")
        .run_with(&recognizer, &translator, &media, None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Recognition(_)));
    assert!(!temp_dir.path().join("broken.en.srt").exists());
    Ok(())
}

/// Test that silent media is an error rather than an empty file
#[tokio::test]
async fn test_run_with_withNoSpeech_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "silence.wav")?;

    let recognizer = MockRecognizer::with_segments(Vec::new());
    let translator = MockTranslator::new();

    let err = controller("en", "en")
        .run_with(&recognizer, &translator, &media, None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Recognition(_)));
    assert!(!temp_dir.path().join("silence.en.srt").exists());
    Ok(())
}

/// Test that recognition yielding only blank lines is treated as no speech
#[tokio::test]
async fn test_run_with_withOnlyBlankSegments_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "hiss.wav")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.0, " "), (1.0, 2.0, ""), (2.0, 3.0, "\t")]);
    let translator = MockTranslator::new();

    let err = controller("en", "en")
        .run_with(&recognizer, &translator, &media, None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Recognition(_)));
    assert!(!temp_dir.path().join("hiss.en.srt").exists());
    Ok(())
}

/// Test that routes without translation never build a provider client
#[tokio::test]
async fn test_connect_translator_withoutCascade_shouldSkipProvider() -> Result<()> {
    for (source, target) in [("de", "de"), ("ja", "en")] {
        let controller = Controller::with_config(config_with_ollama(source, target, "http://"))?;
        assert!(controller.connect_translator().await?.is_none());
    }
    Ok(())
}

/// Test that a cascade run checks the provider before any recognition work
#[tokio::test]
async fn test_connect_translator_withReachableProvider_shouldReturnService() -> Result<()> {
    let version = serde_json::json!({ "version": "0.5.7" }).to_string();
    let (base_url, requests) = common::spawn_http_stub(vec![(200, version)]).await?;

    let controller = Controller::with_config(config_with_ollama("es", "fr", &base_url))?;
    assert!(controller.connect_translator().await?.is_some());

    let requests = requests.await?;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /api/version"));
    Ok(())
}

/// Test that an unhealthy provider aborts a cascade run up front
#[tokio::test]
async fn test_connect_translator_withFailingProvider_shouldReportTranslation() -> Result<()> {
    let (base_url, _requests) = common::spawn_http_stub(vec![(500, "{}".to_string())]).await?;

    let controller = Controller::with_config(config_with_ollama("es", "fr", &base_url))?;
    let err = controller.connect_translator().await.unwrap_err();

    assert!(matches!(err, AppError::Translation(TranslationError::Provider(_))));
    Ok(())
}

/// Test that existing subtitles are kept unless overwriting is forced
#[tokio::test]
async fn test_run_with_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let media = common::create_test_media(temp_dir.path(), "talk.mp4")?;
    let existing = common::create_test_file(temp_dir.path(), "talk.ko.srt", "keep me")?;

    let recognizer = MockRecognizer::with_lines(&[(0.0, 1.0, "annyeong")]);
    let translator = MockTranslator::new();
    let controller = controller("ko", "ko");

    let outcome = controller.run_with(&recognizer, &translator, &media, None, false).await?;
    assert_eq!(outcome, RunOutcome::Skipped { path: existing.clone() });
    assert_eq!(recognizer.call_count(), 0);
    assert_eq!(std::fs::read_to_string(&existing)?, "keep me");

    controller.run_with(&recognizer, &translator, &media, None, true).await?;
    assert_eq!(recognizer.call_count(), 1);
    assert!(std::fs::read_to_string(&existing)?.contains("annyeong"));
    Ok(())
}

/// Test that the production entry point rejects a missing input before any work
#[tokio::test]
async fn test_run_withoutInput_shouldReportMissingInput() {
    let err = controller("en", "en").run(None, None, false).await.unwrap_err();
    assert!(matches!(err, AppError::MissingInput));
}

/// Test that an unknown language is rejected when the controller is built
#[test]
fn test_with_config_withUnknownLanguage_shouldFail() {
    assert!(Controller::with_config(common::config_for("Elvish", "en")).is_err());
}
