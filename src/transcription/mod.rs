/*!
 * Speech recognition boundary.
 *
 * A recognizer turns one media file into an ordered list of timed segments.
 * The production engine is `WhisperCli`, which drives a whisper.cpp binary;
 * tests substitute their own implementation of `SpeechRecognizer`.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::RecognitionError;
use crate::language_utils::LanguageCode;

pub mod audio;
pub mod whisper_cli;

pub use self::whisper_cli::{WhisperCli, parse_whisper_json};

/// A single time-bounded unit of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    /// Recognized (or translated) text
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// What the recognition engine is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionTask {
    /// Text in the spoken language
    Transcribe,
    /// English text, translated by the engine itself
    TranslateToEnglish,
}

impl RecognitionTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::TranslateToEnglish => "translate",
        }
    }
}

/// Common trait for speech recognition engines
///
/// Implementations must fail explicitly when the media cannot be decoded or
/// the model cannot be loaded, and must return either every segment or an
/// error, never a partial list.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize `media` spoken in `language`
    async fn transcribe(
        &self,
        media: &Path,
        language: &LanguageCode,
        task: RecognitionTask,
    ) -> Result<Vec<Segment>, RecognitionError>;
}
