/*!
 * Language routing for a single run.
 *
 * The language pair is turned into a `RoutingMode` once, before any work
 * starts. The mode decides which task the recognition engine is asked for
 * and whether every recognized segment then goes through the translator.
 */

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};

use crate::errors::AppError;
use crate::language_utils::LanguageCode;
use crate::transcription::{RecognitionTask, Segment, SpeechRecognizer};
use crate::translation::core::Translator;

/// Progress callback receiving `(done, total)` segment counts
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Everything a run needs to know about what to produce
///
/// Built once per run and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Spoken language of the media
    pub source: LanguageCode,
    /// Language of the subtitles to produce
    pub target: LanguageCode,
    /// Media file to recognize
    pub media: PathBuf,
}

impl TranslationRequest {
    pub fn new(source: LanguageCode, target: LanguageCode, media: impl Into<PathBuf>) -> Self {
        Self {
            source,
            target,
            media: media.into(),
        }
    }

    /// Routing mode selected by this request's language pair
    pub fn mode(&self) -> RoutingMode {
        RoutingMode::select(&self.source, &self.target)
    }
}

/// How recognized speech reaches the target language
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingMode {
    /// Source and target match: transcribe only
    Passthrough {
        language: LanguageCode,
    },
    /// Target is English: the recognition engine translates while it transcribes
    DirectTranslate {
        source: LanguageCode,
    },
    /// Transcribe in the source language, then translate every segment
    CascadeTranslate {
        source: LanguageCode,
        target: LanguageCode,
    },
}

impl RoutingMode {
    /// Pick the mode for a language pair
    pub fn select(source: &LanguageCode, target: &LanguageCode) -> Self {
        if source == target {
            Self::Passthrough { language: source.clone() }
        } else if target.is_english() {
            Self::DirectTranslate { source: source.clone() }
        } else {
            Self::CascadeTranslate {
                source: source.clone(),
                target: target.clone(),
            }
        }
    }

    /// Language the recognition engine is told the media is spoken in
    pub fn recognition_language(&self) -> &LanguageCode {
        match self {
            Self::Passthrough { language } => language,
            Self::DirectTranslate { source } => source,
            Self::CascadeTranslate { source, .. } => source,
        }
    }

    /// Task requested from the recognition engine
    pub fn recognition_task(&self) -> RecognitionTask {
        match self {
            Self::DirectTranslate { .. } => RecognitionTask::TranslateToEnglish,
            Self::Passthrough { .. } | Self::CascadeTranslate { .. } => RecognitionTask::Transcribe,
        }
    }

    /// Whether this mode calls the external translator
    pub fn needs_translator(&self) -> bool {
        matches!(self, Self::CascadeTranslate { .. })
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough { language } => write!(f, "passthrough ({})", language),
            Self::DirectTranslate { source } => write!(f, "direct translation ({} -> en)", source),
            Self::CascadeTranslate { source, target } => {
                write!(f, "cascade translation ({} -> {})", source, target)
            }
        }
    }
}

/// Tuning for a routed run
#[derive(Clone)]
pub struct RouteOptions {
    /// Translation calls allowed in flight at once
    pub concurrency: usize,
    /// Called after every translated segment
    pub progress: Option<ProgressCallback>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            progress: None,
        }
    }
}

impl RouteOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("concurrency", &self.concurrency)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Recognize the request's media and bring its text into the target language
///
/// Makes exactly one recognition call. In cascade mode every recognized
/// segment is then translated with one translator call; the first failure
/// aborts the run and nothing partial is returned.
pub async fn route(
    recognizer: &dyn SpeechRecognizer,
    translator: &dyn Translator,
    request: &TranslationRequest,
    options: &RouteOptions,
) -> Result<Vec<Segment>, AppError> {
    let mode = request.mode();
    info!("Routing mode: {}", mode);

    let segments = recognizer
        .transcribe(&request.media, mode.recognition_language(), mode.recognition_task())
        .await?;
    info!("Recognized {} segments", segments.len());

    match &mode {
        RoutingMode::Passthrough { .. } | RoutingMode::DirectTranslate { .. } => Ok(segments),
        RoutingMode::CascadeTranslate { source, target } => {
            let segments = translate_segments(translator, segments, source, target, options).await?;
            Ok(segments)
        }
    }
}

/// Translate each segment's text, keeping timings and order
///
/// Calls are issued in segment order with at most `options.concurrency` in
/// flight; results are reassembled in the original order.
pub async fn translate_segments(
    translator: &dyn Translator,
    segments: Vec<Segment>,
    source: &LanguageCode,
    target: &LanguageCode,
    options: &RouteOptions,
) -> Result<Vec<Segment>, AppError> {
    let total = segments.len();
    let done = AtomicUsize::new(0);
    let concurrency = options.concurrency.max(1);
    debug!("Translating {} segments with {} calls in flight", total, concurrency);

    let translated: Vec<Segment> = stream::iter(segments)
        .map(|mut segment| {
            let done = &done;
            async move {
                segment.text = translator.translate(&segment.text, source, target).await?;

                let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = &options.progress {
                    progress(current, total);
                }
                Ok::<_, AppError>(segment)
            }
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    Ok(translated)
}
