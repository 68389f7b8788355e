use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::dedup::dedup_consecutive;
use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::language_utils::LanguageCode;
use crate::subtitle_processor::SubtitleCollection;
use crate::transcription::{SpeechRecognizer, WhisperCli};
use crate::translation::{RouteOptions, TranslationRequest, TranslationService, Translator, route};

// @module: Application controller for subtitle generation

/// Result of a single run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Subtitles were written to `path`
    Written {
        path: PathBuf,
        entries: usize,
    },
    /// An output already existed and overwriting was not requested
    Skipped {
        path: PathBuf,
    },
}

/// Main application controller for subtitle generation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        // Language errors keep their own kind
        config.routing_mode()?;
        config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;

        Ok(Self {
            config,
            show_progress: true,
        })
    }

    /// Disable progress bars, for non-interactive callers
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Build the immutable request for one media file
    pub fn build_request(&self, media: &Path) -> Result<TranslationRequest, AppError> {
        let source = LanguageCode::resolve(&self.config.source_language, "source")?;
        let target = LanguageCode::resolve(&self.config.target_language, "target")?;
        Ok(TranslationRequest::new(source, target, media))
    }

    /// Run the pipeline with the production recognizer and translator
    pub async fn run(
        &self,
        input_file: Option<PathBuf>,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunOutcome, AppError> {
        let input_file = FileManager::validate_input(input_file.as_deref())?;
        if !FileManager::is_media_file(&input_file) {
            warn!("{:?} has no known media extension, handing it to ffmpeg anyway", input_file);
        }

        let recognizer = WhisperCli::from_config(&self.config.recognition)?;

        match self.connect_translator().await? {
            Some(translator) => self.run_with(&recognizer, &translator, &input_file, output_file, force_overwrite).await,
            None => self.run_with(&recognizer, &NoTranslator, &input_file, output_file, force_overwrite).await,
        }
    }

    /// Build the translation service and check that its provider answers
    ///
    /// Only cascade runs translate. Other routes get `None` and never touch
    /// the provider settings.
    pub async fn connect_translator(&self) -> Result<Option<TranslationService>, AppError> {
        let mode = self.config.routing_mode()?;
        if !mode.needs_translator() {
            debug!("Route {} needs no translation provider", mode);
            return Ok(None);
        }

        let service = TranslationService::new(self.config.translation.clone())?;
        info!(
            "Checking {} at {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_endpoint()
        );
        service.test_connection().await.map_err(TranslationError::from)?;

        Ok(Some(service))
    }

    /// Run the pipeline with the given collaborators
    ///
    /// Stages run strictly one after another: route, dedup, serialize and
    /// write. Nothing is written unless every stage succeeds.
    pub async fn run_with(
        &self,
        recognizer: &dyn SpeechRecognizer,
        translator: &dyn Translator,
        input_file: &Path,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunOutcome, AppError> {
        let start_time = Instant::now();
        let request = self.build_request(input_file)?;
        let output_path = output_file
            .unwrap_or_else(|| FileManager::default_output_path(input_file, request.target.code()));

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, subtitles already exist (use -f to force overwrite)", output_path);
            return Ok(RunOutcome::Skipped { path: output_path });
        }

        info!(
            "Generating {} subtitles for {:?} (spoken {})",
            request.target.display_name(),
            input_file,
            request.source.display_name()
        );

        let progress_bar = self.progress_bar();
        progress_bar.set_message("Recognizing speech");

        let bar = progress_bar.clone();
        let options = RouteOptions::default()
            .with_concurrency(self.config.translation.get_concurrent_requests())
            .with_progress(move |done, total| {
                if bar.length() != Some(total as u64) {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total as u64);
                    bar.set_message("Translating");
                }
                bar.set_position(done as u64);
            });

        let routed = route(recognizer, translator, &request, &options).await;
        progress_bar.finish_and_clear();
        let segments = routed?;

        let recognized = segments.len();
        let segments = dedup_consecutive(segments);
        debug!("Deduplication kept {} of {} segments", segments.len(), recognized);

        if segments.is_empty() {
            return Err(AppError::Recognition(format!(
                "no speech was recognized in {}",
                input_file.display()
            )));
        }

        let subtitles = SubtitleCollection::from_segments(input_file.to_path_buf(), request.target.clone(), &segments)?;
        subtitles.write_to_srt(&output_path)?;

        info!(
            "Wrote {} subtitles to {:?} in {}",
            subtitles.entries.len(),
            output_path,
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunOutcome::Written {
            path: output_path,
            entries: subtitles.entries.len(),
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress_bar.set_style(style);
        progress_bar.enable_steady_tick(Duration::from_millis(120));
        progress_bar
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Stand-in for routes that never translate
struct NoTranslator;

#[async_trait]
impl Translator for NoTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        Err(TranslationError::Configuration(
            "no translation provider is set up for this route".to_string(),
        ))
    }
}
