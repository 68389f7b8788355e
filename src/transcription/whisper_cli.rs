use async_trait::async_trait;
use log::{debug, error, info};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

use super::{RecognitionTask, Segment, SpeechRecognizer, audio};
use crate::app_config::RecognitionConfig;
use crate::errors::RecognitionError;
use crate::language_utils::LanguageCode;

/// Markers whisper.cpp prints when it cannot load a model
const MODEL_LOAD_MARKERS: &[&str] = &[
    "failed to initialize whisper context",
    "failed to load model",
];

/// whisper.cpp command-line engine
///
/// Each call decodes the media into a private temporary directory, runs the
/// engine once with JSON output and reads the segments back. The temporary
/// directory and any child process are cleaned up when the call returns or
/// its future is dropped.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    /// whisper.cpp binary (`whisper-cli`, `main`, or an absolute path)
    binary: String,
    /// ffmpeg binary used to decode the media
    ffmpeg: String,
    /// ggml model file
    model_path: PathBuf,
    /// Worker threads handed to the engine
    threads: Option<u32>,
}

// whisper.cpp `-oj` output, only the fields we read
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    transcription: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    offsets: WhisperOffsets,
    text: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOffsets {
    /// Milliseconds
    from: u64,
    /// Milliseconds
    to: u64,
}

impl WhisperCli {
    pub fn new(binary: impl Into<String>, ffmpeg: impl Into<String>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ffmpeg: ffmpeg.into(),
            model_path: model_path.into(),
            threads: None,
        }
    }

    /// Build the engine from the recognition section of the configuration
    pub fn from_config(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let model_path = config.resolve_model_path().ok_or_else(|| RecognitionError::ModelLoad {
            model: config.model.clone(),
            reason: "no model path configured and no data directory available".to_string(),
        })?;

        let mut engine = Self::new(&config.whisper_binary, &config.ffmpeg_binary, model_path);
        engine.threads = config.threads;
        Ok(engine)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn model_name(&self) -> String {
        self.model_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.model_path.display().to_string())
    }

    fn check_model(&self) -> Result<(), RecognitionError> {
        match std::fs::metadata(&self.model_path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
            Ok(_) => Err(RecognitionError::ModelLoad {
                model: self.model_name(),
                reason: format!("{:?} is not a usable model file", self.model_path),
            }),
            Err(e) => Err(RecognitionError::ModelLoad {
                model: self.model_name(),
                reason: format!("{:?}: {}", self.model_path, e),
            }),
        }
    }

    async fn run_engine(
        &self,
        wav_path: &Path,
        output_base: &Path,
        language: &LanguageCode,
        task: RecognitionTask,
    ) -> Result<(), RecognitionError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(wav_path)
            .args(["-l", language.code()])
            .arg("-oj") // JSON output
            .arg("-of")
            .arg(output_base)
            .arg("-np"); // No progress chatter on stdout

        if task == RecognitionTask::TranslateToEnglish {
            cmd.arg("-tr");
        }
        if let Some(threads) = self.threads {
            cmd.arg("-t").arg(threads.to_string());
        }

        cmd.stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} ({}) on {:?}", self.binary, task.as_str(), wav_path);

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RecognitionError::ModelLoad {
                    model: self.model_name(),
                    reason: format!("recognition engine '{}' not found", self.binary),
                }
            } else {
                RecognitionError::EngineFailed(format!("failed to start {}: {}", self.binary, e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Recognition engine exited with {}: {}", output.status, stderr.trim());

            let lowered = stderr.to_lowercase();
            if MODEL_LOAD_MARKERS.iter().any(|m| lowered.contains(m)) {
                return Err(RecognitionError::ModelLoad {
                    model: self.model_name(),
                    reason: last_line(&stderr),
                });
            }
            return Err(RecognitionError::EngineFailed(format!(
                "exit status {}: {}",
                output.status,
                last_line(&stderr)
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperCli {
    async fn transcribe(
        &self,
        media: &Path,
        language: &LanguageCode,
        task: RecognitionTask,
    ) -> Result<Vec<Segment>, RecognitionError> {
        self.check_model()?;

        let work_dir = TempDir::new()
            .map_err(|e| RecognitionError::EngineFailed(format!("failed to create temp directory: {}", e)))?;
        let wav_path = work_dir.path().join("audio.wav");
        let output_base = work_dir.path().join("transcript");

        info!("Decoding audio from {:?}", media);
        audio::extract_wav(&self.ffmpeg, media, &wav_path).await?;

        info!("Running {} in {} ({})", self.model_name(), language.display_name(), task.as_str());
        self.run_engine(&wav_path, &output_base, language, task).await?;

        let json_path = output_base.with_extension("json");
        let json = tokio::fs::read_to_string(&json_path)
            .await
            .map_err(|e| RecognitionError::InvalidOutput(format!("{:?}: {}", json_path, e)))?;

        let segments = parse_whisper_json(&json)?;
        debug!("Engine produced {} segments", segments.len());
        Ok(segments)
    }
}

/// Parse whisper.cpp JSON output into segments, offsets converted to seconds
pub fn parse_whisper_json(json: &str) -> Result<Vec<Segment>, RecognitionError> {
    let output: WhisperOutput = serde_json::from_str(json)
        .map_err(|e| RecognitionError::InvalidOutput(e.to_string()))?;

    Ok(output
        .transcription
        .into_iter()
        .map(|seg| Segment {
            start: seg.offsets.from as f64 / 1000.0,
            end: seg.offsets.to as f64 / 1000.0,
            text: seg.text,
        })
        .collect())
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_string()
}
