use log::{debug, error};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::RecognitionError;

// @module: Media decoding into engine-ready audio

// @const: Upper bound for a single ffmpeg decode
const DECODE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Decode any media file ffmpeg understands into 16 kHz mono 16-bit PCM WAV,
/// the input format whisper.cpp expects.
pub async fn extract_wav(ffmpeg: &str, input: &Path, output: &Path) -> Result<(), RecognitionError> {
    let decode_error = |reason: String| RecognitionError::MediaDecode {
        path: input.to_path_buf(),
        reason,
    };

    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-y")
        .arg("-i")
        .arg(input)
        .args([
            "-vn",                  // No video
            "-acodec", "pcm_s16le", // 16-bit PCM
            "-ar", "16000",         // 16kHz sample rate
            "-ac", "1",             // Mono
        ])
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("Decoding {:?} with {}", input, ffmpeg);

    let result = tokio::select! {
        result = cmd.output() => {
            result.map_err(|e| decode_error(format!("failed to execute {}: {}", ffmpeg, e)))?
        },
        _ = tokio::time::sleep(DECODE_TIMEOUT) => {
            return Err(decode_error("ffmpeg timed out".to_string()));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Audio extraction failed: {}", filtered);
        return Err(decode_error(filtered));
    }

    let size = tokio::fs::metadata(output)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if size == 0 {
        return Err(decode_error("no audio stream could be decoded".to_string()));
    }

    Ok(())
}

/// Filter ffmpeg stderr down to the lines that explain a failure, dropping
/// the version banner, build configuration, and stream metadata.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
