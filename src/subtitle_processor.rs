use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::debug;
use tempfile::NamedTempFile;

use crate::errors::{AppError, SubtitleError};
use crate::file_utils::FileManager;
use crate::language_utils::LanguageCode;
use crate::transcription::Segment;

// @module: SRT timestamps and subtitle serialization

/// Distance in milliseconds below which an offset is treated as float error
const MILLIS_EPSILON: f64 = 1e-6;

/// Format a non-negative offset in seconds as an SRT timestamp (HH:MM:SS,mmm)
///
/// Hours are not wrapped. Milliseconds are truncated. An offset within float
/// error of a whole millisecond, such as 1.2 (stored as 1.19999...), counts
/// as that millisecond.
pub fn format_timestamp(seconds: f64) -> Result<String, SubtitleError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SubtitleError::InvalidTimestamp { seconds });
    }

    let scaled = seconds * 1_000.0;
    let nearest = scaled.round();
    let total_ms = if (scaled - nearest).abs() < MILLIS_EPSILON {
        nearest as u64
    } else {
        scaled.floor() as u64
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Formatted start timestamp
    pub start: String,

    // @field: Formatted end timestamp
    pub end: String,

    // @field: Trimmed subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Build the entry for a surviving segment
    pub fn from_segment(index: usize, segment: &Segment) -> Result<Self, SubtitleError> {
        Ok(SubtitleEntry {
            index,
            start: format_timestamp(segment.start)?,
            end: format_timestamp(segment.end)?,
            text: segment.text.trim().to_string(),
        })
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Media the subtitles were generated from
    pub source_file: PathBuf,

    /// Entries with contiguous indices starting at 1
    pub entries: Vec<SubtitleEntry>,

    /// Language of the subtitle text
    pub language: LanguageCode,
}

impl SubtitleCollection {
    /// Number the segments 1..=n and format their timestamps
    ///
    /// Either every entry is built or the first formatting error is returned.
    pub fn from_segments(source_file: PathBuf, language: LanguageCode, segments: &[Segment]) -> Result<Self, SubtitleError> {
        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| SubtitleEntry::from_segment(i + 1, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubtitleCollection {
            source_file,
            entries,
            language,
        })
    }

    /// Render the whole SRT body
    pub fn to_srt_string(&self) -> String {
        self.to_string()
    }

    /// Write subtitles to an SRT file
    ///
    /// The body is written to a temporary file next to `path` and renamed into
    /// place, so a failed write never leaves a partial subtitle file behind.
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        let write_error = |reason: String| AppError::OutputWrite {
            path: path.to_path_buf(),
            reason,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        FileManager::ensure_dir(parent).map_err(|e| write_error(format!("{:#}", e)))?;

        let body = self.to_srt_string();
        let mut file = NamedTempFile::new_in(parent)
            .map_err(|e| write_error(format!("failed to create temporary file: {}", e)))?;
        file.write_all(body.as_bytes())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| write_error(e.to_string()))?;
        file.persist(path)
            .map_err(|e| write_error(e.error.to_string()))?;

        debug!(
            "Wrote {} {} entries for {:?} ({} bytes) to {:?}",
            self.entries.len(),
            self.language.display_name(),
            self.source_file,
            body.len(),
            path
        );
        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
