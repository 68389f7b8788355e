use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

// @module: File and directory utilities

/// Extensions ffmpeg decodes that we accept without probing
const MEDIA_EXTENSIONS: [&str; 19] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg",
    "ts", "mts", "m2ts", "wav", "mp3", "m4a", "aac", "flac", "ogg",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @validates: Input media path is present and points to a file
    pub fn validate_input(input: Option<&Path>) -> std::result::Result<PathBuf, AppError> {
        let input = input
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(AppError::MissingInput)?;

        if !Self::file_exists(input) {
            return Err(AppError::InputNotFound(input.to_path_buf()));
        }

        Ok(input.to_path_buf())
    }

    // @checks: Extension is a known audio or video container
    pub fn is_media_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
    }

    // @generates: Output path for a subtitle file
    // @params: input_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    // @generates: `<stem>.<target>.srt` next to the input
    pub fn default_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let dir = input_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Self::generate_output_path(input_file, dir, target_language, "srt")
    }
}
