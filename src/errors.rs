/*!
 * Error types for the vidtrans application.
 *
 * Each collaborator of the subtitle pipeline has its own error enum, and
 * `AppError` carries the user-facing kinds a run can abort with. All of
 * them are defined with the thiserror crate.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the speech recognition engine
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The model file is missing or the engine refused to load it
    #[error("Failed to load model {model}: {reason}")]
    ModelLoad {
        model: String,
        reason: String,
    },

    /// The media could not be decoded into audio
    #[error("Failed to decode media {path:?}: {reason}")]
    MediaDecode {
        path: PathBuf,
        reason: String,
    },

    /// The engine ran but exited with an error
    #[error("Recognition engine failed: {0}")]
    EngineFailed(String),

    /// The engine produced output that could not be read
    #[error("Invalid recognition output: {0}")]
    InvalidOutput(String),
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Offset that cannot be rendered as an SRT timestamp
    #[error("Cannot format timestamp from {seconds} seconds")]
    InvalidTimestamp {
        seconds: f64,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider answered with nothing usable
    #[error("Provider returned an empty translation for: {0:?}")]
    EmptyResponse(String),

    /// The translation service could not be built from its configuration
    #[error("Invalid translation configuration: {0}")]
    Configuration(String),
}

/// Main application error type that wraps all other errors
///
/// Every variant aborts the current run and is reported once.
#[derive(Error, Debug)]
pub enum AppError {
    /// No media input was given
    #[error("Please select an input file")]
    MissingInput,

    /// The selected media does not exist
    #[error("Input file does not exist: {0:?}")]
    InputNotFound(PathBuf),

    /// Source or target language is empty
    #[error("Please select the {0} language")]
    MissingLanguageSelection(&'static str),

    /// Language input is neither a supported name nor an ISO 639-1 code
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The recognition model could not be loaded
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// Recognition of the media failed
    #[error("Transcription failed: {0}")]
    Recognition(String),

    /// A translation call failed
    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),

    /// Subtitle construction failed
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The subtitle file could not be written
    #[error("Failed to save SRT file {path:?}: {reason}")]
    OutputWrite {
        path: PathBuf,
        reason: String,
    },

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RecognitionError> for AppError {
    fn from(error: RecognitionError) -> Self {
        match error {
            RecognitionError::ModelLoad { .. } => Self::ModelLoad(error.to_string()),
            other => Self::Recognition(other.to_string()),
        }
    }
}
