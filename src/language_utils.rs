use anyhow::{Result, anyhow};
use isolang::Language;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Language utilities for subtitle languages
///
/// The supported languages form a closed set with a static display-name
/// mapping. Any other valid ISO 639-1 code is carried through untouched as
/// `LanguageCode::Other` so the recognition engine and the translation
/// provider can decide whether they support it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    Chinese,
    English,
    Spanish,
    French,
    German,
    Japanese,
    Korean,
    /// Raw ISO 639-1 code outside the supported set
    Other(String),
}

impl LanguageCode {
    /// Supported languages, in the order they are offered to the user
    pub const SUPPORTED: [LanguageCode; 7] = [
        LanguageCode::Chinese,
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Japanese,
        LanguageCode::Korean,
    ];

    /// Two-letter code passed to the collaborators
    pub fn code(&self) -> &str {
        match self {
            Self::Chinese => "zh",
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Other(code) => code,
        }
    }

    /// Human-readable name; raw codes display as themselves
    pub fn display_name(&self) -> &str {
        match self {
            Self::Chinese => "Chinese",
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Other(code) => code,
        }
    }

    /// Look up a supported language by its display name (exact match)
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|lang| lang.display_name() == name)
    }

    /// Look up a supported language by its code (exact match)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|lang| lang.code() == code)
    }

    /// Resolve user input (display name or code) into a language code
    ///
    /// `role` names the selection ("source" or "target") in the error
    /// reported when the input is empty.
    pub fn resolve(input: &str, role: &'static str) -> std::result::Result<Self, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::MissingLanguageSelection(role));
        }

        if let Some(lang) = Self::from_display_name(input).or_else(|| Self::from_code(input)) {
            return Ok(lang);
        }

        if input.len() == 2 && Language::from_639_1(input).is_some() {
            return Ok(Self::Other(input.to_string()));
        }

        Err(AppError::UnsupportedLanguage(input.to_string()))
    }

    pub fn is_english(&self) -> bool {
        matches!(self, Self::English)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::resolve(s, "requested")
    }
}

/// Get the English language name from an ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = Language::from_639_1(code.trim())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
