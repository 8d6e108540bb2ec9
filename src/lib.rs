//! yt-transcript - A Rust CLI tool for downloading YouTube transcripts
//!
//! This library resolves a video id from a URL or raw id, retrieves the caption
//! tracks YouTube publishes for that video (optionally machine-translated), and
//! renders them as plain text, JSON, SRT or WebVTT.

pub mod cli;
pub mod config;
pub mod output;
pub mod resolver;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, OutputFormat};
pub use config::Config;
pub use resolver::resolve;
pub use transcript::{
    FetchedTranscript, Segment, Transcript, TranscriptFetcher, TranscriptList,
    TranscriptRequest, VideoId,
};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// The input could not be turned into a video id
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot parse YouTube video id from: {input}")]
pub struct ParseError {
    pub input: String,
}

/// Failures reported while retrieving transcripts
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Transcripts are disabled for this video.")]
    TranscriptsDisabled,

    #[error("The requested video is unavailable.")]
    VideoUnavailable,

    #[error("{}", not_found_message(.requested))]
    NotFound { requested: Vec<String> },

    #[error("The transcript in '{language}' cannot be translated to '{target}'.")]
    TranslationUnavailable { language: String, target: String },

    #[error("No transcript could be translated to '{target}'.")]
    NoTranslatableTranscript { target: String },

    #[error("YouTube is blocking requests from this IP address.")]
    RequestBlocked,

    #[error("The video is age restricted and cannot be accessed without signing in.")]
    AgeRestricted,

    #[error("The video is unplayable: {reason}")]
    VideoUnplayable { reason: String },

    #[error("Failed to retrieve transcript: {0}")]
    Retrieval(String),
}

impl FetchError {
    /// Whether translate mode may move on to another track after this error
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::TranslationUnavailable { .. }
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Retrieval(err.to_string())
    }
}

fn not_found_message(requested: &[String]) -> String {
    if requested.is_empty() {
        "No transcript found for this video.".to_string()
    } else {
        format!(
            "No transcript found for the requested languages: {}.",
            requested.join(", ")
        )
    }
}

/// Writing the rendered transcript failed
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("Failed to write transcript: {0}")]
    Write(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_requested_languages_in_order() {
        let err = FetchError::NotFound {
            requested: vec!["es".to_string(), "fr".to_string(), "de".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No transcript found for the requested languages: es, fr, de."
        );
    }

    #[test]
    fn test_not_found_without_languages() {
        let err = FetchError::NotFound { requested: Vec::new() };
        assert_eq!(err.to_string(), "No transcript found for this video.");
    }

    #[test]
    fn test_fetch_errors_have_distinct_messages() {
        let messages = [
            FetchError::TranscriptsDisabled.to_string(),
            FetchError::VideoUnavailable.to_string(),
            FetchError::NotFound { requested: vec!["en".to_string()] }.to_string(),
            FetchError::Retrieval("boom".to_string()).to_string(),
            FetchError::TranslationUnavailable {
                language: "en".to_string(),
                target: "de".to_string(),
            }
            .to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_skippable_errors() {
        assert!(FetchError::NotFound { requested: vec![] }.is_skippable());
        assert!(FetchError::TranslationUnavailable {
            language: "en".to_string(),
            target: "de".to_string(),
        }
        .is_skippable());
        assert!(!FetchError::VideoUnavailable.is_skippable());
        assert!(!FetchError::Retrieval("x".to_string()).is_skippable());
    }

    #[test]
    fn test_parse_error_names_input() {
        let err = ParseError { input: "not a url".to_string() };
        assert_eq!(err.to_string(), "Cannot parse YouTube video id from: not a url");
    }
}
