use serde::{Deserialize, Serialize};
use std::fmt;

pub mod parser;
pub mod provider;
pub mod youtube;

pub use provider::TranscriptProvider;
pub use youtube::YoutubeProvider;

use crate::FetchError;

/// Languages requested when the caller has no preference
pub const DEFAULT_LANGUAGES: &[&str] = &["en"];

/// Canonical YouTube video id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timed caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Caption text, may span several lines
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A language a track can be machine-translated to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationLanguage {
    pub language: String,
    pub language_code: String,
}

/// A caption track of a video, not yet downloaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,

    /// Human readable language name
    pub language: String,

    pub language_code: String,

    /// Automatically generated captions
    pub is_generated: bool,

    pub is_translatable: bool,

    /// Timed text URL
    pub url: String,

    pub translation_languages: Vec<TranslationLanguage>,
}

impl Transcript {
    /// Derive the machine-translated variant of this track
    pub fn translate(&self, target: &str) -> Result<Transcript, FetchError> {
        let unavailable = || FetchError::TranslationUnavailable {
            language: self.language_code.clone(),
            target: target.to_string(),
        };

        if !self.is_translatable {
            return Err(unavailable());
        }

        let translation = self
            .translation_languages
            .iter()
            .find(|lang| lang.language_code == target)
            .ok_or_else(unavailable)?;

        Ok(Transcript {
            video_id: self.video_id.clone(),
            language: translation.language.clone(),
            language_code: translation.language_code.clone(),
            is_generated: true,
            is_translatable: false,
            url: format!("{}&tlang={}", self.url, urlencoding::encode(target)),
            translation_languages: Vec::new(),
        })
    }
}

/// All caption tracks of one video in the order YouTube lists them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptList {
    pub video_id: VideoId,
    pub tracks: Vec<Transcript>,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl TranscriptList {
    pub fn iter(&self) -> impl Iterator<Item = &Transcript> {
        self.tracks.iter()
    }

    pub fn manually_created(&self) -> impl Iterator<Item = &Transcript> {
        self.tracks.iter().filter(|t| !t.is_generated)
    }

    pub fn generated(&self) -> impl Iterator<Item = &Transcript> {
        self.tracks.iter().filter(|t| t.is_generated)
    }

    /// Track for `code` allowed by `filter`, manually created ones first
    pub fn get(&self, code: &str, filter: TrackFilter) -> Option<&Transcript> {
        self.manually_created()
            .chain(self.generated())
            .filter(|t| filter.allows(t))
            .find(|t| t.language_code == code)
    }

    /// First track matching the language codes in priority order
    pub fn find_transcript(&self, languages: &[String]) -> Result<&Transcript, FetchError> {
        self.find_in(languages, TrackFilter::Any)
    }

    pub fn find_manually_created_transcript(
        &self,
        languages: &[String],
    ) -> Result<&Transcript, FetchError> {
        self.find_in(languages, TrackFilter::ManuallyCreated)
    }

    pub fn find_generated_transcript(
        &self,
        languages: &[String],
    ) -> Result<&Transcript, FetchError> {
        self.find_in(languages, TrackFilter::Generated)
    }

    fn find_in(
        &self,
        languages: &[String],
        filter: TrackFilter,
    ) -> Result<&Transcript, FetchError> {
        languages
            .iter()
            .find_map(|code| self.get(code, filter))
            .ok_or_else(|| FetchError::NotFound {
                requested: languages.to_vec(),
            })
    }
}

/// A downloaded transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video_id: VideoId,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub segments: Vec<Segment>,
}

/// Which kinds of track may be picked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackFilter {
    #[default]
    Any,
    ManuallyCreated,
    Generated,
}

impl TrackFilter {
    pub fn allows(self, track: &Transcript) -> bool {
        match self {
            TrackFilter::Any => true,
            TrackFilter::ManuallyCreated => !track.is_generated,
            TrackFilter::Generated => track.is_generated,
        }
    }
}

/// What to fetch for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRequest {
    pub video_id: VideoId,

    /// Preferred language codes, empty means [`DEFAULT_LANGUAGES`]
    pub languages: Vec<String>,

    /// Translation target language code
    pub translate_to: Option<String>,

    pub filter: TrackFilter,
}

impl TranscriptRequest {
    pub fn new(video_id: VideoId) -> Self {
        Self {
            video_id,
            languages: Vec::new(),
            translate_to: None,
            filter: TrackFilter::Any,
        }
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_translation(mut self, target: Option<String>) -> Self {
        self.translate_to = target;
        self
    }

    pub fn with_filter(mut self, filter: TrackFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Requested languages with the default applied
    pub fn effective_languages(&self) -> Vec<String> {
        if self.languages.is_empty() {
            DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect()
        } else {
            self.languages.clone()
        }
    }
}

/// Applies the language preference and translation fallback policy on top of a provider
pub struct TranscriptFetcher<P> {
    provider: P,
    preserve_formatting: bool,
}

impl<P: TranscriptProvider> TranscriptFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            preserve_formatting: false,
        }
    }

    pub fn preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }

    /// List the caption tracks available for a video
    pub async fn list(&self, video_id: &VideoId) -> Result<TranscriptList, FetchError> {
        self.provider.list_transcripts(video_id).await
    }

    /// Fetch the transcript selected by `request`
    pub async fn fetch(&self, request: &TranscriptRequest) -> Result<FetchedTranscript, FetchError> {
        let list = self.list(&request.video_id).await?;
        tracing::debug!(
            "Video {} has {} caption tracks",
            request.video_id,
            list.tracks.len()
        );

        match &request.translate_to {
            None => self.fetch_direct(&list, request).await,
            Some(target) => {
                self.fetch_translated(&list, &request.languages, request.filter, target)
                    .await
            }
        }
    }

    async fn fetch_direct(
        &self,
        list: &TranscriptList,
        request: &TranscriptRequest,
    ) -> Result<FetchedTranscript, FetchError> {
        let track = list.find_in(&request.effective_languages(), request.filter)?;

        tracing::info!(
            "Fetching '{}' transcript ({})",
            track.language_code,
            if track.is_generated { "generated" } else { "manual" }
        );
        self.provider
            .fetch_transcript(track, self.preserve_formatting)
            .await
    }

    async fn fetch_translated(
        &self,
        list: &TranscriptList,
        languages: &[String],
        filter: TrackFilter,
        target: &str,
    ) -> Result<FetchedTranscript, FetchError> {
        let mut tried: Vec<&Transcript> = Vec::new();

        for code in languages {
            let Some(track) = list.get(code, filter) else {
                tracing::debug!("No '{}' track, trying next language", code);
                continue;
            };
            if !track.is_translatable {
                tracing::debug!("'{}' track is not translatable", code);
                continue;
            }

            tried.push(track);
            match self.translate_and_fetch(track, target).await {
                Ok(transcript) => return Ok(transcript),
                Err(err) if err.is_skippable() => {
                    tracing::debug!("Skipping '{}': {}", code, err);
                }
                Err(err) => return Err(err),
            }
        }

        let remaining = list
            .iter()
            .filter(|t| t.is_translatable && filter.allows(t))
            .filter(|t| !tried.iter().any(|done| std::ptr::eq(*done, *t)));
        for track in remaining {
            match self.translate_and_fetch(track, target).await {
                Ok(transcript) => return Ok(transcript),
                Err(err) if err.is_skippable() => {
                    tracing::debug!("Skipping '{}': {}", track.language_code, err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(FetchError::NoTranslatableTranscript {
            target: target.to_string(),
        })
    }

    async fn translate_and_fetch(
        &self,
        track: &Transcript,
        target: &str,
    ) -> Result<FetchedTranscript, FetchError> {
        let translated = track.translate(target)?;
        tracing::info!(
            "Translating '{}' transcript to '{}'",
            track.language_code,
            target
        );
        self.provider
            .fetch_transcript(&translated, self.preserve_formatting)
            .await
    }
}
