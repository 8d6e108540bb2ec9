use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{
    parser, FetchedTranscript, Transcript, TranscriptList, TranscriptProvider,
    TranslationLanguage, VideoId,
};
use crate::config::HttpConfig;
use crate::FetchError;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player?key=";
const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

const BOT_CHECK_REASON: &str = "Sign in to confirm you\u{2019}re not a bot";
const AGE_RESTRICTED_REASON: &str = "This video may be inappropriate for some users.";
const VIDEO_UNAVAILABLE_REASON: &str = "This video is unavailable";

static API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap());
static CONSENT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).unwrap());

/// Player API response, reduced to what transcript listing needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
    error_screen: Option<ErrorScreen>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ErrorScreen {
    player_error_message_renderer: Option<PlayerErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayerErrorMessage {
    subreason: Option<Text>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Captions {
    player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CaptionTracklist {
    caption_tracks: Option<Vec<CaptionTrack>>,
    translation_languages: Vec<ApiTranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    name: Text,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTranslationLanguage {
    language_code: String,
    #[serde(default)]
    language_name: Text,
}

/// YouTube's `{"runs": [{"text": ..}]}` / `{"simpleText": ..}` text object
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Text {
    simple_text: Option<String>,
    runs: Vec<TextRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextRun {
    text: String,
}

impl Text {
    fn to_plain(&self) -> String {
        match &self.simple_text {
            Some(text) => text.clone(),
            None => self.runs.iter().map(|run| run.text.as_str()).collect(),
        }
    }
}

/// Transcript provider backed by YouTube's web endpoints
pub struct YoutubeProvider {
    client: Client,
}

impl YoutubeProvider {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let accept_language = HeaderValue::from_str(&config.accept_language).map_err(|_| {
            FetchError::Retrieval(format!(
                "invalid Accept-Language header: {}",
                config.accept_language
            ))
        })?;
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the watch page, accepting the cookie consent form once if shown
    async fn fetch_video_html(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let url = format!("{}{}", WATCH_URL, video_id);
        let html = self.get_text(&url, None).await?;

        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Consent form shown, retrying with consent cookie");
        let consent = consent_cookie(&html)?;
        let html = self.get_text(&url, Some(&consent)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(FetchError::Retrieval(
                "failed to accept the YouTube cookie consent form".to_string(),
            ));
        }
        Ok(html)
    }

    async fn get_text(&self, url: &str, cookie: Option<&str>) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }

    async fn fetch_player_response(
        &self,
        video_id: &VideoId,
        api_key: &str,
    ) -> Result<PlayerResponse, FetchError> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38",
                }
            },
            "videoId": video_id.as_str(),
        });

        let response = self
            .client
            .post(format!("{}{}", INNERTUBE_PLAYER_URL, api_key))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.json::<PlayerResponse>().await?)
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptList, FetchError> {
        tracing::debug!("Listing transcripts for video {}", video_id);

        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_api_key(&html)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;

        build_transcript_list(video_id, player)
    }

    async fn fetch_transcript(
        &self,
        transcript: &Transcript,
        preserve_formatting: bool,
    ) -> Result<FetchedTranscript, FetchError> {
        if transcript.url.contains("&exp=xpe") {
            return Err(FetchError::Retrieval(
                "YouTube requires a proof-of-origin token for this transcript".to_string(),
            ));
        }

        tracing::debug!("Downloading timed text from {}", transcript.url);
        let xml = self.get_text(&transcript.url, None).await?;
        let segments = parser::parse_timedtext(&xml, preserve_formatting)?;

        Ok(FetchedTranscript {
            video_id: transcript.video_id.clone(),
            language: transcript.language.clone(),
            language_code: transcript.language_code.clone(),
            is_generated: transcript.is_generated,
            segments,
        })
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RequestBlocked);
    }
    Ok(response.error_for_status()?)
}

fn consent_cookie(html: &str) -> Result<String, FetchError> {
    CONSENT_VALUE
        .captures(html)
        .map(|caps| format!("CONSENT=YES+{}", &caps[1]))
        .ok_or_else(|| {
            FetchError::Retrieval("failed to read the YouTube cookie consent form".to_string())
        })
}

fn extract_api_key(html: &str) -> Result<String, FetchError> {
    if let Some(caps) = API_KEY.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains(RECAPTCHA_MARKER) {
        return Err(FetchError::RequestBlocked);
    }
    Err(FetchError::Retrieval(
        "could not find the player API key in the video page".to_string(),
    ))
}

fn assert_playability(status: Option<&PlayabilityStatus>) -> Result<(), FetchError> {
    let Some(status) = status else {
        return Ok(());
    };
    let code = match status.status.as_deref() {
        None | Some("OK") => return Ok(()),
        Some(code) => code,
    };
    let reason = status.reason.as_deref().unwrap_or_default();

    match (code, reason) {
        ("LOGIN_REQUIRED", BOT_CHECK_REASON) => Err(FetchError::RequestBlocked),
        ("LOGIN_REQUIRED", AGE_RESTRICTED_REASON) => Err(FetchError::AgeRestricted),
        ("ERROR", VIDEO_UNAVAILABLE_REASON) => Err(FetchError::VideoUnavailable),
        _ => {
            let subreason = status
                .error_screen
                .as_ref()
                .and_then(|screen| screen.player_error_message_renderer.as_ref())
                .and_then(|message| message.subreason.as_ref())
                .map(Text::to_plain)
                .filter(|text| !text.is_empty());

            let reason = match (reason.is_empty(), subreason) {
                (true, None) => code.to_string(),
                (true, Some(sub)) => sub,
                (false, None) => reason.to_string(),
                (false, Some(sub)) => format!("{} ({})", reason, sub),
            };
            Err(FetchError::VideoUnplayable { reason })
        }
    }
}

fn build_transcript_list(
    video_id: &VideoId,
    player: PlayerResponse,
) -> Result<TranscriptList, FetchError> {
    assert_playability(player.playability_status.as_ref())?;

    let tracklist = player
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer)
        .ok_or(FetchError::TranscriptsDisabled)?;
    let caption_tracks = tracklist
        .caption_tracks
        .ok_or(FetchError::TranscriptsDisabled)?;

    let translation_languages: Vec<TranslationLanguage> = tracklist
        .translation_languages
        .iter()
        .map(|lang| TranslationLanguage {
            language: lang.language_name.to_plain(),
            language_code: lang.language_code.clone(),
        })
        .collect();

    let tracks = caption_tracks
        .into_iter()
        .map(|track| Transcript {
            video_id: video_id.clone(),
            language: track.name.to_plain(),
            language_code: track.language_code,
            is_generated: track.kind.as_deref() == Some("asr"),
            is_translatable: track.is_translatable,
            url: track.base_url.replace("&fmt=srv3", ""),
            translation_languages: if track.is_translatable {
                translation_languages.clone()
            } else {
                Vec::new()
            },
        })
        .collect();

    Ok(TranscriptList {
        video_id: video_id.clone(),
        tracks,
        translation_languages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(json: serde_json::Value) -> PlayerResponse {
        serde_json::from_value(json).unwrap()
    }

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ")
    }

    #[test]
    fn test_builds_tracks_from_player_response() {
        let response = player(serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {
                            "baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=en&fmt=srv3",
                            "name": { "runs": [{ "text": "English" }] },
                            "languageCode": "en",
                            "isTranslatable": true
                        },
                        {
                            "baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=de&kind=asr",
                            "name": { "simpleText": "German (auto-generated)" },
                            "languageCode": "de",
                            "kind": "asr"
                        }
                    ],
                    "translationLanguages": [
                        { "languageCode": "fr", "languageName": { "runs": [{ "text": "French" }] } }
                    ]
                }
            }
        }));

        let list = build_transcript_list(&video(), response).unwrap();
        assert_eq!(list.tracks.len(), 2);

        let en = &list.tracks[0];
        assert_eq!(en.language, "English");
        assert!(!en.is_generated);
        assert!(en.is_translatable);
        assert_eq!(en.url, "https://www.youtube.com/api/timedtext?v=x&lang=en");
        assert_eq!(en.translation_languages[0].language, "French");

        let de = &list.tracks[1];
        assert_eq!(de.language, "German (auto-generated)");
        assert!(de.is_generated);
        assert!(!de.is_translatable);
        assert!(de.translation_languages.is_empty());
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        let response = player(serde_json::json!({ "playabilityStatus": { "status": "OK" } }));
        assert_eq!(
            build_transcript_list(&video(), response).unwrap_err(),
            FetchError::TranscriptsDisabled
        );

        let response = player(serde_json::json!({
            "captions": { "playerCaptionsTracklistRenderer": { "translationLanguages": [] } }
        }));
        assert_eq!(
            build_transcript_list(&video(), response).unwrap_err(),
            FetchError::TranscriptsDisabled
        );
    }

    #[test]
    fn test_playability_errors() {
        let status = |json: serde_json::Value| player(serde_json::json!({ "playabilityStatus": json }));

        let err = build_transcript_list(
            &video(),
            status(serde_json::json!({ "status": "ERROR", "reason": "This video is unavailable" })),
        )
        .unwrap_err();
        assert_eq!(err, FetchError::VideoUnavailable);

        let err = build_transcript_list(
            &video(),
            status(serde_json::json!({
                "status": "LOGIN_REQUIRED",
                "reason": "This video may be inappropriate for some users."
            })),
        )
        .unwrap_err();
        assert_eq!(err, FetchError::AgeRestricted);

        let err = build_transcript_list(
            &video(),
            status(serde_json::json!({
                "status": "LOGIN_REQUIRED",
                "reason": "Sign in to confirm you\u{2019}re not a bot"
            })),
        )
        .unwrap_err();
        assert_eq!(err, FetchError::RequestBlocked);

        let err = build_transcript_list(
            &video(),
            status(serde_json::json!({
                "status": "UNPLAYABLE",
                "reason": "Video unavailable",
                "errorScreen": {
                    "playerErrorMessageRenderer": {
                        "subreason": { "runs": [{ "text": "Blocked " }, { "text": "in your country" }] }
                    }
                }
            })),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FetchError::VideoUnplayable {
                reason: "Video unavailable (Blocked in your country)".to_string()
            }
        );
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-test_key1"})</script>"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyA-test_key1");

        let html = r#"<div class="g-recaptcha"></div>"#;
        assert_eq!(extract_api_key(html).unwrap_err(), FetchError::RequestBlocked);

        assert!(matches!(
            extract_api_key("<html></html>"),
            Err(FetchError::Retrieval(_))
        ));
    }

    #[test]
    fn test_consent_cookie() {
        let html = r#"<form action="https://consent.youtube.com/s"><input type="hidden" name="v" value="cb.20210328-17-p0.de+FX+119"></form>"#;
        assert_eq!(
            consent_cookie(html).unwrap(),
            "CONSENT=YES+cb.20210328-17-p0.de+FX+119"
        );
        assert!(consent_cookie("<form></form>").is_err());
    }

    #[tokio::test]
    async fn test_proof_of_origin_urls_are_rejected() {
        let provider = YoutubeProvider::new(&HttpConfig::default()).unwrap();
        let transcript = Transcript {
            video_id: video(),
            language: "English".to_string(),
            language_code: "en".to_string(),
            is_generated: false,
            is_translatable: false,
            url: "https://www.youtube.com/api/timedtext?v=x&exp=xpe".to_string(),
            translation_languages: Vec::new(),
        };
        assert!(matches!(
            provider.fetch_transcript(&transcript, false).await,
            Err(FetchError::Retrieval(_))
        ));
    }
}
