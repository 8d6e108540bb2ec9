//! Video id resolution from URLs and raw ids.
//!
//! A bare id is recognised before any URL parsing happens, so ids that would
//! also parse as relative references never reach the URL rules.

use url::Url;

use crate::transcript::VideoId;
use crate::ParseError;

/// Length of the ids YouTube hands out
pub const VIDEO_ID_LENGTH: usize = 11;

/// How a video id is pulled out of a URL on a known host
#[derive(Debug, Clone, Copy)]
enum PathRule {
    /// First path segment (`youtu.be/<id>`)
    FirstSegment,
    /// `v` query parameter on `/watch`
    WatchQuery,
    /// Segment following one of these prefixes (`/embed/<id>`)
    AfterPrefix(&'static [&'static str]),
}

const ID_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

/// Known hosts and the rules tried for each, in order
const HOST_RULES: &[(&[&str], &[PathRule])] = &[
    (&["youtu.be"], &[PathRule::FirstSegment]),
    (
        &[
            "youtube.com",
            "www.youtube.com",
            "m.youtube.com",
            "music.youtube.com",
        ],
        &[PathRule::WatchQuery, PathRule::AfterPrefix(ID_PREFIXES)],
    ),
    (
        &["youtube-nocookie.com", "www.youtube-nocookie.com"],
        &[PathRule::AfterPrefix(&["embed"])],
    ),
];

/// Resolve a URL or raw id to a video id
pub fn resolve(input: &str) -> Result<VideoId, ParseError> {
    let candidate = input.trim();
    if looks_like_video_id(candidate) {
        return Ok(VideoId::new(candidate));
    }

    let fail = || ParseError {
        input: input.to_string(),
    };

    let parsed = Url::parse(candidate).map_err(|_| fail())?;
    let host = parsed.host_str().ok_or_else(fail)?.to_ascii_lowercase();

    let rules = HOST_RULES
        .iter()
        .find(|(hosts, _)| hosts.contains(&host.as_str()))
        .map(|(_, rules)| *rules)
        .ok_or_else(fail)?;

    rules
        .iter()
        .filter_map(|rule| apply_rule(*rule, &parsed))
        .find(|id| looks_like_video_id(id))
        .map(VideoId::new)
        .ok_or_else(fail)
}

fn apply_rule(rule: PathRule, url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    match rule {
        PathRule::FirstSegment => segments.next().map(str::to_string),
        PathRule::WatchQuery => {
            if segments.next() != Some("watch") {
                return None;
            }
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.trim().to_string())
        }
        PathRule::AfterPrefix(prefixes) => {
            let prefix = segments.next()?;
            if !prefixes.contains(&prefix) {
                return None;
            }
            segments.next().map(str::to_string)
        }
    }
}

/// Whether `value` has the shape of a YouTube video id
pub fn looks_like_video_id(value: &str) -> bool {
    value.len() == VIDEO_ID_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
