use anyhow::Result;
use std::fmt::Write as _;

use crate::transcript::{Segment, TranscriptList};
use crate::utils::{flatten_text, format_timestamp};

/// Plain text, one caption per line, empty captions dropped
pub fn format_as_text(segments: &[Segment], include_timestamps: bool) -> String {
    segments
        .iter()
        .filter_map(|segment| {
            let text = flatten_text(&segment.text);
            if text.is_empty() {
                return None;
            }
            if include_timestamps {
                Some(format!(
                    "[{} - {}] {}",
                    format_timestamp(segment.start, '.'),
                    format_timestamp(segment.end(), '.'),
                    text
                ))
            } else {
                Some(text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indented JSON array of the raw segments
pub fn format_as_json(segments: &[Segment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(segments)?)
}

/// SRT subtitles
pub fn format_as_srt(segments: &[Segment]) -> String {
    cues(segments)
        .enumerate()
        .map(|(i, (start, end, text))| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_timestamp(start, ','),
                format_timestamp(end, ','),
                text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// WebVTT subtitles
pub fn format_as_vtt(segments: &[Segment]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    let body = cues(segments)
        .map(|(start, end, text)| {
            format!(
                "{} --> {}\n{}\n",
                format_timestamp(start, '.'),
                format_timestamp(end, '.'),
                text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    out.push_str(&body);
    out
}

/// Cue timings with each end clipped to the next segment's start
fn cues(segments: &[Segment]) -> impl Iterator<Item = (f64, f64, &str)> {
    segments.iter().enumerate().map(move |(i, segment)| {
        let end = match segments.get(i + 1) {
            Some(next) if next.start < segment.end() => next.start,
            _ => segment.end(),
        };
        (segment.start, end, segment.text.as_str())
    })
}

/// Human readable overview of the tracks a video offers
pub fn format_transcript_list(list: &TranscriptList) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "For this video ({}) transcripts are available in the following languages:",
        list.video_id
    );

    let sections = [
        ("MANUALLY CREATED", list.manually_created().collect::<Vec<_>>()),
        ("GENERATED", list.generated().collect::<Vec<_>>()),
    ];
    for (title, tracks) in sections {
        let _ = writeln!(out, "\n({})", title);
        if tracks.is_empty() {
            let _ = writeln!(out, "None");
        }
        for track in tracks {
            let _ = writeln!(
                out,
                " - {} (\"{}\"){}",
                track.language_code,
                track.language,
                if track.is_translatable { " [TRANSLATABLE]" } else { "" }
            );
        }
    }

    let _ = writeln!(out, "\n(TRANSLATION LANGUAGES)");
    if list.translation_languages.is_empty() {
        let _ = writeln!(out, "None");
    }
    for lang in &list.translation_languages {
        let _ = writeln!(out, " - {} (\"{}\")", lang.language_code, lang.language);
    }

    out.trim_end().to_string()
}
