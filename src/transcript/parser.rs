//! Timed text (`<transcript><text start=".." dur="..">`) parsing.

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};

use super::Segment;
use crate::FetchError;

/// Tags kept when formatting is preserved
const FORMATTING_TAGS: &[&str] = &[
    "strong", "em", "b", "i", "mark", "small", "del", "ins", "sub", "sup",
];

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?\s*([A-Za-z][A-Za-z0-9]*)?[^>]*>").unwrap());

struct PendingSegment {
    start: f64,
    duration: f64,
    text: String,
}

/// Parse a timed text document into segments
pub fn parse_timedtext(xml: &str, preserve_formatting: bool) -> Result<Vec<Segment>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut pending: Option<PendingSegment> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => {
                let start = float_attribute(&e, "start")?
                    .ok_or_else(|| malformed("caption without start time"))?;
                let duration = float_attribute(&e, "dur")?.unwrap_or(0.0);
                pending = Some(PendingSegment {
                    start,
                    duration,
                    text: String::new(),
                });
            }
            Ok(Event::Text(e)) => {
                if let Some(segment) = pending.as_mut() {
                    let text = e.unescape().map_err(|err| malformed(err))?;
                    segment.text.push_str(&text);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => {
                if let Some(segment) = pending.take() {
                    if !segment.text.is_empty() {
                        segments.push(Segment {
                            text: clean_text(&segment.text, preserve_formatting),
                            start: segment.start,
                            duration: segment.duration,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(malformed(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    err
                )))
            }
            _ => {}
        }
    }

    Ok(segments)
}

fn float_attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<f64>, FetchError> {
    let Some(attr) = element.try_get_attribute(name).map_err(|err| malformed(err))? else {
        return Ok(None);
    };
    let value = attr.unescape_value().map_err(|err| malformed(err))?;
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| malformed(format!("invalid {} value '{}'", name, value)))
}

/// Decode the HTML entities YouTube leaves in caption text and strip markup
fn clean_text(raw: &str, preserve_formatting: bool) -> String {
    let decoded = html_escape::decode_html_entities(raw);

    TAG.replace_all(&decoded, |caps: &Captures| {
        let keep = preserve_formatting
            && caps
                .get(1)
                .map(|name| FORMATTING_TAGS.contains(&name.as_str().to_ascii_lowercase().as_str()))
                .unwrap_or(false);
        if keep {
            caps[0].to_string()
        } else {
            String::new()
        }
    })
    .into_owned()
}

fn malformed(detail: impl std::fmt::Display) -> FetchError {
    FetchError::Retrieval(format!("malformed transcript data: {}", detail))
}
