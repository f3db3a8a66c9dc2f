//! Subtitle payload parsers. All functions are pure.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Subtitle payload formats offered by YouTube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// WebVTT, cue based.
    Vtt,
    /// YouTube timed-text JSON.
    Json3,
    /// YouTube timed-text XML.
    Srv3,
}

impl SubtitleFormat {
    /// Formats accepted by the subtitle fallback, by extension.
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "vtt" => Some(SubtitleFormat::Vtt),
            "json3" => Some(SubtitleFormat::Json3),
            "srv3" => Some(SubtitleFormat::Srv3),
            _ => None,
        }
    }
}

/// Remove anything that looks like a markup tag.
pub fn strip_tags(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}

/// `Kind: captions` style header line.
fn is_vtt_metadata(line: &str) -> bool {
    !line.contains("-->")
        && line.split_once(':').is_some_and(|(key, _)| {
            !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Flatten WebVTT into a single space-joined line of text.
///
/// Drops the header (`WEBVTT` and `Key: value` metadata), blank lines,
/// numeric cue ids and timing lines, and strips inline tags.
pub fn parse_vtt(content: &str) -> String {
    let mut lines = content.lines().map(str::trim).peekable();
    if lines.next_if(|l| l.starts_with("WEBVTT")).is_some() {
        while lines.next_if(|l| is_vtt_metadata(l)).is_some() {}
    }

    lines
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("WEBVTT"))
        .filter(|line| !line.contains("-->"))
        .filter(|line| !line.chars().all(|c| c.is_ascii_digit()))
        .map(strip_tags)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

fn json3_events(content: &str) -> Option<Vec<Vec<String>>> {
    let parsed: TimedText = serde_json::from_str(content).ok()?;
    Some(
        parsed
            .events
            .into_iter()
            .map(|event| {
                event
                    .segs
                    .into_iter()
                    .map(|seg| seg.utf8.trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect()
            })
            .collect(),
    )
}

/// Flatten timed-text JSON into a single space-joined line.
///
/// Returns `None` if the payload is not timed-text JSON.
pub fn parse_json3(content: &str) -> Option<String> {
    let words: Vec<String> = json3_events(content)?.into_iter().flatten().collect();
    Some(words.join(" "))
}

/// Flatten timed-text JSON into one line per event.
pub fn parse_json3_lines(content: &str) -> Option<String> {
    let lines: Vec<String> = json3_events(content)?
        .into_iter()
        .map(|segs| segs.join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    Some(lines.join("\n"))
}

/// Parse a subtitle payload of the given format into plain text.
pub fn parse_subtitles(content: &str, format: SubtitleFormat) -> Option<String> {
    let text = match format {
        SubtitleFormat::Vtt => parse_vtt(content),
        SubtitleFormat::Json3 => parse_json3(content)?,
        SubtitleFormat::Srv3 => strip_tags(content).trim().to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}
