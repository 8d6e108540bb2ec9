use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "yt-transcript",
    about = "Download a YouTube transcript and write it to stdout or a file",
    version,
    long_about = "Resolves a YouTube URL or 11-character video id, fetches the caption track that best matches your language preferences (optionally machine-translated), and prints it as plain text, JSON, SRT or WebVTT."
)]
pub struct Cli {
    /// YouTube video URL or 11-character video id
    #[arg(value_name = "VIDEO")]
    pub video: String,

    /// Preferred language codes in priority order (repeatable, e.g. -l en -l es)
    #[arg(short, long = "language", value_name = "CODE", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Translate the transcript to this language code
    #[arg(short, long, value_name = "CODE")]
    pub translate: Option<String>,

    /// Output file path (prints to stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the transcript segments as JSON (same as --format json)
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Prefix each text line with its [start - end] time range
    #[arg(long)]
    pub timestamps: bool,

    /// Keep basic HTML formatting tags (<i>, <b>, ...) in caption text
    #[arg(long)]
    pub preserve_formatting: bool,

    /// Only consider manually created transcripts
    #[arg(long, conflicts_with = "exclude_manually_created")]
    pub exclude_generated: bool,

    /// Only consider automatically generated transcripts
    #[arg(long)]
    pub exclude_manually_created: bool,

    /// List the available transcripts instead of fetching one
    #[arg(long)]
    pub list_transcripts: bool,

    /// Path to a YAML config file
    #[arg(long, value_name = "FILE", env = "YT_TRANSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The output format after applying `--json` and the configured default
    pub fn output_format(&self, default: OutputFormat) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format.unwrap_or(default)
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one caption per line
    #[default]
    Text,
    /// JSON array of segments
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
        }
    }
}
