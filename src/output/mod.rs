use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::FetchedTranscript;
use crate::OutputError;

pub mod formatters;

pub use formatters::*;

/// Render a transcript in the requested format
pub fn render(
    transcript: &FetchedTranscript,
    format: OutputFormat,
    include_timestamps: bool,
) -> Result<String> {
    let segments = &transcript.segments;
    let content = match format {
        OutputFormat::Text => format_as_text(segments, include_timestamps),
        OutputFormat::Json => format_as_json(segments)?,
        OutputFormat::Srt => format_as_srt(segments),
        OutputFormat::Vtt => format_as_vtt(segments),
    };
    Ok(content)
}

/// Write the payload to `destination`, or to stdout if there is none
pub fn write_output(content: &str, destination: Option<&Path>) -> Result<(), OutputError> {
    match destination {
        Some(path) => save_to_file(content, path),
        None => print_to_console(content),
    }
}

/// Save payload to a file, creating parent directories
pub fn save_to_file(content: &str, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    let mut payload = String::with_capacity(content.len() + 1);
    payload.push_str(content);
    payload.push('\n');
    fs_err::write(path, payload)?;

    tracing::info!("Transcript saved to {}", path.display());
    Ok(())
}

/// Print payload to stdout
pub fn print_to_console(content: &str) -> Result<(), OutputError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", content)?;
    handle.flush()?;
    Ok(())
}
