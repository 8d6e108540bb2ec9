use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Format seconds as `hh:mm:ss.mmm` (or `hh:mm:ss,mmm` with a comma separator)
pub fn format_timestamp(seconds: f64, fraction_separator: char) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, fraction_separator, millis
    )
}

/// Join the lines of caption text into a single trimmed line
pub fn flatten_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spinner on stderr, hidden when `enabled` is false or stderr is not a terminal
pub fn spinner(enabled: bool, message: &str) -> ProgressBar {
    if !enabled || !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
