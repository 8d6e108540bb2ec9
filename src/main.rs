use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcript::transcript::{TrackFilter, YoutubeProvider};
use yt_transcript::{
    output, resolver, utils, Cli, Config, OutputError, ParseError, TranscriptFetcher,
    TranscriptRequest,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the transcript
    let default_filter = if cli.verbose {
        "yt_transcript=debug"
    } else {
        "yt_transcript=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", console::style("error:").red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 2 for an unusable video id, 3 for output failures, 1 for everything else
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ParseError>().is_some() {
        2
    } else if err.downcast_ref::<OutputError>().is_some() {
        3
    } else {
        1
    }
}

async fn run(cli: Cli) -> Result<()> {
    let video_id = resolver::resolve(&cli.video)?;
    tracing::debug!("Resolved video id {}", video_id);

    let config = Config::load(cli.config.as_deref())?;

    let provider = YoutubeProvider::new(&config.http)?;
    let fetcher = TranscriptFetcher::new(provider)
        .preserve_formatting(cli.preserve_formatting || config.output.preserve_formatting);

    let spinner = utils::spinner(!cli.quiet, "Fetching transcript...");

    if cli.list_transcripts {
        let list = fetcher.list(&video_id).await;
        spinner.finish_and_clear();
        let payload = output::format_transcript_list(&list?);
        output::write_output(&payload, cli.output.as_deref())?;
        return Ok(());
    }

    let languages = if cli.languages.is_empty() {
        config.languages.clone()
    } else {
        cli.languages.clone()
    };
    let filter = if cli.exclude_generated {
        TrackFilter::ManuallyCreated
    } else if cli.exclude_manually_created {
        TrackFilter::Generated
    } else {
        TrackFilter::Any
    };

    let request = TranscriptRequest::new(video_id)
        .with_languages(languages)
        .with_translation(cli.translate.clone())
        .with_filter(filter);

    let transcript = fetcher.fetch(&request).await;
    spinner.finish_and_clear();
    let transcript = transcript?;
    tracing::info!(
        "Fetched {} segments in '{}'",
        transcript.segments.len(),
        transcript.language_code
    );

    let format = cli.output_format(config.output.format);
    let timestamps = cli.timestamps || config.output.timestamps;
    let payload = output::render(&transcript, format, timestamps)?;

    output::write_output(&payload, cli.output.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yt_transcript::FetchError;

    #[test]
    fn test_exit_codes() {
        let parse = anyhow::Error::from(ParseError {
            input: "not a url".to_string(),
        });
        assert_eq!(exit_code(&parse), 2);

        let output = anyhow::Error::from(OutputError::Write(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )));
        assert_eq!(exit_code(&output), 3);

        let fetch = anyhow::Error::from(FetchError::TranscriptsDisabled);
        assert_eq!(exit_code(&fetch), 1);
    }

    #[test]
    fn test_exit_codes_survive_context() {
        let err = anyhow::Error::from(OutputError::Write(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
        .context("while saving");
        assert_eq!(exit_code(&err), 3);

        let err = anyhow::anyhow!("config broken");
        assert_eq!(exit_code(&err), 1);
    }
}
