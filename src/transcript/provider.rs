use async_trait::async_trait;

use super::{FetchedTranscript, Transcript, TranscriptList, VideoId};
use crate::FetchError;

/// Source of caption tracks for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every caption track published for the video
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptList, FetchError>;

    /// Download the timed text of one track
    async fn fetch_transcript(
        &self,
        transcript: &Transcript,
        preserve_formatting: bool,
    ) -> Result<FetchedTranscript, FetchError>;
}
