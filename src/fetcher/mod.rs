use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod tracks;
pub mod youtube;

pub use tracks::{TrackList, TranscriptTrack};
pub use youtube::YoutubeTranscriptApi;

/// One timestamped caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Offset from the start of the video in seconds
    pub start: f64,

    /// How long the caption stays on screen in seconds
    pub duration: f64,

    /// Caption text
    pub text: String,
}

impl CaptionEntry {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }
}

/// What to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub video_id: String,

    /// Language codes in priority order; `None` takes the source's default path
    pub languages: Option<Vec<String>>,
}

/// Failure categories a transcript source can report
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("video {video_id} is unavailable")]
    VideoUnavailable { video_id: String },

    #[error("transcripts are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("no transcript found for video {video_id}")]
    NoTranscriptFound {
        video_id: String,
        /// Languages that were explicitly asked for (empty on the default path)
        requested: Vec<String>,
        /// Human-readable descriptions of the tracks the video does have
        available: Vec<String>,
    },

    #[error("request for video {video_id} was blocked by YouTube")]
    RequestBlocked { video_id: String },

    #[error("request timed out: {0}")]
    NetworkTimeout(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let detail = crate::utils::error_chain(&error);

        if error.is_timeout() {
            FetchError::NetworkTimeout(detail)
        } else if error.is_decode() {
            FetchError::Unexpected(anyhow::Error::new(error).context("Failed to decode YouTube response"))
        } else {
            FetchError::NetworkError(detail)
        }
    }
}

/// A capability that can retrieve the caption entries of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Retrieve captions for the requested video
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<CaptionEntry>, FetchError>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Fetch the transcript of `video_id` from `source`, honouring an optional language priority list
pub async fn fetch_transcript(
    source: &dyn TranscriptSource,
    video_id: &str,
    languages: Option<&[String]>,
) -> Result<Vec<CaptionEntry>, FetchError> {
    let languages = languages
        .filter(|codes| !codes.is_empty())
        .map(|codes| codes.to_vec());

    match &languages {
        Some(codes) => tracing::info!(
            "Fetching transcript for {} from {} (languages: {})",
            video_id,
            source.source_name(),
            codes.join(", ")
        ),
        None => tracing::info!(
            "Fetching default transcript for {} from {}",
            video_id,
            source.source_name()
        ),
    }

    let request = FetchRequest {
        video_id: video_id.to_string(),
        languages,
    };

    let entries = source.fetch(&request).await?;
    tracing::debug!("Received {} caption entries", entries.len());

    Ok(entries)
}
