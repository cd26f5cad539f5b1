//! Turns failures into the message the user sees and the process exit code.

use console::style;

use crate::fetcher::FetchError;

/// Exit code for every failure
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Anything that can stop a run
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write transcript to {target}: {source}")]
    Output {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),

    #[error("could not set up the HTTP client: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to render transcript: {0:#}")]
    Render(anyhow::Error),
}

/// What to tell the user about a failure
#[derive(Debug)]
pub struct ErrorReport {
    /// Curated one-paragraph message for stderr
    pub message: String,

    /// Full diagnostic detail, logged only for failures nobody anticipated
    pub detail: Option<String>,

    pub exit_code: u8,
}

impl ErrorReport {
    fn curated(message: String) -> Self {
        Self {
            message,
            detail: None,
            exit_code: FAILURE_EXIT_CODE,
        }
    }

    /// Print the message to stderr and log any diagnostic detail
    pub fn emit(&self) {
        eprintln!("{} {}", style("Error:").red().bold(), self.message);
        if let Some(detail) = &self.detail {
            tracing::error!("{}", detail);
        }
    }
}

/// Map a failure to its user-facing report
pub fn describe(error: &AppError) -> ErrorReport {
    match error {
        AppError::Fetch(fetch) => describe_fetch(fetch),
        AppError::Output { target, source } => {
            ErrorReport::curated(format!("Failed to write transcript to {}: {}", target, source))
        }
        AppError::Config(error) => ErrorReport::curated(format!("Invalid configuration: {:#}", error)),
        AppError::Transport(error) => ErrorReport::curated(format!(
            "Could not set up the HTTP client: {}. Please check the --proxy and --timeout values.",
            crate::utils::error_chain(error)
        )),
        AppError::Render(error) => ErrorReport {
            message: format!("An unexpected error occurred. Details: {:#}", error),
            detail: Some(format!("{:?}", error)),
            exit_code: FAILURE_EXIT_CODE,
        },
    }
}

fn describe_fetch(error: &FetchError) -> ErrorReport {
    match error {
        FetchError::VideoUnavailable { video_id } => ErrorReport::curated(format!(
            "Video '{}' is unavailable. It may have been deleted or made private. Please check the video ID.",
            video_id
        )),
        FetchError::TranscriptsDisabled { video_id } => ErrorReport::curated(format!(
            "Transcripts are disabled for video '{}'. Captions were disabled by the uploader.",
            video_id
        )),
        FetchError::NoTranscriptFound {
            video_id,
            requested,
            available,
        } => {
            let mut message = format!("Could not find a transcript for video '{}'.", video_id);
            if !requested.is_empty() {
                message.push_str(&format!("\nTried languages: {}", requested.join(", ")));
            }
            if !available.is_empty() {
                message.push_str(&format!("\nAvailable transcripts: {}", available.join(", ")));
            }
            ErrorReport::curated(message)
        }
        FetchError::RequestBlocked { .. } => ErrorReport::curated(
            "Your request was blocked by YouTube. This usually happens after too many requests or from \
             cloud provider IPs. Try again later or use --proxy to route through a different IP."
                .to_string(),
        ),
        FetchError::NetworkTimeout(detail) => ErrorReport::curated(format!(
            "A network issue occurred (the request timed out): {}. Please check your internet connection or raise --timeout.",
            detail
        )),
        FetchError::NetworkError(detail) => ErrorReport::curated(format!(
            "A network issue occurred: {}. Please check your internet connection.",
            detail
        )),
        FetchError::Unexpected(error) => ErrorReport {
            message: format!("An unexpected error occurred. Details: {:#}", error),
            detail: Some(format!("{:?}", error)),
            exit_code: FAILURE_EXIT_CODE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_report(error: FetchError) -> ErrorReport {
        describe(&AppError::Fetch(error))
    }

    #[test]
    fn test_video_unavailable_names_the_video() {
        let report = fetch_report(FetchError::VideoUnavailable {
            video_id: "test_id".to_string(),
        });
        assert!(report.message.contains("Video 'test_id' is unavailable"));
        assert!(report.message.contains("Please check the video ID"));
        assert_eq!(report.exit_code, 1);
        assert!(report.detail.is_none());
    }

    #[test]
    fn test_transcripts_disabled() {
        let report = fetch_report(FetchError::TranscriptsDisabled {
            video_id: "test_id".to_string(),
        });
        assert!(report.message.contains("Transcripts are disabled for video 'test_id'"));
        assert!(report.message.contains("disabled by the uploader"));
    }

    #[test]
    fn test_no_transcript_found_lists_tried_languages() {
        let report = fetch_report(FetchError::NoTranscriptFound {
            video_id: "test_id_langs".to_string(),
            requested: vec!["es".to_string(), "fr".to_string()],
            available: vec!["en (English)".to_string()],
        });
        assert!(report.message.contains("Could not find a transcript for video 'test_id_langs'"));
        assert!(report.message.contains("Tried languages: es, fr"));
        assert!(report.message.contains("Available transcripts: en (English)"));
    }

    #[test]
    fn test_no_transcript_found_without_languages() {
        let report = fetch_report(FetchError::NoTranscriptFound {
            video_id: "test_id".to_string(),
            requested: Vec::new(),
            available: Vec::new(),
        });
        assert_eq!(report.message, "Could not find a transcript for video 'test_id'.");
    }

    #[test]
    fn test_request_blocked_suggests_proxy() {
        let report = fetch_report(FetchError::RequestBlocked {
            video_id: "test_id".to_string(),
        });
        assert!(report.message.contains("Your request was blocked by YouTube"));
        assert!(report.message.contains("--proxy"));
    }

    #[test]
    fn test_network_failures_include_detail() {
        let timeout = fetch_report(FetchError::NetworkTimeout("Connection timed out".to_string()));
        assert!(timeout.message.contains("A network issue occurred"));
        assert!(timeout.message.contains("Connection timed out"));

        let other = fetch_report(FetchError::NetworkError("Some other network problem".to_string()));
        assert!(other.message.contains("A network issue occurred"));
        assert!(other.message.contains("Some other network problem"));
    }

    #[test]
    fn test_unexpected_error_carries_full_detail() {
        let error = anyhow::anyhow!("A very generic error").context("while fetching");
        let report = fetch_report(FetchError::Unexpected(error));
        assert!(report
            .message
            .contains("An unexpected error occurred. Details: while fetching: A very generic error"));
        assert!(report.detail.as_deref().unwrap().contains("A very generic error"));
    }

    #[test]
    fn test_output_failure() {
        let report = describe(&AppError::Output {
            target: "out.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        });
        assert_eq!(report.message, "Failed to write transcript to out.txt: permission denied");
        assert_eq!(report.exit_code, 1);
    }
}
