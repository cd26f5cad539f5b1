//! yt-transcript - A Rust CLI tool for fetching YouTube video transcripts
//!
//! This library fetches the caption track of a YouTube video, honouring language
//! preferences, proxies and timeouts, and renders it as timestamped text.

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod transport;
pub mod utils;

pub use cli::{Cli, LogLevel, OutputFormat};
pub use config::{Config, RunConfig};
pub use fetcher::{fetch_transcript, CaptionEntry, FetchError, FetchRequest, TranscriptSource, YoutubeTranscriptApi};
pub use logging::LoggingContext;
pub use output::Sink;
pub use pipeline::{RunOutcome, TranscriptPipeline};
pub use report::{AppError, ErrorReport};
pub use transport::{ProxyMap, TransportConfig};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
