use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transport::MAX_TIMEOUT_SECONDS;

#[derive(Parser, Debug)]
#[command(
    name = "yt-transcript",
    about = "Fetch the transcript of a YouTube video",
    version,
    long_about = "Fetches the caption transcript of a YouTube video and prints it as timestamped lines. Supports language preferences, HTTP(S) proxies and request timeouts."
)]
pub struct Cli {
    /// YouTube video ID (or a YouTube URL) to fetch the transcript for
    #[arg(value_name = "VIDEO_ID")]
    pub video_id: String,

    /// Comma-separated list of language codes in priority order (e.g. en,fa,de)
    #[arg(short, long, value_name = "LANGS", value_parser = parse_languages)]
    pub languages: Option<Languages>,

    /// Output file path (prints to the terminal if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// HTTP(S) proxy URI used for both http and https requests
    #[arg(long, value_name = "URI", env = "YT_TRANSCRIPT_PROXY")]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout, env = "YT_TRANSCRIPT_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Logging level
    #[arg(long, value_enum, ignore_case = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (INFO)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging (DEBUG, overrides --verbose and --log-level)
    #[arg(short, long)]
    pub debug: bool,

    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "FILE", env = "YT_TRANSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Log level requested on the command line, if any.
    ///
    /// `-d` wins over `-v`, which wins over `--log-level`.
    pub fn requested_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            Some(LogLevel::Debug)
        } else if self.verbose {
            Some(LogLevel::Info)
        } else {
            self.log_level
        }
    }
}

/// Ordered list of language codes parsed from `--languages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages(pub Vec<String>);

impl Languages {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Split a comma-separated language list, trimming each code and dropping empties.
pub fn parse_languages(raw: &str) -> Result<Languages, String> {
    let codes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();

    if codes.is_empty() {
        return Err("expected at least one language code".to_string());
    }

    Ok(Languages(codes))
}

/// Accept integer or fractional seconds, strictly positive and at most one day.
pub fn parse_timeout(raw: &str) -> Result<f64, String> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {}", raw));
    }

    if seconds > MAX_TIMEOUT_SECONDS {
        return Err(format!("timeout must be at most {} seconds, got {}", MAX_TIMEOUT_SECONDS, raw));
    }

    Ok(seconds)
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[default]
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            // tracing has no level above ERROR
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Timestamped lines: `[12.34] text`
    #[default]
    Text,
    /// JSON array of caption entries
    Json,
    /// SRT subtitle format
    Srt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
        }
    }
}
