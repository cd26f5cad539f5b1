use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::LogLevel;
use crate::config::RunConfig;
use crate::fetcher::{self, CaptionEntry, TranscriptSource};
use crate::output::{self, Sink};
use crate::report::AppError;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Number of caption entries written
    pub entries: usize,

    /// Where they went
    pub sink: Sink,
}

/// Fetch, format and write one transcript
pub struct TranscriptPipeline<'a> {
    source: &'a dyn TranscriptSource,
    config: &'a RunConfig,
}

impl<'a> TranscriptPipeline<'a> {
    pub fn new(source: &'a dyn TranscriptSource, config: &'a RunConfig) -> Self {
        Self { source, config }
    }

    /// Fetch the caption entries, showing a spinner on an interactive stderr
    pub async fn fetch(&self) -> Result<Vec<CaptionEntry>, AppError> {
        let progress = self.spinner();

        let result = fetcher::fetch_transcript(
            self.source,
            &self.config.video_id,
            self.config.languages.as_deref(),
        )
        .await;

        progress.finish_and_clear();
        Ok(result?)
    }

    /// Fetch and render in the configured format
    pub async fn fetch_and_render(&self) -> Result<(usize, String), AppError> {
        let entries = self.fetch().await?;
        let content = output::render(&entries, self.config.format).map_err(AppError::Render)?;
        Ok((entries.len(), content))
    }

    /// Fetch, render and write to the configured sink
    pub async fn run(&self) -> Result<RunOutcome, AppError> {
        let (count, content) = self.fetch_and_render().await?;

        let sink = Sink::from_output(self.config.output_path.as_deref());
        sink.write(&content).map_err(|source| AppError::Output {
            target: sink.describe(),
            source,
        })?;

        tracing::info!("Wrote {} caption entries to {}", count, sink.describe());

        Ok(RunOutcome { entries: count, sink })
    }

    fn spinner(&self) -> ProgressBar {
        // log lines at INFO and below would tear through the spinner
        if matches!(self.config.log_level, LogLevel::Debug | LogLevel::Info) {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            progress.set_style(style);
        }
        progress.set_message(format!(
            "Fetching transcript for {} from {}...",
            self.config.video_id,
            self.source.source_name()
        ));
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    }
}
