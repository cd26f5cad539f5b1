use clap::Parser;
use console::style;
use std::process::ExitCode;

use yt_transcript::report::{self, AppError, FAILURE_EXIT_CODE};
use yt_transcript::{
    Cli, Config, LoggingContext, RunConfig, RunOutcome, Sink, TranscriptPipeline, TransportConfig,
    YoutubeTranscriptApi,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // --help and --version come through here too
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(FAILURE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Command-line level until the config file is read, so loading it can log
    let mut logging = LoggingContext::init(cli.requested_log_level().unwrap_or_default());

    let file_config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => return fail(AppError::Config(error)),
    };

    let config = match RunConfig::resolve(cli, file_config) {
        Ok(config) => config,
        Err(error) => return fail(AppError::Config(error)),
    };

    if config.log_level != logging.level() {
        // the old guard must go before the new default is set
        drop(logging);
        logging = LoggingContext::init(config.log_level);
    }
    tracing::debug!("Run configuration: {:?}", config);

    let code = match run(&config).await {
        Ok(outcome) => {
            if let Sink::File(path) = &outcome.sink {
                println!("Transcript saved to {}", style(path.display()).green());
            }
            ExitCode::SUCCESS
        }
        Err(error) => fail(error),
    };

    drop(logging);
    code
}

async fn run(config: &RunConfig) -> Result<RunOutcome, AppError> {
    let transport = TransportConfig::from_settings(config.timeout_seconds, config.proxy_uri.as_deref());
    let source = YoutubeTranscriptApi::new(transport.as_ref()).map_err(AppError::Transport)?;

    TranscriptPipeline::new(&source, config).run().await
}

fn fail(error: AppError) -> ExitCode {
    let report = report::describe(&error);
    report.emit();
    ExitCode::from(report.exit_code)
}
