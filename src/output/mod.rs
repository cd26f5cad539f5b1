use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::fetcher::CaptionEntry;

pub mod formatters;

pub use formatters::*;

/// Render caption entries in the requested format
pub fn render(entries: &[CaptionEntry], format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(entries),
        OutputFormat::Json => format_as_json(entries)?,
        OutputFormat::Srt => format_as_srt(entries),
    };

    Ok(content)
}

/// Where the rendered transcript goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl Sink {
    pub fn from_output(output: Option<&Path>) -> Self {
        match output {
            Some(path) => Sink::File(path.to_path_buf()),
            None => Sink::Stdout,
        }
    }

    /// Human-readable name of the destination
    pub fn describe(&self) -> String {
        match self {
            Sink::Stdout => "<stdout>".to_string(),
            Sink::File(path) => path.display().to_string(),
        }
    }

    /// Write the content; files get it verbatim, stdout gets a trailing newline
    pub fn write(&self, content: &str) -> std::io::Result<()> {
        match self {
            Sink::File(path) => save_to_file(content, path),
            Sink::Stdout => print_to_console(content, &mut std::io::stdout().lock()),
        }
    }
}

/// Print rendered content followed by a newline
pub fn print_to_console<W: Write>(content: &str, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", content)?;
    out.flush()
}

/// Save rendered content to a file
pub fn save_to_file(content: &str, path: &Path) -> std::io::Result<()> {
    fs_err::write(path, content)
}
