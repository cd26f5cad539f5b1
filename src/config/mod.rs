use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, LogLevel, OutputFormat};
use crate::transport::MAX_TIMEOUT_SECONDS;
use crate::utils;

const LOCAL_CONFIG_FILE: &str = "yt-transcript.yaml";
const CONFIG_DIR_NAME: &str = "yt-transcript";

/// Defaults read from the YAML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript fetch settings
    pub fetch: FetchConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Preferred language codes, highest priority first
    pub languages: Option<Vec<String>>,

    /// HTTP(S) proxy URI
    pub proxy: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: Option<LogLevel>,
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration from file or fall back to defaults.
    ///
    /// An explicit path must exist; otherwise `./yt-transcript.yaml` and then
    /// `<config dir>/yt-transcript/config.yaml` are tried.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn discover() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.fetch.timeout_seconds {
            if !timeout.is_finite() || timeout <= 0.0 {
                anyhow::bail!("fetch.timeout_seconds must be positive, got {}", timeout);
            }
            if timeout > MAX_TIMEOUT_SECONDS {
                anyhow::bail!(
                    "fetch.timeout_seconds must be at most {} seconds, got {}",
                    MAX_TIMEOUT_SECONDS,
                    timeout
                );
            }
        }

        if let Some(proxy) = &self.fetch.proxy {
            utils::validate_proxy_uri(proxy)?;
        }

        if let Some(languages) = &self.fetch.languages {
            if languages.iter().any(|code| code.trim().is_empty()) {
                anyhow::bail!("fetch.languages must not contain empty language codes");
            }
        }

        Ok(())
    }
}

/// Everything one invocation needs, resolved from the command line and config file
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub video_id: String,
    pub languages: Option<Vec<String>>,
    pub output_path: Option<PathBuf>,
    pub proxy_uri: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub log_level: LogLevel,
    pub format: OutputFormat,
}

impl RunConfig {
    /// Command-line values win over the config file, which wins over built-in defaults
    pub fn resolve(cli: Cli, config: Config) -> Result<Self> {
        let log_level = cli
            .requested_log_level()
            .or(config.app.log_level)
            .unwrap_or_default();

        let proxy_uri = cli.proxy.or(config.fetch.proxy);
        if let Some(proxy) = &proxy_uri {
            utils::validate_proxy_uri(proxy)?;
        }

        let languages = cli
            .languages
            .map(|languages| languages.into_vec())
            .or(config.fetch.languages)
            .map(|codes| codes.into_iter().map(|code| code.trim().to_string()).collect::<Vec<_>>())
            .filter(|codes| !codes.is_empty());

        Ok(Self {
            video_id: utils::extract_video_id(&cli.video_id),
            languages,
            output_path: cli.output,
            proxy_uri,
            timeout_seconds: cli.timeout.or(config.fetch.timeout_seconds),
            log_level,
            format: cli.format.or(config.app.format).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("yt-transcript").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml(
            r#"
fetch:
  languages: [de, en]
  proxy: http://proxy.local:3128
  timeout_seconds: 7.5
app:
  log_level: INFO
  format: srt
"#,
        )
        .unwrap();

        assert_eq!(config.fetch.languages, Some(vec!["de".to_string(), "en".to_string()]));
        assert_eq!(config.fetch.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.fetch.timeout_seconds, Some(7.5));
        assert_eq!(config.app.log_level, Some(LogLevel::Info));
        assert_eq!(config.app.format, Some(OutputFormat::Srt));
    }

    #[test]
    fn test_partial_and_empty_config() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        let config = Config::from_yaml("fetch:\n  timeout_seconds: 3\n").unwrap();
        assert_eq!(config.fetch.timeout_seconds, Some(3.0));
        assert_eq!(config.app, AppConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(Config::from_yaml("fetch:\n  timeout_seconds: 0\n").is_err());
        assert!(Config::from_yaml("fetch:\n  proxy: ftp://nope\n").is_err());
        assert!(Config::from_yaml("fetch:\n  languages: ['en', ' ']\n").is_err());
        assert!(Config::from_yaml("app:\n  log_level: LOUD\n").is_err());
    }

    #[test]
    fn test_huge_timeout_is_rejected() {
        let error = Config::from_yaml("fetch:\n  timeout_seconds: 1e20\n").unwrap_err();
        assert!(error.to_string().contains("at most"));
        assert!(Config::from_yaml("fetch:\n  timeout_seconds: 86400\n").is_ok());
    }

    #[test]
    fn test_resolve_uses_config_log_level_and_cli_fields() {
        let mut config = Config::default();
        config.app.log_level = Some(LogLevel::Error);

        let run = RunConfig::resolve(
            cli(&["abc123", "--proxy", "http://localhost:8080", "-l", "en", "-o", "out.txt"]),
            config,
        )
        .unwrap();

        assert_eq!(run.log_level, LogLevel::Error);
        assert_eq!(run.proxy_uri.as_deref(), Some("http://localhost:8080"));
        assert_eq!(run.output_path, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "fetch:\n  languages: [fr]\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.fetch.languages, Some(vec!["fr".to_string()]));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load(Some(dir.path().join("nope.yaml").as_path())).unwrap_err();
        assert!(error.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_resolve_defaults() {
        let run = RunConfig::resolve(cli(&["abc123"]), Config::default()).unwrap();
        assert_eq!(
            run,
            RunConfig {
                video_id: "abc123".to_string(),
                languages: None,
                output_path: None,
                proxy_uri: None,
                timeout_seconds: None,
                log_level: LogLevel::Warning,
                format: OutputFormat::Text,
            }
        );
    }

    #[test]
    fn test_resolve_cli_overrides_config() {
        let mut config = Config::default();
        config.fetch.languages = Some(vec!["de".to_string()]);
        config.fetch.proxy = Some("http://config-proxy:1".to_string());
        config.fetch.timeout_seconds = Some(30.0);
        config.app.log_level = Some(LogLevel::Error);

        let run = RunConfig::resolve(
            cli(&["abc123", "-l", "es,fr", "--timeout", "5", "-v"]),
            config,
        )
        .unwrap();

        assert_eq!(run.languages, Some(vec!["es".to_string(), "fr".to_string()]));
        assert_eq!(run.timeout_seconds, Some(5.0));
        assert_eq!(run.proxy_uri.as_deref(), Some("http://config-proxy:1"));
        assert_eq!(run.log_level, LogLevel::Info);
    }

    #[test]
    fn test_resolve_normalises_video_url() {
        let run = RunConfig::resolve(cli(&["https://youtu.be/dQw4w9WgXcQ"]), Config::default()).unwrap();
        assert_eq!(run.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_resolve_rejects_bad_proxy() {
        assert!(RunConfig::resolve(cli(&["abc", "--proxy", "localhost"]), Config::default()).is_err());
    }
}
