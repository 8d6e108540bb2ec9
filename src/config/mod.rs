use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred language codes used when none are given on the command line
    pub languages: Vec<String>,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Output defaults
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent to YouTube
    pub user_agent: String,

    /// Accept-Language header, decides the language of track names
    pub accept_language: String,

    /// Request timeout in seconds (no timeout if not set)
    pub timeout_secs: Option<u64>,

    /// Proxy URL for all requests
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Include timestamps in text output
    pub timestamps: bool,

    /// Keep basic HTML formatting tags
    pub preserve_formatting: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("yt-transcript/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: "en-US".to_string(),
            timeout_secs: None,
            proxy: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, the local or user config file, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path(),
        };

        match config_path {
            Some(config_path) if config_path.exists() || path.is_some() => {
                tracing::debug!("Loading config from {}", config_path.display());
                Self::load_from(&config_path)
            }
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("yt-transcript").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == Some(0) {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        if let Some(proxy) = &self.http.proxy {
            Url::parse(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        }

        if self.languages.iter().any(|lang| lang.trim().is_empty()) {
            anyhow::bail!("languages must not contain empty codes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "languages: [de, en]\noutput:\n  format: srt\n");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.languages, vec!["de", "en"]);
        assert_eq!(config.output.format, OutputFormat::Srt);
        assert!(!config.output.timestamps);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "http:\n  proxy: \"not a url\"\n");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "http:\n  timeout_secs: 0\n");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "languages: {\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
