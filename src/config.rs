use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_CHARTS_DIR, DEFAULT_CONFIG_FILE, DEFAULT_DATA_FILE,
    DEFAULT_NORMALIZED_FILE, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT,
};
use crate::error::{Result, ScraperError};
use chrono::{Datelike, Local};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: String,
    /// Request timeout; omitted means the request may block indefinitely.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_file: PathBuf,
    pub normalized_file: PathBuf,
    pub charts_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Year attached to the scraped "MMM DD" dates. Defaults to the current year.
    pub year: Option<i32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: Some(30),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            normalized_file: PathBuf::from(DEFAULT_NORMALIZED_FILE),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl NormalizeConfig {
    pub fn effective_year(&self) -> i32 {
        self.year.unwrap_or_else(|| Local::now().year())
    }
}

impl Config {
    /// Load configuration from an explicit path, `$FORECAST_CONFIG`, or `config.toml`.
    ///
    /// Only the default `config.toml` may be absent; an explicitly requested file
    /// that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.source.url.trim().is_empty() {
            return Err(ScraperError::Config("source.url must not be empty".into()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.output.data_file, PathBuf::from("weather.csv"));
        assert_eq!(config.source.timeout(), Some(Duration::from_secs(30)));
        assert!(config.normalize.year.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [output]
            charts_dir = "out/charts"

            [normalize]
            year = 2019
            "#,
        )
        .unwrap();
        assert_eq!(config.output.charts_dir, PathBuf::from("out/charts"));
        assert_eq!(config.output.normalized_file, PathBuf::from("weather_clean.csv"));
        assert_eq!(config.normalize.effective_year(), 2019);
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = Config::from_toml("[source]\nurl = \"  \"\n");
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/forecast.toml")));
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }
}
