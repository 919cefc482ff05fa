use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Connection timed out: {0}")]
    Timeout(String),

    #[error("Invalid URL provided: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request returned status {0}")]
    Status(u16),

    #[error("Forecast page is missing element '{selector}' at index {index}")]
    MissingElement { selector: String, index: usize },

    #[error("Invalid {field} value '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown month abbreviation: '{0}'")]
    UnknownMonth(String),

    #[error("Not a calendar date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("No forecast rows available")]
    NoData,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

impl ScraperError {
    /// Failures the fetch stage logs and gives up on instead of aborting the process.
    pub fn is_recoverable_fetch_error(&self) -> bool {
        matches!(self, ScraperError::Timeout(_) | ScraperError::InvalidUrl(_))
    }

    /// Sorts a transport error into the timeout / invalid URL categories when it
    /// belongs to one of them.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScraperError::Timeout(err.to_string())
        } else if err.is_builder() {
            ScraperError::InvalidUrl(err.to_string())
        } else {
            ScraperError::Http(err)
        }
    }

    pub(crate) fn invalid_field(
        field: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        ScraperError::InvalidField {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
