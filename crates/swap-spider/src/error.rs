use thiserror::Error as ThisError;

/// Everything that can go wrong between a ticker arriving and a CSV leaving.
#[derive(ThisError, Debug)]
pub enum SpiderError {
    /// The ticker is not in the reference table.
    #[error("no CIK found for ticker {0}")]
    NotFound(String),

    /// EDGAR could not be reached, answered with an error status, or timed out.
    #[error("network error: {message}")]
    Network { message: String, timeout: bool },

    /// The filer has no N-PORT filing that fits the request.
    #[error("no N-PORT filing found for CIK {0}")]
    NoFilingFound(String),

    /// The filing document had an unexpected structure.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SpiderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SpiderError::Network { timeout: true, .. })
    }
}

impl From<reqwest::Error> for SpiderError {
    fn from(err: reqwest::Error) -> Self {
        SpiderError::Network {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for SpiderError {
    fn from(err: csv::Error) -> Self {
        SpiderError::Csv(err.to_string())
    }
}

impl From<quick_xml::Error> for SpiderError {
    fn from(err: quick_xml::Error) -> Self {
        SpiderError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for SpiderError {
    fn from(err: std::io::Error) -> Self {
        SpiderError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpiderError>;
