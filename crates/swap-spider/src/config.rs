use crate::error::{Result, SpiderError};
use crate::http::var;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};

const DATA_URL: &str = "https://data.sec.gov";
const ARCHIVES_URL: &str = "https://www.sec.gov";

/// Runtime settings, read from the environment (and `.env`, via [`dotenv`]).
///
/// | variable           | default               |
/// |--------------------|-----------------------|
/// | `USER_AGENT`       | required for EDGAR    |
/// | `TICKERS_CSV`      | `./etf_tickers.csv`   |
/// | `SEC_DATA_URL`     | `https://data.sec.gov`|
/// | `SEC_ARCHIVES_URL` | `https://www.sec.gov` |
/// | `SEC_TIMEOUT_SECS` | `30`                  |
/// | `MAX_FILINGS`      | `12`                  |
/// | `BIND_ADDR`        | `0.0.0.0`             |
/// | `PORT`             | `5000`                |
///
/// [`dotenv`]: https://docs.rs/dotenv/latest/dotenv/
#[derive(Clone, Debug)]
pub struct Config {
    /// EDGAR refuses requests without a descriptive user agent (name and email); checked when
    /// the [`EdgarClient`] is built.
    ///
    /// [`EdgarClient`]: crate::sec::edgar::EdgarClient
    pub user_agent: String,
    pub tickers_csv: PathBuf,
    pub data_url: String,
    pub archives_url: String,
    pub timeout: Duration,
    /// Upper bound on documents fetched while looking for a series.
    pub max_filings: usize,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            user_agent: String::new(),
            tickers_csv: PathBuf::from("./etf_tickers.csv"),
            data_url: DATA_URL.to_string(),
            archives_url: ARCHIVES_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_filings: 12,
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read the settings from the environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        let config = Config {
            user_agent: var("USER_AGENT")
                .map(|agent| agent.trim().to_string())
                .unwrap_or(defaults.user_agent),
            tickers_csv: var("TICKERS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.tickers_csv),
            data_url: trim_url(var("SEC_DATA_URL").unwrap_or(defaults.data_url)),
            archives_url: trim_url(var("SEC_ARCHIVES_URL").unwrap_or(defaults.archives_url)),
            timeout: match parse_var::<u64>("SEC_TIMEOUT_SECS")? {
                Some(secs) => Duration::from_secs(secs),
                None => defaults.timeout,
            },
            max_filings: parse_var("MAX_FILINGS")?.unwrap_or(defaults.max_filings),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
        };
        debug!("configuration loaded: {config:?}");

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            error!("failed to parse {key}, value({raw})");
            SpiderError::Config(format!("{key} has an invalid value: {raw}"))
        }),
        Err(_) => Ok(None),
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
