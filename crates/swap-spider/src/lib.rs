pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod sec;
pub mod tickers;

pub(crate) mod common;

pub use api::{FilingRef, FilingSource};
pub use config::Config;
pub use error::{Result, SpiderError};
pub use export::SwapRecord;
pub use extract::{extract, SwapExtract};
pub use tickers::{TickerEntry, TickerMap};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use dotenv::var;
    pub(crate) use reqwest::Client as HttpClient;
}

/// Format the time elapsed since `time` for trace output.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:.3}s", time.elapsed().as_secs_f64())
}
