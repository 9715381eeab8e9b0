use clap::{Parser, ValueEnum};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about = "Serve ETF swap disclosures as CSV downloads", long_about = None)]
pub struct Cli {
    /// Address to bind; overrides BIND_ADDR.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port to listen on; overrides PORT.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Sets the level of tracing.
    #[arg(short, long, default_value = "INFO")]
    pub trace: TraceLevel,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

impl From<TraceLevel> for Level {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        }
    }
}
