use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the swap positions of an ETF's latest N-PORT filing to `<ticker>_swap_data.csv`.
    Extract {
        /// ETF ticker symbol, case-insensitive.
        ticker: String,

        /// Directory to write the CSV to.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// List the tickers of the reference table.
    Tickers,
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
