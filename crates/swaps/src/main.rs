mod cli;

// remote imports
use clap::Parser;
use cli::{Cli, Commands, TraceLevel};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use swap_spider::sec::edgar::EdgarClient;
use swap_spider::{export, Config, TickerMap};
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preprocess the trace level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

fn spinner(tui: bool, msg: String) -> anyhow::Result<ProgressBar> {
    if !tui {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner().with_style(
        ProgressStyle::default_spinner().template("{msg} {spinner:.magenta} [{elapsed_precise:.magenta}]")?,
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    let config = Config::from_env()?;
    let tickers = TickerMap::load(&config.tickers_csv)?;

    match cli.command {
        // `swaps extract <TICKER> [--out DIR]`
        Commands::Extract { ticker, out } => {
            let edgar = EdgarClient::new(&config)?;

            if tui {
                println!(
                    "{bar}\n{name:^40}\n{bar}",
                    bar = "=".repeat(40),
                    name = format!("{} swaps", ticker.trim().to_uppercase())
                );
            }
            let pb = spinner(tui, "fetching latest N-PORT filing ...".to_string())?;
            let result =
                swap_spider::extract(&tickers, &edgar, &ticker, config.max_filings).await;
            pb.finish_and_clear();
            let extract = result?;

            std::fs::create_dir_all(&out)?;
            let path = out.join(&extract.file_name);
            let file = std::fs::File::create(&path)?;
            export::write_csv(&extract.records, file)?;
            info!(
                "{} swap records from filing {} written to {}",
                extract.records.len(),
                extract.filing.accession_number,
                path.display()
            );

            if tui {
                println!(
                    "filing {} ({}) ... {} swaps, {} skipped",
                    extract.filing.accession_number,
                    extract.filing.filing_date,
                    extract.records.len(),
                    extract.skipped
                );
                println!("written to {}", path.display());
            }
        }

        // `swaps tickers`
        Commands::Tickers => {
            debug!("listing {} tickers", tickers.len());
            for entry in tickers.entries() {
                println!(
                    "{:<8} {} {:<12} {}",
                    entry.ticker,
                    entry.cik,
                    entry.series_id.as_deref().unwrap_or("-"),
                    entry.company_name.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}
