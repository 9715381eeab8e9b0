use crate::api::FilingRef;
use crate::error::Result;
use crate::sec::nport::{ParsedFiling, SwapPosition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::trace;

/// One CSV row: a swap position, stamped with the filing it came from.
///
/// Field order is the column order of the exported file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub ticker: String,
    pub filing_date: NaiveDate,
    pub period_of_report: Option<NaiveDate>,
    pub index_name: Option<String>,
    pub index_identifier: Option<String>,
    pub counterparty_name: String,
    pub fixed_or_floating: Option<String>,
    pub floating_rt_index: Option<String>,
    pub floating_rt_spread: Option<f64>,
    pub notional_amt: f64,
    pub filing_url: String,
}

impl SwapRecord {
    pub const HEADERS: [&'static str; 11] = [
        "ticker",
        "filing_date",
        "period_of_report",
        "index_name",
        "index_identifier",
        "counterparty_name",
        "fixed_or_floating",
        "floating_rt_index",
        "floating_rt_spread",
        "notional_amt",
        "filing_url",
    ];

    /// Stamp every swap of `parsed` with the ticker and filing metadata.
    pub fn from_filing(ticker: &str, filing: &FilingRef, parsed: ParsedFiling) -> Vec<Self> {
        let ParsedFiling {
            period_of_report,
            designated_index,
            index_identifier,
            swaps,
            ..
        } = parsed;

        swaps
            .into_iter()
            .map(|swap: SwapPosition| SwapRecord {
                ticker: ticker.to_string(),
                filing_date: filing.filing_date,
                period_of_report,
                index_name: swap.reference_name.or_else(|| designated_index.clone()),
                index_identifier: index_identifier.clone(),
                counterparty_name: swap.counterparty_name,
                fixed_or_floating: swap.fixed_or_floating,
                floating_rt_index: swap.floating_rt_index,
                floating_rt_spread: swap.floating_rt_spread,
                notional_amt: swap.notional_amt,
                filing_url: filing.url.clone(),
            })
            .collect()
    }
}

/// `GOOX` → `goox_swap_data.csv`
pub fn file_name(ticker: &str) -> String {
    format!("{}_swap_data.csv", ticker.trim().to_lowercase())
}

/// Write a header row and one row per record. The header is written even when there are
/// no records.
pub fn write_csv<W: Write>(records: &[SwapRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(SwapRecord::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    trace!("{} swap records written as CSV", records.len());
    Ok(())
}

/// [`write_csv`] into a fresh buffer.
pub fn to_csv_bytes(records: &[SwapRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(buffer)
}
