use crate::api::{FilingRef, FilingSource};
use crate::error::{Result, SpiderError};
use crate::export::{self, SwapRecord};
use crate::sec::nport::{self, ParsedFiling};
use crate::tickers::{TickerEntry, TickerMap};
use tracing::{debug, info, trace, warn};

/// Outcome of one extraction: the records and the file name they should be served under.
#[derive(Clone, Debug)]
pub struct SwapExtract {
    pub ticker: String,
    pub cik: String,
    pub file_name: String,
    pub filing: FilingRef,
    pub records: Vec<SwapRecord>,
    pub skipped: usize,
}

impl SwapExtract {
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        export::to_csv_bytes(&self.records)
    }
}

/// Resolve `ticker`, find its most recent N-PORT filing and extract the swap positions.
///
/// Without a series id on the ticker entry, the most recent filing of the filer is used.
/// With one, filings are read most recent first until one for that series turns up, giving
/// up after `max_filings` documents. Filings that fail to download or parse are skipped
/// along the way; if nothing matches, the first such failure is returned.
pub async fn extract(
    tickers: &TickerMap,
    source: &dyn FilingSource,
    ticker: &str,
    max_filings: usize,
) -> Result<SwapExtract> {
    let time = std::time::Instant::now();

    let entry = tickers.resolve(ticker)?;
    info!("extracting swaps for [{}], CIK {}", entry.ticker, entry.cik);

    let filings: Vec<FilingRef> = source
        .nport_filings(&entry.cik)
        .await?
        .into_iter()
        .filter(|filing| match entry.start_date {
            Some(start) => filing.filing_date >= start,
            None => true,
        })
        .collect();
    trace!("{} candidate filings for [{}]", filings.len(), entry.ticker);

    let (filing, parsed) = find_filing(entry, source, filings, max_filings).await?;
    let skipped = parsed.skipped;
    let records = SwapRecord::from_filing(&entry.ticker, &filing, parsed);

    info!(
        "{} swap records extracted for [{}] from filing {} ({} skipped). {}",
        records.len(),
        entry.ticker,
        filing.accession_number,
        skipped,
        crate::time_elapsed(time)
    );

    Ok(SwapExtract {
        ticker: entry.ticker.clone(),
        cik: entry.cik.clone(),
        file_name: export::file_name(&entry.ticker),
        filing,
        records,
        skipped,
    })
}

async fn find_filing(
    entry: &TickerEntry,
    source: &dyn FilingSource,
    filings: Vec<FilingRef>,
    max_filings: usize,
) -> Result<(FilingRef, ParsedFiling)> {
    // with a series to look for, one unreadable filing of a sibling series must not end the walk
    let mut failure: Option<SpiderError> = None;

    for filing in filings.into_iter().take(max_filings.max(1)) {
        let fetched = match source.fetch_document(&filing).await {
            Ok(document) => nport::parse(&document),
            Err(err) => Err(err),
        };
        let parsed = match fetched {
            Ok(parsed) => parsed,
            Err(err) if entry.series_id.is_some() => {
                warn!(
                    "failed to read filing {}, error({err}); trying the next one",
                    filing.accession_number
                );
                failure.get_or_insert(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        match (&entry.series_id, &parsed.series_id) {
            (Some(wanted), Some(found)) if !wanted.eq_ignore_ascii_case(found) => {
                debug!(
                    "filing {} belongs to series {found}, not {wanted}; trying the next one",
                    filing.accession_number
                );
            }
            (Some(wanted), None) => {
                warn!(
                    "filing {} has no series id, cannot match {wanted}; trying the next one",
                    filing.accession_number
                );
            }
            _ => return Ok((filing, parsed)),
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }
    Err(SpiderError::NoFilingFound(match &entry.series_id {
        Some(series) => format!("{} (series {series})", entry.cik),
        None => entry.cik.clone(),
    }))
}
