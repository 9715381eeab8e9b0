use crate::common::pad_cik;
use crate::error::{Result, SpiderError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, trace, warn};

/// One row of the reference table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TickerEntry {
    pub ticker: String,
    /// 10 digit, zero padded.
    pub cik: String,
    pub series_id: Option<String>,
    pub company_name: Option<String>,
    /// Filings before this date are ignored.
    pub start_date: Option<NaiveDate>,
}

/// Immutable ticker → filer lookup, loaded once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct TickerMap(HashMap<String, TickerEntry>);

impl TickerMap {
    /// Read the reference CSV at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let time = std::time::Instant::now();

        trace!("reading file path: {}", path.display());
        let file = std::fs::File::open(path).map_err(|err| {
            error!("failed to open ticker file {}, error({err})", path.display());
            SpiderError::Config(format!("cannot open {}: {err}", path.display()))
        })?;
        let map = Self::from_reader(file)?;

        debug!(
            "{} tickers loaded from {}. {}",
            map.len(),
            path.display(),
            crate::time_elapsed(time)
        );
        Ok(map)
    }

    /// Read the reference table from any CSV source.
    ///
    /// Two header layouts are understood:
    /// - `ticker,cik,series_id[,company_name][,start_date]`
    /// - `CIK,Series,Name,Ticker[,Start Date]`
    ///
    /// Rows without a ticker, or with a non-numeric CIK, are skipped.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let has = |name: &str| headers.iter().any(|h| h.eq_ignore_ascii_case(name));
        if !(has("ticker") && has("cik")) {
            error!("unrecognised ticker file header: {headers:?}");
            return Err(SpiderError::Config(
                "ticker file needs `ticker` and `cik` columns".into(),
            ));
        }

        let mut map = HashMap::new();
        for (line, row) in reader.deserialize::<RawRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!("skipping ticker row {}, error({err})", line + 2);
                    continue;
                }
            };
            match row.into_entry() {
                Some(entry) => {
                    map.insert(entry.ticker.clone(), entry);
                }
                None => warn!("skipping ticker row {}: missing ticker or CIK", line + 2),
            }
        }

        Ok(TickerMap(map))
    }

    /// Case-insensitive lookup of `ticker`.
    pub fn resolve(&self, ticker: &str) -> Result<&TickerEntry> {
        let key = normalise(ticker);
        self.0.get(&key).ok_or_else(|| {
            debug!("ticker [{key}] not found in reference table");
            SpiderError::NotFound(key)
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entries, sorted by ticker.
    pub fn entries(&self) -> Vec<&TickerEntry> {
        let mut entries: Vec<&TickerEntry> = self.0.values().collect();
        entries.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        entries
    }
}

impl FromIterator<TickerEntry> for TickerMap {
    fn from_iter<I: IntoIterator<Item = TickerEntry>>(iter: I) -> Self {
        TickerMap(
            iter.into_iter()
                .map(|mut entry| {
                    entry.ticker = normalise(&entry.ticker);
                    (entry.ticker.clone(), entry)
                })
                .collect(),
        )
    }
}

pub(crate) fn normalise(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

// de
// ----------------------------------------------------------------------------

// Either header layout lands here; the aliases cover the spreadsheet export.
#[derive(Deserialize)]
struct RawRow {
    #[serde(alias = "Ticker", alias = "TICKER")]
    ticker: Option<String>,
    #[serde(alias = "CIK", alias = "Cik")]
    cik: Option<String>,
    #[serde(default, alias = "Series", alias = "SERIES")]
    series_id: Option<String>,
    #[serde(default, alias = "Name")]
    company_name: Option<String>,
    #[serde(default, alias = "Start Date")]
    start_date: Option<String>,
}

impl RawRow {
    fn into_entry(self) -> Option<TickerEntry> {
        let ticker = normalise(self.ticker.as_deref()?);
        if ticker.is_empty() {
            return None;
        }
        let cik = pad_cik(self.cik.as_deref()?)?;
        let start_date = self.start_date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|err| warn!("ignoring start date \"{raw}\" for [{ticker}], error({err})"))
                .ok()
        });

        Some(TickerEntry {
            ticker,
            cik,
            series_id: non_empty(self.series_id),
            company_name: non_empty(self.company_name),
            start_date,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ticker_is_not_found() {
        let map = TickerMap::default();
        assert!(matches!(map.resolve("  "), Err(SpiderError::NotFound(_))));
    }
}
