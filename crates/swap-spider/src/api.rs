use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Spider API calls are made up the following components:
/// 1. HTTP
///     a) client
///     b) request: the filings index of one filer
///     c) deserializer
///     d) request: the primary document of one filing
///
/// 2. Transformation
///     a) parse the N-PORT document
///     b) serialize the swap records to CSV
///
/// Only the HTTP half sits behind this trait; [`EdgarClient`] is the real implementation,
/// tests substitute fixture documents.
///
/// [`EdgarClient`]: crate::sec::edgar::EdgarClient
#[async_trait]
pub trait FilingSource: Send + Sync {
    /// All N-PORT filings of a filer, most recent first.
    async fn nport_filings(&self, cik: &str) -> Result<Vec<FilingRef>>;

    /// The raw primary document of one filing.
    async fn fetch_document(&self, filing: &FilingRef) -> Result<String>;
}

/// Pointer to one filing in the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingRef {
    pub accession_number: String,
    pub filing_date: NaiveDate,
    pub url: String,
}
