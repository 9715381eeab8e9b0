/// Filings index and document retrieval from [EDGAR].
///
/// [EDGAR]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod edgar;

/// Swap positions from the XML of Form N-PORT.
pub mod nport;

/// The form type of monthly portfolio reports, as it appears in the filings index.
pub const NPORT_FORM: &str = "NPORT-P";
