use crate::api::{FilingRef, FilingSource};
use crate::common::{de_cik, strip_cik};
use crate::config::Config;
use crate::error::{Result, SpiderError};
use crate::http::*;
use crate::sec::NPORT_FORM;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

/// [`FilingSource`] backed by the public EDGAR endpoints.
///
/// One GET request per call; no retries or caching. Every request is bounded by the
/// configured timeout.
#[derive(Clone, Debug)]
pub struct EdgarClient {
    client: HttpClient,
    data_url: String,
    archives_url: String,
}

impl EdgarClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(EdgarClient {
            client: build_client(config)?,
            data_url: config.data_url.clone(),
            archives_url: config.archives_url.clone(),
        })
    }

    /// `https://data.sec.gov/submissions/CIK0001424958.json`
    pub fn submissions_url(&self, cik: &str) -> String {
        format!("{}/submissions/CIK{cik}.json", self.data_url)
    }

    /// `https://www.sec.gov/Archives/edgar/data/1424958/000175272424224589/primary_doc.xml`
    pub fn document_url(&self, cik: &str, accession_number: &str) -> String {
        format!(
            "{}/Archives/edgar/data/{}/{}/primary_doc.xml",
            self.archives_url,
            strip_cik(cik),
            accession_number.replace('-', "")
        )
    }
}

fn build_client(config: &Config) -> Result<HttpClient> {
    if config.user_agent.is_empty() {
        error!("failed to read USER_AGENT");
        return Err(SpiderError::Config(
            "USER_AGENT must be set, e.g. \"Name name@example.com\"".into(),
        ));
    }

    reqwest::ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .build()
        .map_err(|err| {
            error!("failed to build reqwest client, error({err})");
            SpiderError::Config(format!("failed to build http client: {err}"))
        })
}

#[async_trait]
impl FilingSource for EdgarClient {
    async fn nport_filings(&self, cik: &str) -> Result<Vec<FilingRef>> {
        let url = self.submissions_url(cik);

        debug!("fetching EDGAR submissions for CIK {cik}");
        let response = self.client.get(&url).send().await.map_err(|err| {
            error!("failed to fetch data from {url}, error({err})");
            err
        })?;

        // unknown filers have no submissions file at all
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!("no submissions file for CIK {cik}");
            return Err(SpiderError::NoFilingFound(cik.to_string()));
        }

        let body = response
            .error_for_status()
            .map_err(|err| {
                error!("EDGAR refused {url}, error({err})");
                err
            })?
            .bytes()
            .await
            .map_err(|err| {
                error!("failed to read response body from {url}, error({err})");
                err
            })?;

        let submissions: Submissions = serde_json::from_slice(&body).map_err(|err| {
            error!("failed to parse JSON from {url}, error({err})");
            SpiderError::Parse(format!("submissions for CIK {cik}: {err}"))
        })?;

        let filings = submissions.nport_filings(self);
        trace!("{} {NPORT_FORM} filings found for CIK {cik}", filings.len());
        if filings.is_empty() {
            return Err(SpiderError::NoFilingFound(cik.to_string()));
        }

        Ok(filings)
    }

    async fn fetch_document(&self, filing: &FilingRef) -> Result<String> {
        let time = std::time::Instant::now();

        debug!("fetching filing document {}", filing.url);
        let text = self
            .client
            .get(&filing.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                error!("failed to fetch data from {}, error({err})", filing.url);
                err
            })?
            .text()
            .await
            .map_err(|err| {
                error!("failed to read document {}, error({err})", filing.url);
                err
            })?;

        debug!(
            "filing document {} fetched ({} bytes). {}",
            filing.accession_number,
            text.len(),
            crate::time_elapsed(time)
        );
        Ok(text)
    }
}

// de
// ----------------------------------------------------------------------------

// {
//     "cik": "1424958",
//     "name": "Direxion Shares ETF Trust",
//     ...
//     "filings": {
//         "recent": {
//             "accessionNumber": ["0001752724-24-224589", ...],
//             "filingDate": ["2024-09-27", ...],
//             "form": ["NPORT-P", ...],
//             ...
//         },
//         "files": [ ... ]
//     }
// }
#[derive(Debug, Deserialize)]
pub(crate) struct Submissions {
    #[serde(deserialize_with = "de_cik")]
    cik: String,
    filings: Filings,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: Recent,
}

// column-wise arrays; index `i` of each describes the same filing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Recent {
    accession_number: Vec<String>,
    filing_date: Vec<String>,
    form: Vec<String>,
}

impl Submissions {
    fn nport_filings(&self, edgar: &EdgarClient) -> Vec<FilingRef> {
        let recent = &self.filings.recent;
        let mut filings: Vec<FilingRef> = recent
            .form
            .iter()
            .zip(recent.accession_number.iter())
            .zip(recent.filing_date.iter())
            .filter(|((form, _), _)| form.as_str() == NPORT_FORM)
            .filter_map(|((_, accession), date)| {
                match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                    Ok(filing_date) => Some(FilingRef {
                        accession_number: accession.clone(),
                        filing_date,
                        url: edgar.document_url(&self.cik, accession),
                    }),
                    Err(err) => {
                        warn!("skipping filing {accession}, bad filing date \"{date}\", error({err})");
                        None
                    }
                }
            })
            .collect();

        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        filings
    }
}
