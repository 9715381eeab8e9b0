use crate::error::ApiError;
use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};
use swap_spider::{FilingSource, TickerMap};
use tera::{Context, Tera};
use tracing::{error, info, warn};

const INDEX: &str = "index.html";

/// Shared, read-only request state.
pub struct AppState {
    pub tickers: TickerMap,
    pub source: Box<dyn FilingSource>,
    pub max_filings: usize,
}

/// Templates are compiled into the binary.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(INDEX, include_str!("../templates/index.html"))?;
    Ok(tera)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(process)
        .service(swaps)
        .service(tickers);
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TickerQuery {
    /// ETF ticker symbol, case-insensitive.
    ticker: Option<String>,
}

/// Extraction form.
#[get("/")]
pub async fn home(state: web::Data<AppState>, tera: web::Data<Tera>) -> impl Responder {
    render_index(&tera, &state, None, "")
}

/// Form submission; answers with the CSV download, or the form again with the error.
#[post("/process")]
pub async fn process(
    state: web::Data<AppState>,
    tera: web::Data<Tera>,
    form: web::Form<TickerQuery>,
) -> impl Responder {
    let ticker = form.into_inner().ticker.unwrap_or_default();
    match download(&state, &ticker).await {
        Ok(response) => response,
        Err(err) => render_index(&tera, &state, Some(&err), &ticker),
    }
}

/// Swap positions of an ETF's latest N-PORT filing
///
/// ```csv
/// ticker,filing_date,period_of_report,index_name,index_identifier,counterparty_name,fixed_or_floating,floating_rt_index,floating_rt_spread,notional_amt,filing_url
/// GOOX,2024-11-27,2024-10-31,Alphabet Inc Class A,,Clear Street LLC,Floating,OBFR,1.25,8250000.0,https://www.sec.gov/Archives/...
/// ```
#[utoipa::path(
    get,
    path = "/swaps",
    params(TickerQuery),
    responses(
        (
            status = 200,
            description = "CSV attachment named `<ticker>_swap_data.csv`",
            content_type = "text/csv",
            body = String
        ),
        (status = 400, description = "No ticker given"),
        (status = 404, description = "Unknown ticker, or no N-PORT filing for its filer"),
        (status = 502, description = "EDGAR unreachable or the filing could not be parsed"),
        (status = 504, description = "EDGAR did not answer in time")
    )
)]
#[get("/swaps")]
pub async fn swaps(
    state: web::Data<AppState>,
    query: web::Query<TickerQuery>,
) -> Result<HttpResponse, ApiError> {
    let ticker = query.into_inner().ticker.unwrap_or_default();
    download(&state, &ticker).await
}

/// Supported ticker.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TickerRow {
    ticker: String,
    cik: String,
    series_id: Option<String>,
    company_name: Option<String>,
}

/// Tickers
///
/// ```json
/// [
///     {
///         "ticker": "TSLL",
///         "cik": "0001424958",
///         "series_id": "S000076344",
///         "company_name": "Direxion Daily TSLA Bull 2X Shares"
///     },
///     ...
/// ]
/// ```
#[utoipa::path(
    get,
    path = "/tickers",
    responses(
        (
            status = 200,
            description = "Every ticker in the reference table, with its filer",
            body = [TickerRow],
            content_type = "application/json",
            example = json!([
                {
                    "ticker": "TSLL",
                    "cik": "0001424958",
                    "series_id": "S000076344",
                    "company_name": "Direxion Daily TSLA Bull 2X Shares"
                }
            ])
        )
    )
)]
#[get("/tickers")]
pub async fn tickers(state: web::Data<AppState>) -> impl Responder {
    let data: Vec<TickerRow> = state
        .tickers
        .entries()
        .into_iter()
        .map(|entry| TickerRow {
            ticker: entry.ticker.clone(),
            cik: entry.cik.clone(),
            series_id: entry.series_id.clone(),
            company_name: entry.company_name.clone(),
        })
        .collect();

    HttpResponse::Ok().json(data)
}

async fn download(state: &AppState, ticker: &str) -> Result<HttpResponse, ApiError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::MissingTicker);
    }

    info!("processing request for ticker: {ticker}");
    let extract = swap_spider::extract(
        &state.tickers,
        &*state.source,
        ticker,
        state.max_filings,
    )
    .await
    .map_err(|err| {
        error!("error processing {ticker}: {err}");
        err
    })?;
    let body = extract.to_csv()?;

    info!("successfully processed {}", extract.ticker);
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", extract.file_name),
        ))
        .body(body))
}

fn render_index(
    tera: &Tera,
    state: &AppState,
    error: Option<&ApiError>,
    ticker: &str,
) -> HttpResponse {
    let symbols: Vec<&str> = state
        .tickers
        .entries()
        .into_iter()
        .map(|entry| entry.ticker.as_str())
        .collect();

    let mut context = Context::new();
    context.insert("tickers", &symbols);
    context.insert("ticker", &ticker.trim().to_uppercase());
    context.insert("error", &error.map(|err| err.to_string()));

    let status = match error {
        Some(err) => {
            warn!("responding with form error: {err}");
            err.status_code()
        }
        None => actix_web::http::StatusCode::OK,
    };

    match tera.render(INDEX, &context) {
        Ok(rendered) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(err) => {
            error!("failed to render {INDEX}, error({err})");
            HttpResponse::InternalServerError().body("failed to render page")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use swap_spider::{FilingRef, SpiderError, TickerEntry};

    const GOOX: &str = include_str!("../../swap-spider/tests/files/goox_nport.xml");

    enum Fixture {
        Document(&'static str),
        Unreachable { timeout: bool },
    }

    #[async_trait]
    impl FilingSource for Fixture {
        async fn nport_filings(&self, _cik: &str) -> swap_spider::Result<Vec<FilingRef>> {
            match self {
                Fixture::Document(_) => Ok(vec![FilingRef {
                    accession_number: "0001104659-24-110002".into(),
                    filing_date: NaiveDate::from_ymd_opt(2024, 11, 27).unwrap(),
                    url: "https://fixture.test/primary_doc.xml".into(),
                }]),
                Fixture::Unreachable { timeout } => Err(SpiderError::Network {
                    message: "operation timed out".into(),
                    timeout: *timeout,
                }),
            }
        }

        async fn fetch_document(&self, _filing: &FilingRef) -> swap_spider::Result<String> {
            match self {
                Fixture::Document(document) => Ok(document.to_string()),
                Fixture::Unreachable { .. } => unreachable!("no filings were listed"),
            }
        }
    }

    fn state(source: Fixture) -> web::Data<AppState> {
        let map = vec![TickerEntry {
            ticker: "GOOX".into(),
            cik: "0001771146".into(),
            series_id: Some("S000083421".into()),
            company_name: Some("T-REX 2X Long Alphabet Daily Target ETF".into()),
            start_date: None,
        }]
        .into_iter()
        .collect();

        web::Data::new(AppState {
            tickers: map,
            source: Box::new(source),
            max_filings: 12,
        })
    }

    macro_rules! app {
        ($source:expr) => {
            test::init_service(
                App::new()
                    .app_data(state($source))
                    .app_data(web::Data::new(templates().unwrap()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn goox_download() {
        let app = app!(Fixture::Document(GOOX));
        let req = test::TestRequest::get().uri("/swaps?ticker=goox").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(disposition, "attachment; filename=\"goox_swap_data.csv\"");
        assert!(resp
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/csv"));

        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ticker,filing_date,"));
        assert!(lines[1..].iter().all(|line| line.starts_with("GOOX,2024-11-27,")));
    }

    #[actix_web::test]
    async fn form_download() {
        let app = app!(Fixture::Document(GOOX));
        let req = test::TestRequest::post()
            .uri("/process")
            .set_form([("ticker", " Goox ")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await.iter().filter(|b| **b == b'\n').count(), 4);
    }

    #[actix_web::test]
    async fn unknown_ticker_renders_form() {
        let app = app!(Fixture::Document(GOOX));
        let req = test::TestRequest::post()
            .uri("/process")
            .set_form([("ticker", "SPY")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = test::read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("no CIK found for ticker SPY"));
        assert!(html.contains("value=\"SPY\""));
    }

    #[actix_web::test]
    async fn blank_ticker_renders_form() {
        for ticker in ["", "   "] {
            let app = app!(Fixture::Document(GOOX));
            let req = test::TestRequest::post()
                .uri("/process")
                .set_form([("ticker", ticker)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body = test::read_body(resp).await;
            let html = std::str::from_utf8(&body).unwrap();
            assert!(html.contains("please enter a ticker symbol"));
            assert!(html.contains("<form method=\"post\" action=\"/process\">"));
        }
    }

    #[actix_web::test]
    async fn missing_ticker() {
        let app = app!(Fixture::Document(GOOX));
        let req = test::TestRequest::get().uri("/swaps").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn upstream_failures() {
        for (timeout, status) in [(true, StatusCode::GATEWAY_TIMEOUT), (false, StatusCode::BAD_GATEWAY)] {
            let app = app!(Fixture::Unreachable { timeout });
            let req = test::TestRequest::get().uri("/swaps?ticker=GOOX").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status);
        }
    }

    #[actix_web::test]
    async fn unparseable_filing() {
        let app = app!(Fixture::Document("<html>maintenance</html>"));
        let req = test::TestRequest::get().uri("/swaps?ticker=GOOX").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn home_and_tickers() {
        let app = app!(Fixture::Document(GOOX));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("<option value=\"GOOX\">"));

        let req = test::TestRequest::get().uri("/tickers").to_request();
        let rows: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows[0]["ticker"], "GOOX");
        assert_eq!(rows[0]["cik"], "0001771146");
    }
}
