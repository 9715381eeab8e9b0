mod cli;
mod error;
mod rest_api;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use cli::Cli;
use rest_api::AppState;
use swap_spider::sec::edgar::EdgarClient;
use swap_spider::{Config, TickerMap};
use tracing::{info, trace, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

// install the tracing subscriber; actix's `log` records are forwarded to it
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(trace_level)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to set tracing subscriber: {err}"))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    preprocess(cli.trace.into())?;
    trace!("command line input recorded: {cli:?}");

    let mut config = Config::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    // static reference table, shared read-only by every worker
    let tickers = TickerMap::load(&config.tickers_csv)?;
    let state = web::Data::new(AppState {
        tickers,
        source: Box::new(EdgarClient::new(&config)?),
        max_filings: config.max_filings,
    });
    let tera = web::Data::new(rest_api::templates()?);

    // create API documentation
    #[derive(OpenApi)]
    #[openapi(paths(rest_api::swaps, rest_api::tickers))]
    struct ApiDoc;

    info!("ETF swap extractor listening on {}:{}", config.bind_addr, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(tera.clone())
            .configure(rest_api::configure)
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
