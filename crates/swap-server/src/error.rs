use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use swap_spider::SpiderError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ApiError {
    #[error("please enter a ticker symbol")]
    MissingTicker,

    #[error(transparent)]
    Spider(#[from] SpiderError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingTicker => StatusCode::BAD_REQUEST,
            ApiError::Spider(err) => match err {
                SpiderError::NotFound(_) | SpiderError::NoFilingFound(_) => StatusCode::NOT_FOUND,
                SpiderError::Network { timeout: true, .. } => StatusCode::GATEWAY_TIMEOUT,
                SpiderError::Network { .. } | SpiderError::Parse(_) => StatusCode::BAD_GATEWAY,
                SpiderError::Csv(_) | SpiderError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
