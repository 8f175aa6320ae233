use std::error::Error;

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Request body is not a valid article")]
    InvalidArticle(#[from] JsonRejection),

    #[error("Batch of {size} articles exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        error!("{}: {:?}", self, self.source());

        let status = match self {
            RestError::InvalidArticle(ref rejection) => rejection.status(),
            RestError::BatchTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let payload = Json(json!({"message": self.to_string()}));

        (status, payload).into_response()
    }
}
