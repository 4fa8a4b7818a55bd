use axum::{response::IntoResponse, Json};
use hyper::StatusCode;
use serde::Serialize;

/// §7 propagation policy: the request path never returns 5xx for upstream
/// data issues. The only thing this enum models is a malformed request
/// body or an unknown pool, both `400`s; programmer errors (panics) are
/// left to axum's default `500` handling and never constructed here.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("pool {partition}/{name} is not configured")]
    PoolNotFound { partition: String, name: String },
    #[error("malformed request body: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(error = %self, "request rejected");
        let status = match self {
            ApiError::PoolNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
