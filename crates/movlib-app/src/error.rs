use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use movlib_dal::Error as StoreError;
use serde_json::json;

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => match e {
                StoreError::RecordNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                StoreError::InvalidReference(_) | StoreError::InvalidOrderByField(_) => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        if status.is_server_error() {
            tracing::error!("Store failure: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
