use axum::{Json, response::IntoResponse, routing::get};
use http::StatusCode;
use movlib_dal::summary::SummaryRepository;

use crate::error::ApiResult;
use crate::state::AppState;

crate::repository_from_request!(SummaryRepository);

pub async fn summary(repository: SummaryRepository) -> ApiResult<impl IntoResponse> {
    let summary = repository.compute().await?;
    Ok((StatusCode::OK, Json(summary)))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/", get(summary))
}
