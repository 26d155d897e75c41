use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_valid::Garde;
use http::StatusCode;
use movlib_dal::guard::DeleteOutcome;
use movlib_dal::movie::{MovieRepository, MovieShort};
use movlib_dal::producer::{CreateProducer, Producer, ProducerRepository};
use serde::Serialize;

use crate::error::ApiResult;
use crate::rest_api::{DeleteBlocked, Paging};
use crate::state::AppState;

crate::repository_from_request!(ProducerRepository);

/// Detail shape: the record plus its computed display fields and the movies
/// referencing it.
#[derive(Debug, Serialize)]
pub struct ProducerDetail {
    #[serde(flatten)]
    pub producer: Producer,
    pub name: String,
    pub lifespan: String,
    pub movies: Vec<MovieShort>,
}

pub async fn list(
    repository: ProducerRepository,
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let listing_params = paging.into_listing_params(state.config().default_page_size)?;
    let records = repository.list(listing_params).await?;
    Ok((StatusCode::OK, Json(records)))
}

pub async fn count(repository: ProducerRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

pub async fn detail(
    Path(id): Path<i64>,
    repository: ProducerRepository,
    movie_repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let (producer, movies) = futures::try_join!(
        repository.get(id),
        movie_repository.list_by_producer(id)
    )?;
    let name = producer.name();
    let lifespan = producer.lifespan();
    Ok((
        StatusCode::OK,
        Json(ProducerDetail {
            producer,
            name,
            lifespan,
            movies,
        }),
    ))
}

pub async fn create(
    repository: ProducerRepository,
    Garde(Json(payload)): Garde<Json<CreateProducer>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: ProducerRepository,
    Garde(Json(payload)): Garde<Json<CreateProducer>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: ProducerRepository,
) -> ApiResult<Response> {
    match repository.delete(id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteOutcome::Blocked(blocking) => Ok((
            StatusCode::CONFLICT,
            Json(DeleteBlocked::new("producer", blocking)),
        )
            .into_response()),
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/count", get(count))
        .route("/{id}", get(detail).put(update).delete(delete))
}
