use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_valid::Garde;
use http::StatusCode;
use movlib_dal::ListingParams;
use movlib_dal::genre::{Genre, GenreRepository};
use movlib_dal::guard::DeleteOutcome;
use movlib_dal::movie::{CreateMovie, Movie, MovieRepository};
use movlib_dal::movie_instance::MovieInstanceShort;
use movlib_dal::producer::{ProducerRepository, ProducerShort};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::rest_api::{DeleteBlocked, Paging};
use crate::state::AppState;

crate::repository_from_request!(MovieRepository);

/// Detail shape: the movie with references resolved plus its copies.
#[derive(Debug, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub instances: Vec<MovieInstanceShort>,
}

/// Data needed to render a movie create/update form: every producer to pick
/// from and every genre, annotated with whether it is part of the submitted
/// selection. The annotation is recomputed per request, the canonical genre
/// list is never touched.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub producers: Vec<ProducerShort>,
    pub genres: Vec<GenreChoice>,
}

#[derive(Debug, Serialize)]
pub struct GenreChoice {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

fn mark_selected(genres: Vec<Genre>, selected: &HashSet<i64>) -> Vec<GenreChoice> {
    genres
        .into_iter()
        .map(|genre| GenreChoice {
            selected: selected.contains(&genre.id),
            id: genre.id,
            name: genre.name,
        })
        .collect()
}

fn parse_selected(raw: Option<&str>) -> ApiResult<HashSet<i64>> {
    let mut ids = HashSet::new();
    if let Some(raw) = raw {
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part
                .parse()
                .map_err(|_| ApiError::InvalidQuery(format!("Invalid genre id: {part}")))?;
            ids.insert(id);
        }
    }
    Ok(ids)
}

#[derive(Debug, Deserialize)]
pub struct FormOptionsQuery {
    selected: Option<String>,
}

pub async fn list(
    repository: MovieRepository,
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let listing_params = paging.into_listing_params(state.config().default_page_size)?;
    let records = repository.list(listing_params).await?;
    Ok((StatusCode::OK, Json(records)))
}

pub async fn count(repository: MovieRepository) -> ApiResult<impl IntoResponse> {
    let count = repository.count().await?;
    Ok((StatusCode::OK, Json(count)))
}

pub async fn detail(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let (movie, instances) = futures::try_join!(repository.get(id), repository.instances(id))?;
    Ok((StatusCode::OK, Json(MovieDetail { movie, instances })))
}

pub async fn form_options(
    producer_repository: ProducerRepository,
    genre_repository: GenreRepository,
    Query(query): Query<FormOptionsQuery>,
) -> ApiResult<impl IntoResponse> {
    let selected = parse_selected(query.selected.as_deref())?;
    let (producers, genres) = futures::try_join!(
        producer_repository.list(ListingParams::default()),
        genre_repository.list(ListingParams::default()),
    )?;
    Ok((
        StatusCode::OK,
        Json(FormOptions {
            producers,
            genres: mark_selected(genres, &selected),
        }),
    ))
}

pub async fn create(
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<CreateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<CreateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(Path(id): Path<i64>, repository: MovieRepository) -> ApiResult<Response> {
    match repository.delete(id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteOutcome::Blocked(blocking) => Ok((
            StatusCode::CONFLICT,
            Json(DeleteBlocked::new("movie", blocking)),
        )
            .into_response()),
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/count", get(count))
        .route("/form-options", get(form_options))
        .route("/{id}", get(detail).put(update).delete(delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> Vec<Genre> {
        vec![
            Genre {
                id: 1,
                name: "Fantasy".into(),
            },
            Genre {
                id: 2,
                name: "Science Fiction".into(),
            },
            Genre {
                id: 3,
                name: "French Poetry".into(),
            },
        ]
    }

    #[test]
    fn mark_selected_flags_submitted_genres() {
        let selected = HashSet::from([2, 3]);
        let choices = mark_selected(genres(), &selected);
        let flags: Vec<bool> = choices.iter().map(|c| c.selected).collect();
        assert_eq!(flags, vec![false, true, true]);
        // names and order of the canonical list are preserved
        assert_eq!(choices[0].name, "Fantasy");
    }

    #[test]
    fn mark_selected_with_empty_selection() {
        let choices = mark_selected(genres(), &HashSet::new());
        assert!(choices.iter().all(|c| !c.selected));
    }

    #[test]
    fn parse_selected_accepts_comma_separated_ids() {
        let ids = parse_selected(Some("1, 2,3")).unwrap();
        assert_eq!(ids, HashSet::from([1, 2, 3]));
        assert!(parse_selected(None).unwrap().is_empty());
    }

    #[test]
    fn parse_selected_rejects_garbage() {
        assert!(matches!(
            parse_selected(Some("1,x")),
            Err(ApiError::InvalidQuery(_))
        ));
    }
}
