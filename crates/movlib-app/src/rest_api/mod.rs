pub mod genre;
pub mod movie;
pub mod movie_instance;
pub mod producer;
pub mod summary;

use crate::error::{ApiError, ApiResult};
use garde::Validate;
use movlib_dal::{ListingParams, Order};
use serde::Serialize;

#[derive(Debug, Clone, Validate, serde::Deserialize)]
#[garde(allow_unvalidated)]
pub struct Paging {
    #[garde(range(min = 1))]
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    page_size: Option<u32>,
    #[garde(length(max = 255))]
    sort: Option<String>,
}

impl Paging {
    pub fn into_listing_params(self, default_page_size: u32) -> ApiResult<ListingParams> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(default_page_size);
        let offset = (page - 1) * page_size;
        let limit = page_size;
        let order = self
            .sort
            .map(|orderings| {
                orderings
                    .split(',')
                    .map(|name| {
                        let (field_name, descending) = match name.trim() {
                            "" => {
                                return Err(ApiError::InvalidQuery(
                                    "Empty ordering name".to_string(),
                                ))
                            }
                            name if name.len() > 100 => {
                                return Err(ApiError::InvalidQuery(
                                    "Ordering name too long".to_string(),
                                ))
                            }
                            name if name.starts_with('+') => (&name[1..], false),
                            name if name.starts_with('-') => (&name[1..], true),
                            name => (name, false),
                        };

                        let order = if descending {
                            Order::Desc(field_name.to_string())
                        } else {
                            Order::Asc(field_name.to_string())
                        };

                        Ok(order)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ListingParams {
            offset: offset.into(),
            limit: limit.into(),
            order,
        })
    }
}

/// 409 body for a delete refused because of referencing records.
#[derive(Debug, Serialize)]
pub struct DeleteBlocked<B: Serialize> {
    pub error: String,
    pub blocking: Vec<B>,
}

impl<B: Serialize> DeleteBlocked<B> {
    pub fn new(what: &str, blocking: Vec<B>) -> Self {
        DeleteBlocked {
            error: format!("{what} is referenced by existing records and cannot be deleted"),
            blocking,
        }
    }
}

#[macro_export]
macro_rules! crud_api {
    ($repository:ty, $create_type:ty) => {
        $crate::repository_from_request!($repository);
        pub mod crud_api {
            use super::*;
            use $crate::error::ApiResult;
            use $crate::rest_api::Paging;
            use $crate::state::AppState;
            use axum::{
                extract::{Path, Query, State},
                response::IntoResponse,
                Json,
            };
            use axum_valid::Garde;
            use http::StatusCode;

            pub async fn create(
                repository: $repository,
                Garde(Json(payload)): Garde<Json<$create_type>>,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.create(payload).await?;

                Ok((StatusCode::CREATED, Json(record)))
            }

            pub async fn list(
                repository: $repository,
                State(state): State<AppState>,
                Garde(Query(paging)): Garde<Query<Paging>>,
            ) -> ApiResult<impl IntoResponse> {
                let listing_params =
                    paging.into_listing_params(state.config().default_page_size)?;
                let records = repository.list(listing_params).await?;
                Ok((StatusCode::OK, Json(records)))
            }

            pub async fn count(repository: $repository) -> ApiResult<impl IntoResponse> {
                let count = repository.count().await?;
                Ok((StatusCode::OK, Json(count)))
            }

            pub async fn get(
                Path(id): Path<i64>,
                repository: $repository,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.get(id).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            pub async fn update(
                Path(id): Path<i64>,
                repository: $repository,
                Garde(Json(payload)): Garde<Json<$create_type>>,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.update(id, payload).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            pub async fn delete(
                Path(id): Path<i64>,
                repository: $repository,
            ) -> ApiResult<impl IntoResponse> {
                repository.delete(id).await?;

                Ok((StatusCode::NO_CONTENT, ()))
            }
        }
    };
}

#[macro_export]
macro_rules! value_router {
    () => {
        pub fn router() -> axum::Router<$crate::state::AppState> {
            use axum::routing::get;
            axum::Router::new()
                .route("/", get(crud_api::list).post(crud_api::create))
                .route("/count", get(crud_api::count))
                .route(
                    "/{id}",
                    get(crud_api::get)
                        .put(crud_api::update)
                        .delete(crud_api::delete),
                )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paging(page: Option<u32>, page_size: Option<u32>, sort: Option<&str>) -> Paging {
        Paging {
            page,
            page_size,
            sort: sort.map(|s| s.to_string()),
        }
    }

    #[test]
    fn paging_defaults() {
        let params = paging(None, None, None).into_listing_params(100).unwrap();
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, 100);
        assert!(params.order.is_none());
    }

    #[test]
    fn paging_sort_directions() {
        let params = paging(Some(2), Some(10), Some("-title,+id"))
            .into_listing_params(100)
            .unwrap();
        assert_eq!(params.offset, 10);
        let order = params.order.unwrap();
        assert_eq!(order[0].to_string(), "title DESC");
        assert_eq!(order[1].to_string(), "id");
    }

    #[test]
    fn paging_rejects_empty_ordering() {
        let result = paging(None, None, Some("title,,id")).into_listing_params(100);
        assert!(matches!(result, Err(ApiError::InvalidQuery(_))));
    }
}
