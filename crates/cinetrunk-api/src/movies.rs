//! Handlers for locally known movies.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/movies` | Body: `MovieSnapshot`; get-or-create by external id |
//! | `GET`  | `/movies/{external_id}` | 404 if never referenced |

use axum::extract::{Path, State};
use cinetrunk_core::{
  movie::{Movie, MovieSnapshot},
  store::SocialStore,
};

use crate::{AppState, error::ApiError, extract::Json};

/// `POST /movies`
pub async fn upsert<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(snapshot): Json<MovieSnapshot>,
) -> Result<Json<Movie>, ApiError> {
  Ok(Json(state.store.upsert_movie(snapshot).await.map_err(ApiError::store)?))
}

/// `GET /movies/{external_id}`
pub async fn get_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(external_id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
  let external_id = parse_external_id(&external_id)?;
  let movie = state
    .store
    .get_movie(external_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("movie {external_id} not found")))?;
  Ok(Json(movie))
}

pub(crate) fn parse_external_id(raw: &str) -> Result<i64, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid movie id: {raw:?}")))
}
