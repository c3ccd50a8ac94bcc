//! Handlers for `/lists` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/lists` | Body: `{"user_id","name","description"?}` |
//! | `GET`    | `/lists/user/{id}` | Lists owned by a user |
//! | `GET`    | `/lists/{id}` | 404 if not found |
//! | `DELETE` | `/lists/{id}` | |
//! | `POST`   | `/lists/{id}/movies` | Body: `MovieSnapshot`; ADD_TO_LIST activity when newly added |
//! | `DELETE` | `/lists/{id}/movies/{external_id}` | No-op if absent |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cinetrunk_core::{
  activity::NewActivity,
  list::{MovieList, NewList},
  movie::MovieSnapshot,
  store::SocialStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, activity,
  error::{ApiError, parse_id},
  extract::Json,
  movies::parse_external_id,
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub user_id:     String,
  pub name:        String,
  pub description: Option<String>,
}

/// `POST /lists`
pub async fn create<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let owner_id = parse_id(&body.user_id)?;
  let list = state
    .store
    .create_list(NewList { owner_id, name: body.name, description: body.description })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(list)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /lists/user/{id}`
pub async fn for_user<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<MovieList>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.lists_for_user(id).await.map_err(ApiError::store)?))
}

/// `GET /lists/{id}`
pub async fn get_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<MovieList>, ApiError> {
  let id = parse_id(&id)?;
  let list = state
    .store
    .get_list(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("list {id} not found")))?;
  Ok(Json(list))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /lists/{id}`
pub async fn delete_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let id = parse_id(&id)?;
  state.store.delete_list(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "List deleted successfully" })))
}

// ─── Membership ───────────────────────────────────────────────────────────────

/// `POST /lists/{id}/movies`
pub async fn add_movie<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(movie): Json<MovieSnapshot>,
) -> Result<Json<MovieList>, ApiError> {
  let id = parse_id(&id)?;
  let addition = state
    .store
    .add_movie_to_list(id, movie)
    .await
    .map_err(ApiError::store)?;

  if addition.added {
    activity::record(state.store.as_ref(), NewActivity::add_to_list(&addition)).await;
  }
  Ok(Json(addition.list))
}

/// `DELETE /lists/{id}/movies/{external_id}`
pub async fn remove_movie<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path((id, external_id)): Path<(String, String)>,
) -> Result<Json<MovieList>, ApiError> {
  let id          = parse_id(&id)?;
  let external_id = parse_external_id(&external_id)?;
  let list = state
    .store
    .remove_movie_from_list(id, external_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(list))
}
