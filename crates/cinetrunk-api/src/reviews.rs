//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/reviews` | Body: `{"user_id","title","body","rating","movie"}` |
//! | `GET`    | `/reviews/user/{id}` | Newest first |
//! | `GET`    | `/reviews/{id}` | 404 if not found |
//! | `PUT`    | `/reviews/{id}` | Partial update; records a fresh REVIEW activity |
//! | `DELETE` | `/reviews/{id}` | Earlier activities keep their snapshot |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cinetrunk_core::{
  activity::NewActivity,
  movie::MovieSnapshot,
  review::{NewReview, Review, ReviewUpdate},
  store::SocialStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, activity,
  error::{ApiError, parse_id},
  extract::Json,
};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub user_id: String,
  pub title:   String,
  pub body:    String,
  pub rating:  u8,
  pub movie:   MovieSnapshot,
}

/// `POST /reviews`
pub async fn create<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let author_id = parse_id(&body.user_id)?;
  let review = state
    .store
    .create_review(NewReview {
      author_id,
      title:  body.title,
      body:   body.body,
      rating: body.rating,
      movie:  body.movie,
    })
    .await
    .map_err(ApiError::store)?;

  activity::record(state.store.as_ref(), NewActivity::review(&review)).await;
  Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /reviews/user/{id}`
pub async fn for_user<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.reviews_for_user(id).await.map_err(ApiError::store)?))
}

/// `GET /reviews/{id}`
pub async fn get_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Review>, ApiError> {
  let id = parse_id(&id)?;
  let review = state
    .store
    .get_review(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;
  Ok(Json(review))
}

/// `PUT /reviews/{id}`
pub async fn update<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(update): Json<ReviewUpdate>,
) -> Result<Json<Review>, ApiError> {
  let id = parse_id(&id)?;
  let review = state
    .store
    .update_review(id, update)
    .await
    .map_err(ApiError::store)?;

  activity::record(state.store.as_ref(), NewActivity::review(&review)).await;
  Ok(Json(review))
}

/// `DELETE /reviews/{id}`
pub async fn delete_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let id = parse_id(&id)?;
  state.store.delete_review(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Review deleted successfully" })))
}
