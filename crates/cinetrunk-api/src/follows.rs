//! Handlers for the follow graph.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/follow`   | Body: `{"user_id","target_id"}`; records a FOLLOW activity |
//! | `PUT`  | `/unfollow` | Same body; succeeds when not following |
//! | `GET`  | `/followers/{id}` | |
//! | `GET`  | `/following/{id}` | |

use axum::extract::{Path, State};
use cinetrunk_core::{activity::NewActivity, identity::IdentitySummary, store::SocialStore};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState, activity,
  error::{ApiError, parse_id},
  extract::Json,
};

/// Ids arrive as strings so malformed values map to 400 like path ids do.
#[derive(Debug, Deserialize)]
pub struct FollowBody {
  pub user_id:   String,
  pub target_id: String,
}

impl FollowBody {
  fn parse(&self) -> Result<(Uuid, Uuid), ApiError> {
    Ok((parse_id(&self.user_id)?, parse_id(&self.target_id)?))
  }
}

/// `PUT /follow`
pub async fn follow<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<FollowBody>,
) -> Result<Json<Value>, ApiError> {
  let (actor, target) = body.parse()?;
  state.store.follow(actor, target).await.map_err(ApiError::store)?;
  activity::record(state.store.as_ref(), NewActivity::follow(actor, target)).await;
  Ok(Json(json!({ "message": "Followed successfully" })))
}

/// `PUT /unfollow`
pub async fn unfollow<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<FollowBody>,
) -> Result<Json<Value>, ApiError> {
  let (actor, target) = body.parse()?;
  state.store.unfollow(actor, target).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Unfollowed successfully" })))
}

/// `GET /followers/{id}`
pub async fn followers<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<IdentitySummary>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.followers(id).await.map_err(ApiError::store)?))
}

/// `GET /following/{id}`
pub async fn following<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<IdentitySummary>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.following(id).await.map_err(ApiError::store)?))
}
