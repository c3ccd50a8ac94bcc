//! Activity recording and the feed endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activity` | Every user's activities, newest first |
//! | `GET`  | `/activity/user/{id}` | The user's own activities, newest first |
//! | `GET`  | `/activity/all/{id}`  | Own plus followees' activities, newest first |

use axum::extract::{Path, State};
use cinetrunk_core::{
  activity::{Activity, NewActivity},
  store::SocialStore,
};

use crate::{
  AppState,
  error::{ApiError, parse_id},
  extract::Json,
};

/// Record `activity` after the write that caused it has committed.
///
/// Failures are logged and swallowed; the triggering request still succeeds.
pub async fn record<S: SocialStore>(store: &S, activity: NewActivity) {
  let owner = activity.owner_id;
  let kind  = activity.kind.discriminant();
  match store.record_activity(activity).await {
    Ok(recorded) => {
      tracing::debug!(%owner, kind, sequence = recorded.sequence, "activity recorded");
    }
    Err(e) => {
      tracing::warn!(%owner, kind, error = %e, "failed to record activity");
    }
  }
}

/// `GET /activity`
pub async fn all<S: SocialStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Activity>>, ApiError> {
  Ok(Json(state.store.all_activities().await.map_err(ApiError::store)?))
}

/// `GET /activity/user/{id}`
pub async fn own_feed<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Activity>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.own_feed(id).await.map_err(ApiError::store)?))
}

/// `GET /activity/all/{id}`
pub async fn aggregate_feed<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Activity>>, ApiError> {
  let id = parse_id(&id)?;
  Ok(Json(state.store.aggregate_feed(id).await.map_err(ApiError::store)?))
}
