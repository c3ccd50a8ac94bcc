//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | Summaries of every account |
//! | `POST` | `/users/register` | Body: `{"name","username","password","email"}`; returns `{"message","user_id","user"}` |
//! | `POST` | `/users/login` | Returns `{"token","user_id"}` |
//! | `GET`  | `/users/{id}` | 404 if not found |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use cinetrunk_core::{
  identity::{Identity, IdentitySummary, NewIdentity},
  store::SocialStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::spawn_blocking;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{hash_password, issue_token, verify_password},
  error::{ApiError, parse_id},
  extract::Json,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S: SocialStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<IdentitySummary>>, ApiError> {
  let users = state.store.list_identities().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S: SocialStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Identity>, ApiError> {
  let id = parse_id(&id)?;
  let identity = state
    .store
    .get_identity(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(identity))
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub username: String,
  pub password: String,
  pub email:    String,
  pub avatar:   Option<String>,
}

/// `POST /users/register`
pub async fn register<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }

  let password      = body.password;
  let password_hash = spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))??;

  let identity = state
    .store
    .create_identity(NewIdentity {
      username:      body.username,
      display_name:  body.name,
      email:         body.email,
      password_hash,
      avatar:        body.avatar,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %identity.user_id, username = %identity.username, "registered");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "User registered successfully",
      "user_id": identity.user_id,
      "user":    IdentitySummary::from(&identity),
    })),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:   String,
  pub user_id: Uuid,
}

/// `POST /users/login`
pub async fn login<S: SocialStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
  let creds = state
    .store
    .find_credentials(&body.username)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Unauthorized("Invalid username".into()))?;

  let password = body.password;
  let phc      = creds.password_hash;
  let matched  = spawn_blocking(move || verify_password(&password, &phc))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !matched {
    return Err(ApiError::Unauthorized("Incorrect password".into()));
  }

  let token = issue_token(&state.auth, creds.user_id, &creds.username, Utc::now())?;
  Ok(Json(LoginResponse { token, user_id: creds.user_id }))
}
