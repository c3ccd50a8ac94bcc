//! Pass-through proxy to the external movie database (TMDB).
//!
//! | Method | Path | Upstream |
//! |--------|------|----------|
//! | `GET`  | `/search?query=&page=` | `/search/movie` |
//! | `GET`  | `/movie/{id}` | `/movie/{id}` |
//! | `GET`  | `/movie/{id}/{credits\|images\|reviews\|similar\|videos}` | same path |
//! | `GET`  | `/movie/{id}/trailers` | `/movie/{id}/videos`, trailers only |
//! | `GET`  | `/now-playing?page=` | `/movie/now_playing` |
//! | `GET`  | `/search-popular?page=&year=` | `/discover/movie` by popularity |
//! | `GET`  | `/genres` | `/genre/movie/list` |
//! | `GET`  | `/genres/{id}?page=&year=` | `/discover/movie` with one genre |
//! | `GET`  | `/movies-by-genres?genres=1,2&page=&year=` | `/discover/movie` |
//!
//! Response bodies are forwarded untouched. Every failure, including a
//! missing API key, surfaces as 502.

use std::{sync::Arc, time::Duration};

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::header,
  routing::get,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::ApiError, movies::parse_external_id};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const LANGUAGE: &str = "en-US";
const MOVIE_RESOURCES: &[&str] = &["credits", "images", "reviews", "similar", "videos"];

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

/// Connection settings for the movie database.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDbConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Bearer token; the proxy answers 502 while unset.
  #[serde(default)]
  pub api_key:  Option<String>,
}

impl Default for MovieDbConfig {
  fn default() -> Self {
    Self { base_url: default_base_url(), api_key: None }
  }
}

/// Async client for the movie database.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct MovieDbClient {
  client: Client,
  config: MovieDbConfig,
}

impl MovieDbClient {
  pub fn new(config: MovieDbConfig) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET {base_url}{path}` with the bearer key, `language` and `query`.
  pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
    let key = self
      .config
      .api_key
      .as_deref()
      .ok_or_else(|| ApiError::Upstream("movie database API key is not configured".into()))?;

    let resp = self
      .client
      .get(self.url(path))
      .bearer_auth(key)
      .header(header::ACCEPT, "application/json")
      .query(&[("language", LANGUAGE)])
      .query(query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      tracing::warn!(path, %status, "movie database request failed");
      return Err(ApiError::Upstream(format!("GET {path} → {status}")));
    }
    Ok(resp.json().await?)
  }
}

// ─── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub query: String,
  pub page:  Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page:   Option<u32>,
  pub year:   Option<i32>,
  /// Comma-separated genre ids; only read by `/movies-by-genres`.
  pub genres: Option<String>,
}

impl PageParams {
  fn page(&self) -> String { self.page.unwrap_or(1).to_string() }
}

/// `/discover/movie` query for popular movies, optionally filtered by genre
/// ids and release year.
fn discover_query(genres: &[i64], params: &PageParams) -> Vec<(&'static str, String)> {
  let mut query = vec![
    ("include_adult", "false".to_string()),
    ("sort_by", "popularity.desc".to_string()),
    ("page", params.page()),
  ];
  if !genres.is_empty() {
    let ids: Vec<String> = genres.iter().map(i64::to_string).collect();
    query.push(("with_genres", ids.join(",")));
  }
  if let Some(year) = params.year {
    query.push(("primary_release_year", year.to_string()));
  }
  query
}

fn parse_genre_list(raw: &str) -> Result<Vec<i64>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(parse_external_id)
    .collect()
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

type Db = State<Arc<MovieDbClient>>;

/// Build the proxy router; nest it under `/moviesdb`.
pub fn router(client: Arc<MovieDbClient>) -> Router<()> {
  Router::new()
    .route("/search",                 get(search))
    .route("/movie/{id}",             get(movie_details))
    .route("/movie/{id}/trailers",    get(movie_trailers))
    .route("/movie/{id}/{resource}",  get(movie_resource))
    .route("/now-playing",            get(now_playing))
    .route("/search-popular",         get(popular))
    .route("/genres",                 get(genres))
    .route("/genres/{id}",            get(movies_by_genre))
    .route("/movies-by-genres",       get(movies_by_genres))
    .with_state(client)
}

async fn search(State(db): Db, Query(params): Query<SearchParams>) -> Result<Json<Value>, ApiError> {
  let query = [
    ("query", params.query),
    ("include_adult", "false".to_string()),
    ("page", params.page.unwrap_or(1).to_string()),
  ];
  Ok(Json(db.get("/search/movie", &query).await?))
}

async fn movie_details(State(db): Db, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
  let id = parse_external_id(&id)?;
  Ok(Json(db.get(&format!("/movie/{id}"), &[]).await?))
}

async fn movie_resource(
  State(db): Db,
  Path((id, resource)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
  let id = parse_external_id(&id)?;
  if !MOVIE_RESOURCES.contains(&resource.as_str()) {
    return Err(ApiError::NotFound(format!("unknown movie resource {resource:?}")));
  }
  Ok(Json(db.get(&format!("/movie/{id}/{resource}"), &[]).await?))
}

async fn movie_trailers(State(db): Db, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
  let id     = parse_external_id(&id)?;
  let videos = db.get(&format!("/movie/{id}/videos"), &[]).await?;
  Ok(Json(Value::Array(trailers(videos))))
}

/// Keep only YouTube trailers from a `/videos` payload.
fn trailers(videos: Value) -> Vec<Value> {
  let Value::Object(mut map) = videos else { return Vec::new() };
  let Some(Value::Array(results)) = map.remove("results") else { return Vec::new() };
  results
    .into_iter()
    .filter(|v| v["type"] == "Trailer" && v["site"] == "YouTube")
    .collect()
}

async fn now_playing(State(db): Db, Query(params): Query<PageParams>) -> Result<Json<Value>, ApiError> {
  Ok(Json(db.get("/movie/now_playing", &[("page", params.page())]).await?))
}

async fn popular(State(db): Db, Query(params): Query<PageParams>) -> Result<Json<Value>, ApiError> {
  Ok(Json(db.get("/discover/movie", &discover_query(&[], &params)).await?))
}

async fn genres(State(db): Db) -> Result<Json<Value>, ApiError> {
  Ok(Json(db.get("/genre/movie/list", &[]).await?))
}

async fn movies_by_genre(
  State(db): Db,
  Path(id): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
  let id = parse_external_id(&id)?;
  Ok(Json(db.get("/discover/movie", &discover_query(&[id], &params)).await?))
}

async fn movies_by_genres(
  State(db): Db,
  Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
  let ids = parse_genre_list(params.genres.as_deref().unwrap_or(""))?;
  Ok(Json(db.get("/discover/movie", &discover_query(&ids, &params)).await?))
}
