//! JSON REST API for CineTrunk.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cinetrunk_core::store::SocialStore`]. TLS, timeouts and request tracing
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cinetrunk_api::api_router(state))
//! ```

pub mod activity;
pub mod auth;
pub mod error;
pub mod extract;
pub mod follows;
pub mod lists;
pub mod moviedb;
pub mod movies;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use cinetrunk_core::store::SocialStore;

pub use error::ApiError;

use auth::AuthConfig;
use moviedb::MovieDbClient;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SocialStore> {
  pub store:    Arc<S>,
  pub auth:     Arc<AuthConfig>,
  pub movie_db: Arc<MovieDbClient>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SocialStore + Clone + 'static,
{
  Router::new()
    // Identities
    .route("/users",          get(users::list::<S>))
    .route("/users/register", post(users::register::<S>))
    .route("/users/login",    post(users::login::<S>))
    .route("/users/{id}",     get(users::get_one::<S>))
    // Follow graph
    .route("/follow",         put(follows::follow::<S>))
    .route("/unfollow",       put(follows::unfollow::<S>))
    .route("/followers/{id}", get(follows::followers::<S>))
    .route("/following/{id}", get(follows::following::<S>))
    // Movies
    .route("/movies",               post(movies::upsert::<S>))
    .route("/movies/{external_id}", get(movies::get_one::<S>))
    // Lists
    .route("/lists",                             post(lists::create::<S>))
    .route("/lists/user/{id}",                   get(lists::for_user::<S>))
    .route("/lists/{id}",                        get(lists::get_one::<S>).delete(lists::delete_one::<S>))
    .route("/lists/{id}/movies",                 post(lists::add_movie::<S>))
    .route("/lists/{id}/movies/{external_id}",   axum::routing::delete(lists::remove_movie::<S>))
    // Reviews
    .route("/reviews",           post(reviews::create::<S>))
    .route("/reviews/user/{id}", get(reviews::for_user::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>)
        .put(reviews::update::<S>)
        .delete(reviews::delete_one::<S>),
    )
    // Activity
    .route("/activity",           get(activity::all::<S>))
    .route("/activity/user/{id}", get(activity::own_feed::<S>))
    .route("/activity/all/{id}",  get(activity::aggregate_feed::<S>))
    .with_state(state.clone())
    // Movie database proxy
    .nest("/moviesdb", moviedb::router(state.movie_db))
}

// ─── Integration tests ────────────────────────────────────────────────────────
