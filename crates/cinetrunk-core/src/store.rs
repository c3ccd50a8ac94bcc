//! The `SocialStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `cinetrunk-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  activity::{Activity, NewActivity},
  identity::{Credentials, Identity, IdentitySummary, NewIdentity},
  list::{ListAddition, MovieList, NewList},
  movie::{Movie, MovieSnapshot},
  review::{NewReview, Review, ReviewUpdate},
};

/// Abstraction over a CineTrunk store backend.
///
/// Domain failures (not found, conflicts, validation) are reported through
/// backend errors that convert into [`crate::Error`], so callers can classify
/// them without knowing the backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Persist a new identity. Fails if the username or email is taken.
  fn create_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Retrieve an identity with its resolved follow sets. `None` if missing.
  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn list_identities(
    &self,
  ) -> impl Future<Output = Result<Vec<IdentitySummary>, Self::Error>> + Send + '_;

  /// Look up login material by username. `None` if no such user.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  // ── Follow graph ──────────────────────────────────────────────────────

  /// Make `actor` follow `target`. Both sides of the relationship change in
  /// one atomic write.
  ///
  /// Fails on self-follow, on a missing identity, or when the relationship
  /// already exists.
  fn follow(
    &self,
    actor: Uuid,
    target: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the relationship if present. Not following is not an error.
  fn unfollow(
    &self,
    actor: Uuid,
    target: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn followers(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<IdentitySummary>, Self::Error>> + Send + '_;

  fn following(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<IdentitySummary>, Self::Error>> + Send + '_;

  // ── Movies ────────────────────────────────────────────────────────────

  /// Return the movie with `snapshot.external_id`, creating it if needed.
  fn upsert_movie(
    &self,
    snapshot: MovieSnapshot,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  fn get_movie(
    &self,
    external_id: i64,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  // ── Lists ─────────────────────────────────────────────────────────────

  fn create_list(
    &self,
    input: NewList,
  ) -> impl Future<Output = Result<MovieList, Self::Error>> + Send + '_;

  fn get_list(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MovieList>, Self::Error>> + Send + '_;

  /// Lists owned by `owner`, oldest first. Fails if the owner is missing.
  fn lists_for_user(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<MovieList>, Self::Error>> + Send + '_;

  fn delete_list(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append a movie (created on demand) to a list unless already present.
  fn add_movie_to_list(
    &self,
    list_id: Uuid,
    movie: MovieSnapshot,
  ) -> impl Future<Output = Result<ListAddition, Self::Error>> + Send + '_;

  /// Drop a movie from a list. Absent movies are ignored.
  fn remove_movie_from_list(
    &self,
    list_id: Uuid,
    external_id: i64,
  ) -> impl Future<Output = Result<MovieList, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  fn create_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Reviews written by `author`, newest first. Fails if the author is
  /// missing.
  fn reviews_for_user(
    &self,
    author: Uuid,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  fn update_review(
    &self,
    id: Uuid,
    update: ReviewUpdate,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  fn delete_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Activities ────────────────────────────────────────────────────────

  /// Append an immutable activity. `created_at`, `expires_at` and
  /// `sequence` are set by the store.
  fn record_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// The user's own unexpired activities, newest first.
  fn own_feed(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  /// The user's own activities merged with those of everyone they follow,
  /// newest first. Computed on read; nothing is fanned out on write.
  fn aggregate_feed(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  /// Every user's unexpired activities, newest first.
  fn all_activities(
    &self,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  /// Physically delete activities whose expiry is at or before `now`.
  /// Returns the number removed.
  fn purge_expired(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
