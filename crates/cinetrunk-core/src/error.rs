//! Error taxonomy shared by every CineTrunk layer.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ─────────────────────────────────────────────────────────
  #[error("invalid input: {0}")]
  InvalidInput(String),

  // ── Not found ──────────────────────────────────────────────────────────
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("list not found: {0}")]
  ListNotFound(Uuid),

  #[error("review not found: {0}")]
  ReviewNotFound(Uuid),

  // ── Conflict ───────────────────────────────────────────────────────────
  #[error("a user cannot follow themselves")]
  SelfFollow,

  #[error("already following user {0}")]
  AlreadyFollowing(Uuid),

  #[error("a list named {0:?} already exists")]
  DuplicateListName(String),

  #[error("Username or email already exists")]
  UsernameTaken,

  // ── Everything else ────────────────────────────────────────────────────
  #[error("unknown activity kind: {0:?}")]
  UnknownActivityKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The backing store failed for reasons unrelated to the request.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used by outer layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  Validation,
  NotFound,
  Conflict,
  Transient,
}

impl Error {
  pub fn class(&self) -> ErrorClass {
    match self {
      Self::InvalidInput(_) => ErrorClass::Validation,
      Self::UserNotFound(_) | Self::ListNotFound(_) | Self::ReviewNotFound(_) => {
        ErrorClass::NotFound
      }
      Self::SelfFollow
      | Self::AlreadyFollowing(_)
      | Self::DuplicateListName(_)
      | Self::UsernameTaken => ErrorClass::Conflict,
      Self::UnknownActivityKind(_) | Self::Serialization(_) | Self::Store(_) => {
        ErrorClass::Transient
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
