//! User-curated movie lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, movie::Movie};

/// A named, ordered set of movies owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieList {
  pub list_id:     Uuid,
  pub owner_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
  /// In insertion order; a movie appears at most once.
  pub movies:      Vec<Movie>,
}

/// Input to [`crate::store::SocialStore::create_list`].
#[derive(Debug, Clone)]
pub struct NewList {
  pub owner_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
}

impl NewList {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidInput("list name must not be empty".into()));
    }
    Ok(())
  }
}

/// Outcome of adding a movie to a list.
#[derive(Debug, Clone)]
pub struct ListAddition {
  pub list:  MovieList,
  pub movie: Movie,
  /// `false` when the movie was already on the list.
  pub added: bool,
}
