//! Movies — local records keyed by their external (TMDB) id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The movie fields clients send and that reviews and activities embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSnapshot {
  pub external_id:  i64,
  pub title:        String,
  pub release_year: i32,
}

impl MovieSnapshot {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::InvalidInput("movie title must not be empty".into()));
    }
    Ok(())
  }
}

/// A movie known to the store. Created on first reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
  pub movie_id:     Uuid,
  pub external_id:  i64,
  pub title:        String,
  pub release_year: i32,
}

impl Movie {
  pub fn snapshot(&self) -> MovieSnapshot {
    MovieSnapshot {
      external_id:  self.external_id,
      title:        self.title.clone(),
      release_year: self.release_year,
    }
  }
}
