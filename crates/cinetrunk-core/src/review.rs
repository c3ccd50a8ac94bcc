//! Reviews. A review embeds the movie it is about rather than referencing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, movie::MovieSnapshot};

/// Highest rating a review may carry; the lowest is zero.
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:  Uuid,
  pub author_id:  Uuid,
  pub title:      String,
  pub body:       String,
  pub rating:     u8,
  pub movie:      MovieSnapshot,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::SocialStore::create_review`].
#[derive(Debug, Clone)]
pub struct NewReview {
  pub author_id: Uuid,
  pub title:     String,
  pub body:      String,
  pub rating:    u8,
  pub movie:     MovieSnapshot,
}

impl NewReview {
  pub fn validate(&self) -> Result<()> {
    validate_text("title", &self.title)?;
    validate_text("body", &self.body)?;
    validate_rating(self.rating)?;
    self.movie.validate()
  }
}

/// Partial update accepted by [`crate::store::SocialStore::update_review`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
  pub title:  Option<String>,
  pub body:   Option<String>,
  pub rating: Option<u8>,
}

impl ReviewUpdate {
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      validate_text("title", title)?;
    }
    if let Some(body) = &self.body {
      validate_text("body", body)?;
    }
    if let Some(rating) = self.rating {
      validate_rating(rating)?;
    }
    Ok(())
  }
}

fn validate_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(())
}

fn validate_rating(rating: u8) -> Result<()> {
  if rating > MAX_RATING {
    return Err(Error::InvalidInput(format!(
      "rating must be between 0 and {MAX_RATING}, got {rating}"
    )));
  }
  Ok(())
}
