//! Activities — the immutable log behind every feed.
//!
//! An activity is written once, as a side effect of the write that caused it,
//! and never updated. It carries a denormalised snapshot of the entity it is
//! about, so later edits to that entity do not rewrite history. Activities
//! expire [`ACTIVITY_TTL_DAYS`] days after creation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  list::ListAddition,
  movie::MovieSnapshot,
  review::Review,
};

/// Lifetime of an activity record.
pub const ACTIVITY_TTL_DAYS: i64 = 40;

/// The instant at which an activity created at `created_at` expires.
pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
  created_at + Duration::days(ACTIVITY_TTL_DAYS)
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

/// Review fields frozen at the time the activity was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
  pub title:              String,
  pub body:               String,
  pub rating:             u8,
  pub movie_title:        String,
  pub movie_release_year: i32,
  pub movie_external_id:  i64,
}

impl From<&Review> for ReviewSnapshot {
  fn from(r: &Review) -> Self {
    Self {
      title:              r.title.clone(),
      body:               r.body.clone(),
      rating:             r.rating,
      movie_title:        r.movie.title.clone(),
      movie_release_year: r.movie.release_year,
      movie_external_id:  r.movie.external_id,
    }
  }
}

/// List fields frozen at the time a movie was added to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
  pub list_id:  Uuid,
  pub name:     String,
  pub owner_id: Uuid,
  pub movie:    MovieSnapshot,
}

// ─── ActivityKind ────────────────────────────────────────────────────────────

/// The typed payload of an activity. The variant name is the `kind`
/// discriminant stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActivityKind {
  Review {
    review_id: Uuid,
    snapshot:  ReviewSnapshot,
  },
  AddToList {
    list:     ListSnapshot,
    movie_id: Uuid,
  },
  Follow {
    followed_id: Uuid,
  },
}

impl ActivityKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Review { .. } => "review",
      Self::AddToList { .. } => "add_to_list",
      Self::Follow { .. } => "follow",
    }
  }

  /// Serialise the inner payload (without the type tag) for the
  /// `payload_json` column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild from the discriminant and JSON payload stored in the database.
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    if !matches!(discriminant, "review" | "add_to_list" | "follow") {
      return Err(Error::UnknownActivityKind(discriminant.to_owned()));
    }
    let wrapped = serde_json::json!({ "type": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id: Uuid,
  pub owner_id:    Uuid,
  /// Store-assigned, strictly increasing. Breaks ties between activities
  /// created in the same instant.
  pub sequence:    i64,
  pub created_at:  DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
  #[serde(flatten)]
  pub kind:        ActivityKind,
}

/// Input to [`crate::store::SocialStore::record_activity`]. Timestamps and
/// the sequence number are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewActivity {
  pub owner_id: Uuid,
  pub kind:     ActivityKind,
}

impl NewActivity {
  /// A review was written or edited by its author.
  pub fn review(review: &Review) -> Self {
    Self {
      owner_id: review.author_id,
      kind:     ActivityKind::Review {
        review_id: review.review_id,
        snapshot:  ReviewSnapshot::from(review),
      },
    }
  }

  /// A movie was added to a list; the activity belongs to the list owner.
  pub fn add_to_list(addition: &ListAddition) -> Self {
    Self {
      owner_id: addition.list.owner_id,
      kind:     ActivityKind::AddToList {
        list:     ListSnapshot {
          list_id:  addition.list.list_id,
          name:     addition.list.name.clone(),
          owner_id: addition.list.owner_id,
          movie:    addition.movie.snapshot(),
        },
        movie_id: addition.movie.movie_id,
      },
    }
  }

  /// `actor` started following `followed`.
  pub fn follow(actor: Uuid, followed: Uuid) -> Self {
    Self {
      owner_id: actor,
      kind:     ActivityKind::Follow { followed_id: followed },
    }
  }
}
