//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings. Activity payloads are
//! compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use cinetrunk_core::{
  activity::{Activity, ActivityKind},
  identity::{Credentials, Identity, IdentitySummary},
  list::MovieList,
  movie::{Movie, MovieSnapshot},
  review::Review,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `users` row plus its resolved follow edges.
pub struct RawIdentity {
  pub user_id:      String,
  pub username:     String,
  pub display_name: String,
  pub email:        String,
  pub avatar:       String,
  pub created_at:   String,
  pub following:    Vec<String>,
  pub followers:    Vec<String>,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      user_id:      decode_uuid(&self.user_id)?,
      username:     self.username,
      display_name: self.display_name,
      email:        self.email,
      avatar:       self.avatar,
      created_at:   decode_dt(&self.created_at)?,
      following:    decode_uuids(&self.following)?,
      followers:    decode_uuids(&self.followers)?,
    })
  }
}

fn decode_uuids(raw: &[String]) -> Result<Vec<Uuid>> {
  raw.iter().map(|s| decode_uuid(s)).collect()
}

/// `user_id, username, display_name, avatar`
pub struct RawSummary {
  pub user_id:      String,
  pub username:     String,
  pub display_name: String,
  pub avatar:       String,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      username:     row.get(1)?,
      display_name: row.get(2)?,
      avatar:       row.get(3)?,
    })
  }

  pub fn into_summary(self) -> Result<IdentitySummary> {
    Ok(IdentitySummary {
      user_id:      decode_uuid(&self.user_id)?,
      username:     self.username,
      display_name: self.display_name,
      avatar:       self.avatar,
    })
  }
}

/// `user_id, username, password_hash`
pub struct RawCredentials {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
}

impl RawCredentials {
  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
    })
  }
}

/// `movie_id, external_id, title, release_year`
pub struct RawMovie {
  pub movie_id:     String,
  pub external_id:  i64,
  pub title:        String,
  pub release_year: i32,
}

impl RawMovie {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movie_id:     row.get(0)?,
      external_id:  row.get(1)?,
      title:        row.get(2)?,
      release_year: row.get(3)?,
    })
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      movie_id:     decode_uuid(&self.movie_id)?,
      external_id:  self.external_id,
      title:        self.title,
      release_year: self.release_year,
    })
  }
}

/// A `lists` row with its movies in insertion order.
pub struct RawList {
  pub list_id:     String,
  pub owner_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
  pub movies:      Vec<RawMovie>,
}

impl RawList {
  pub fn into_list(self) -> Result<MovieList> {
    Ok(MovieList {
      list_id:     decode_uuid(&self.list_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      movies:      self
        .movies
        .into_iter()
        .map(RawMovie::into_movie)
        .collect::<Result<_>>()?,
    })
  }
}

/// `review_id, author_id, title, body, rating, movie_external_id,
/// movie_title, movie_release_year, created_at, updated_at`
pub struct RawReview {
  pub review_id:          String,
  pub author_id:          String,
  pub title:              String,
  pub body:               String,
  pub rating:             u8,
  pub movie_external_id:  i64,
  pub movie_title:        String,
  pub movie_release_year: i32,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:          row.get(0)?,
      author_id:          row.get(1)?,
      title:              row.get(2)?,
      body:               row.get(3)?,
      rating:             row.get(4)?,
      movie_external_id:  row.get(5)?,
      movie_title:        row.get(6)?,
      movie_release_year: row.get(7)?,
      created_at:         row.get(8)?,
      updated_at:         row.get(9)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:  decode_uuid(&self.review_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      title:      self.title,
      body:       self.body,
      rating:     self.rating,
      movie:      MovieSnapshot {
        external_id:  self.movie_external_id,
        title:        self.movie_title,
        release_year: self.movie_release_year,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// `seq, activity_id, owner_id, kind, payload_json, created_at, expires_at`
pub struct RawActivity {
  pub seq:          i64,
  pub activity_id:  String,
  pub owner_id:     String,
  pub kind:         String,
  pub payload_json: String,
  pub created_at:   String,
  pub expires_at:   String,
}

impl RawActivity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:          row.get(0)?,
      activity_id:  row.get(1)?,
      owner_id:     row.get(2)?,
      kind:         row.get(3)?,
      payload_json: row.get(4)?,
      created_at:   row.get(5)?,
      expires_at:   row.get(6)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    let payload: serde_json::Value = serde_json::from_str(&self.payload_json)?;
    Ok(Activity {
      activity_id: decode_uuid(&self.activity_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      sequence:    self.seq,
      created_at:  decode_dt(&self.created_at)?,
      expires_at:  decode_dt(&self.expires_at)?,
      kind:        ActivityKind::from_parts(&self.kind, payload)?,
    })
  }
}
