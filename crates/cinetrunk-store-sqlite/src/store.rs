//! [`SqliteStore`] — the SQLite implementation of [`SocialStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cinetrunk_core::{
  Error as CoreError,
  activity::{Activity, NewActivity, expiry_for},
  identity::{Credentials, DEFAULT_AVATAR, Identity, IdentitySummary, NewIdentity},
  list::{ListAddition, MovieList, NewList},
  movie::{Movie, MovieSnapshot},
  review::{NewReview, Review, ReviewUpdate},
  store::SocialStore,
};

use crate::{
  Error, Result,
  encode::{
    RawActivity, RawCredentials, RawIdentity, RawList, RawMovie, RawReview,
    RawSummary, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

const SUMMARY_COLS: &str = "u.user_id, u.username, u.display_name, u.avatar";
const REVIEW_COLS: &str = "review_id, author_id, title, body, rating, \
  movie_external_id, movie_title, movie_release_year, created_at, updated_at";
const ACTIVITY_COLS: &str =
  "seq, activity_id, owner_id, kind, payload_json, created_at, expires_at";

// ─── Outcomes ────────────────────────────────────────────────────────────────
//
// Domain checks run inside the same `call` (and transaction) as the write they
// guard; the closure reports which rule failed and the caller maps it onto an
// error outside the connection thread.

enum Guarded<T> {
  Done(T),
  UserMissing(Uuid),
  ListMissing(Uuid),
  ReviewMissing(Uuid),
  Conflict(CoreError),
}

impl<T> Guarded<T> {
  fn into_result(self) -> Result<T> {
    match self {
      Self::Done(v) => Ok(v),
      Self::UserMissing(id) => Err(CoreError::UserNotFound(id).into()),
      Self::ListMissing(id) => Err(CoreError::ListNotFound(id).into()),
      Self::ReviewMissing(id) => Err(CoreError::ReviewNotFound(id).into()),
      Self::Conflict(e) => Err(e.into()),
    }
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn user_exists(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM users WHERE user_id = ?1", [id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn list_exists(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM lists WHERE list_id = ?1", [id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn summaries(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<Vec<RawSummary>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([id], RawSummary::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn id_column(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Return the movie row for `snapshot.external_id`, inserting it first if it
/// does not exist yet.
fn upsert_movie_row(
  conn: &rusqlite::Connection,
  snapshot: &MovieSnapshot,
) -> rusqlite::Result<RawMovie> {
  conn.execute(
    "INSERT OR IGNORE INTO movies (movie_id, external_id, title, release_year)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      snapshot.external_id,
      snapshot.title,
      snapshot.release_year,
    ],
  )?;
  conn.query_row(
    "SELECT movie_id, external_id, title, release_year FROM movies WHERE external_id = ?1",
    [snapshot.external_id],
    RawMovie::from_row,
  )
}

fn load_list(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawList>> {
  let head = conn
    .query_row(
      "SELECT list_id, owner_id, name, description, created_at FROM lists WHERE list_id = ?1",
      [id],
      |row| {
        Ok(RawList {
          list_id:     row.get(0)?,
          owner_id:    row.get(1)?,
          name:        row.get(2)?,
          description: row.get(3)?,
          created_at:  row.get(4)?,
          movies:      Vec::new(),
        })
      },
    )
    .optional()?;

  let Some(mut list) = head else { return Ok(None) };

  let mut stmt = conn.prepare(
    "SELECT m.movie_id, m.external_id, m.title, m.release_year
     FROM list_movies lm
     JOIN movies m ON m.movie_id = lm.movie_id
     WHERE lm.list_id = ?1
     ORDER BY lm.rowid",
  )?;
  list.movies = stmt
    .query_map([id], RawMovie::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(list))
}

fn query_activities(
  conn: &rusqlite::Connection,
  sql: &str,
  user: &str,
  now: &str,
) -> rusqlite::Result<Vec<RawActivity>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(rusqlite::params![user, now], RawActivity::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CineTrunk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// statement runs on the one connection thread, in submission order.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Record an activity with an explicit creation time. The trait method uses
  /// the current time; this is the hook for backfills and expiry tests.
  pub async fn record_activity_at(
    &self,
    input: NewActivity,
    created_at: DateTime<Utc>,
  ) -> Result<Activity> {
    // Stored at microsecond precision; keep the returned value identical.
    let created_at  = created_at.trunc_subsecs(6);
    let activity_id = Uuid::new_v4();
    let expires_at  = expiry_for(created_at);

    let id_str      = encode_uuid(activity_id);
    let owner_str   = encode_uuid(input.owner_id);
    let kind_str    = input.kind.discriminant().to_owned();
    let payload_str = input.kind.to_json()?.to_string();
    let created_str = encode_dt(created_at);
    let expires_str = encode_dt(expires_at);

    let seq = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (activity_id, owner_id, kind, payload_json, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, kind_str, payload_str, created_str, expires_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Activity {
      activity_id,
      owner_id: input.owner_id,
      sequence: seq,
      created_at,
      expires_at,
      kind: input.kind,
    })
  }

  /// Unexpired activities matching `filter` (which binds the user as `?1`),
  /// newest first with the insertion sequence breaking ties.
  async fn feed(&self, user: Uuid, filter: &'static str) -> Result<Vec<Activity>> {
    let user_str = encode_uuid(user);
    let now_str  = encode_dt(Utc::now());
    let sql = format!(
      "SELECT {ACTIVITY_COLS} FROM activities
       WHERE ({filter}) AND expires_at > ?2
       ORDER BY created_at DESC, seq DESC"
    );

    let raws = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &user_str)? {
          return Ok(Guarded::UserMissing(user));
        }
        Ok(Guarded::Done(query_activities(conn, &sql, &user_str, &now_str)?))
      })
      .await?
      .into_result()?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn create_identity(&self, input: NewIdentity) -> Result<Identity> {
    input.validate()?;

    let identity = Identity {
      user_id:      Uuid::new_v4(),
      username:     input.username,
      display_name: input.display_name,
      email:        input.email,
      avatar:       input.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
      created_at:   Utc::now(),
      following:    Vec::new(),
      followers:    Vec::new(),
    };

    let id_str   = encode_uuid(identity.user_id);
    let username = identity.username.clone();
    let name     = identity.display_name.clone();
    let email    = identity.email.clone();
    let avatar   = identity.avatar.clone();
    let at_str   = encode_dt(identity.created_at);
    let hash     = input.password_hash;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1 OR email = ?2",
            rusqlite::params![username, email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Guarded::Conflict(CoreError::UsernameTaken));
        }
        tx.execute(
          "INSERT INTO users (user_id, username, display_name, email, password_hash, avatar, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, username, name, email, hash, avatar, at_str],
        )?;
        tx.commit()?;
        Ok(Guarded::Done(()))
      })
      .await?
      .into_result()?;

    Ok(identity)
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        let head = conn
          .query_row(
            "SELECT user_id, username, display_name, email, avatar, created_at
             FROM users WHERE user_id = ?1",
            [&id_str],
            |row| {
              Ok(RawIdentity {
                user_id:      row.get(0)?,
                username:     row.get(1)?,
                display_name: row.get(2)?,
                email:        row.get(3)?,
                avatar:       row.get(4)?,
                created_at:   row.get(5)?,
                following:    Vec::new(),
                followers:    Vec::new(),
              })
            },
          )
          .optional()?;

        let Some(mut raw) = head else { return Ok(None) };
        raw.following = id_column(
          conn,
          "SELECT followee_id FROM follows WHERE follower_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        raw.followers = id_column(
          conn,
          "SELECT follower_id FROM follows WHERE followee_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn list_identities(&self) -> Result<Vec<IdentitySummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLS} FROM users u ORDER BY u.created_at, u.rowid"
        ))?;
        let rows = stmt
          .query_map([], RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
    let username = username.to_owned();

    let raw: Option<RawCredentials> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash FROM users WHERE username = ?1",
              [&username],
              |row| {
                Ok(RawCredentials {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCredentials::into_credentials).transpose()
  }

  // ── Follow graph ──────────────────────────────────────────────────────────

  async fn follow(&self, actor: Uuid, target: Uuid) -> Result<()> {
    if actor == target {
      return Err(CoreError::SelfFollow.into());
    }

    let actor_str  = encode_uuid(actor);
    let target_str = encode_uuid(target);
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, &actor_str)? {
          return Ok(Guarded::UserMissing(actor));
        }
        if !user_exists(&tx, &target_str)? {
          return Ok(Guarded::UserMissing(target));
        }
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![actor_str, target_str, at_str],
        )?;
        if inserted == 0 {
          return Ok(Guarded::Conflict(CoreError::AlreadyFollowing(target)));
        }
        tx.commit()?;
        Ok(Guarded::Done(()))
      })
      .await?
      .into_result()
  }

  async fn unfollow(&self, actor: Uuid, target: Uuid) -> Result<()> {
    let actor_str  = encode_uuid(actor);
    let target_str = encode_uuid(target);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, &actor_str)? {
          return Ok(Guarded::UserMissing(actor));
        }
        if !user_exists(&tx, &target_str)? {
          return Ok(Guarded::UserMissing(target));
        }
        tx.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
          rusqlite::params![actor_str, target_str],
        )?;
        tx.commit()?;
        Ok(Guarded::Done(()))
      })
      .await?
      .into_result()
  }

  async fn followers(&self, id: Uuid) -> Result<Vec<IdentitySummary>> {
    let id_str = encode_uuid(id);

    let raws = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &id_str)? {
          return Ok(Guarded::UserMissing(id));
        }
        let sql = format!(
          "SELECT {SUMMARY_COLS} FROM follows f
           JOIN users u ON u.user_id = f.follower_id
           WHERE f.followee_id = ?1
           ORDER BY f.rowid"
        );
        Ok(Guarded::Done(summaries(conn, &sql, &id_str)?))
      })
      .await?
      .into_result()?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn following(&self, id: Uuid) -> Result<Vec<IdentitySummary>> {
    let id_str = encode_uuid(id);

    let raws = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &id_str)? {
          return Ok(Guarded::UserMissing(id));
        }
        let sql = format!(
          "SELECT {SUMMARY_COLS} FROM follows f
           JOIN users u ON u.user_id = f.followee_id
           WHERE f.follower_id = ?1
           ORDER BY f.rowid"
        );
        Ok(Guarded::Done(summaries(conn, &sql, &id_str)?))
      })
      .await?
      .into_result()?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  // ── Movies ────────────────────────────────────────────────────────────────

  async fn upsert_movie(&self, snapshot: MovieSnapshot) -> Result<Movie> {
    snapshot.validate()?;
    let raw = self
      .conn
      .call(move |conn| Ok(upsert_movie_row(conn, &snapshot)?))
      .await?;
    raw.into_movie()
  }

  async fn get_movie(&self, external_id: i64) -> Result<Option<Movie>> {
    let raw: Option<RawMovie> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT movie_id, external_id, title, release_year FROM movies WHERE external_id = ?1",
              [external_id],
              RawMovie::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawMovie::into_movie).transpose()
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  async fn create_list(&self, input: NewList) -> Result<MovieList> {
    input.validate()?;

    let list = MovieList {
      list_id:     Uuid::new_v4(),
      owner_id:    input.owner_id,
      name:        input.name,
      description: input.description,
      created_at:  Utc::now(),
      movies:      Vec::new(),
    };

    let owner     = list.owner_id;
    let id_str    = encode_uuid(list.list_id);
    let owner_str = encode_uuid(owner);
    let name      = list.name.clone();
    let desc      = list.description.clone();
    let at_str    = encode_dt(list.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, &owner_str)? {
          return Ok(Guarded::UserMissing(owner));
        }
        let duplicate = tx
          .query_row(
            "SELECT 1 FROM lists WHERE owner_id = ?1 AND name = ?2",
            rusqlite::params![owner_str, name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if duplicate {
          return Ok(Guarded::Conflict(CoreError::DuplicateListName(name)));
        }
        tx.execute(
          "INSERT INTO lists (list_id, owner_id, name, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, owner_str, name, desc, at_str],
        )?;
        tx.commit()?;
        Ok(Guarded::Done(()))
      })
      .await?
      .into_result()?;

    Ok(list)
  }

  async fn get_list(&self, id: Uuid) -> Result<Option<MovieList>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(load_list(conn, &id_str)?))
      .await?;
    raw.map(RawList::into_list).transpose()
  }

  async fn lists_for_user(&self, owner: Uuid) -> Result<Vec<MovieList>> {
    let owner_str = encode_uuid(owner);

    let raws = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &owner_str)? {
          return Ok(Guarded::UserMissing(owner));
        }
        let ids = id_column(
          conn,
          "SELECT list_id FROM lists WHERE owner_id = ?1 ORDER BY created_at, rowid",
          &owner_str,
        )?;
        let mut lists = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(list) = load_list(conn, &id)? {
            lists.push(list);
          }
        }
        Ok(Guarded::Done(lists))
      })
      .await?
      .into_result()?;

    raws.into_iter().map(RawList::into_list).collect()
  }

  async fn delete_list(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let deleted = conn.execute("DELETE FROM lists WHERE list_id = ?1", [&id_str])?;
        Ok(if deleted == 0 { Guarded::ListMissing(id) } else { Guarded::Done(()) })
      })
      .await?
      .into_result()
  }

  async fn add_movie_to_list(
    &self,
    list_id: Uuid,
    movie:   MovieSnapshot,
  ) -> Result<ListAddition> {
    movie.validate()?;
    let id_str = encode_uuid(list_id);
    let at_str = encode_dt(Utc::now());

    let (raw_list, raw_movie, added) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !list_exists(&tx, &id_str)? {
          return Ok(Guarded::ListMissing(list_id));
        }
        let raw_movie = upsert_movie_row(&tx, &movie)?;
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO list_movies (list_id, movie_id, added_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, raw_movie.movie_id, at_str],
        )?;
        let Some(raw_list) = load_list(&tx, &id_str)? else {
          return Ok(Guarded::ListMissing(list_id));
        };
        tx.commit()?;
        Ok(Guarded::Done((raw_list, raw_movie, inserted > 0)))
      })
      .await?
      .into_result()?;

    Ok(ListAddition {
      list: raw_list.into_list()?,
      movie: raw_movie.into_movie()?,
      added,
    })
  }

  async fn remove_movie_from_list(
    &self,
    list_id:     Uuid,
    external_id: i64,
  ) -> Result<MovieList> {
    let id_str = encode_uuid(list_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !list_exists(&tx, &id_str)? {
          return Ok(Guarded::ListMissing(list_id));
        }
        tx.execute(
          "DELETE FROM list_movies
           WHERE list_id = ?1
             AND movie_id IN (SELECT movie_id FROM movies WHERE external_id = ?2)",
          rusqlite::params![id_str, external_id],
        )?;
        let Some(raw_list) = load_list(&tx, &id_str)? else {
          return Ok(Guarded::ListMissing(list_id));
        };
        tx.commit()?;
        Ok(Guarded::Done(raw_list))
      })
      .await?
      .into_result()?;

    raw.into_list()
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn create_review(&self, input: NewReview) -> Result<Review> {
    input.validate()?;

    let now = Utc::now();
    let review = Review {
      review_id:  Uuid::new_v4(),
      author_id:  input.author_id,
      title:      input.title,
      body:       input.body,
      rating:     input.rating,
      movie:      input.movie,
      created_at: now,
      updated_at: now,
    };

    let author     = review.author_id;
    let id_str     = encode_uuid(review.review_id);
    let author_str = encode_uuid(author);
    let title      = review.title.clone();
    let body       = review.body.clone();
    let rating     = review.rating;
    let movie      = review.movie.clone();
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, &author_str)? {
          return Ok(Guarded::UserMissing(author));
        }
        upsert_movie_row(&tx, &movie)?;
        tx.execute(
          &format!("INSERT INTO reviews ({REVIEW_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"),
          rusqlite::params![
            id_str,
            author_str,
            title,
            body,
            rating,
            movie.external_id,
            movie.title,
            movie.release_year,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(Guarded::Done(()))
      })
      .await?
      .into_result()?;

    Ok(review)
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REVIEW_COLS} FROM reviews WHERE review_id = ?1"),
              [&id_str],
              RawReview::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawReview::into_review).transpose()
  }

  async fn reviews_for_user(&self, author: Uuid) -> Result<Vec<Review>> {
    let author_str = encode_uuid(author);

    let raws = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &author_str)? {
          return Ok(Guarded::UserMissing(author));
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLS} FROM reviews WHERE author_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([&author_str], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Guarded::Done(rows))
      })
      .await?
      .into_result()?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn update_review(&self, id: Uuid, update: ReviewUpdate) -> Result<Review> {
    update.validate()?;
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE reviews SET
             title      = COALESCE(?2, title),
             body       = COALESCE(?3, body),
             rating     = COALESCE(?4, rating),
             updated_at = ?5
           WHERE review_id = ?1",
          rusqlite::params![id_str, update.title, update.body, update.rating, at_str],
        )?;
        if changed == 0 {
          return Ok(Guarded::ReviewMissing(id));
        }
        let raw = tx.query_row(
          &format!("SELECT {REVIEW_COLS} FROM reviews WHERE review_id = ?1"),
          [&id_str],
          RawReview::from_row,
        )?;
        tx.commit()?;
        Ok(Guarded::Done(raw))
      })
      .await?
      .into_result()?;

    raw.into_review()
  }

  async fn delete_review(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let deleted = conn.execute("DELETE FROM reviews WHERE review_id = ?1", [&id_str])?;
        Ok(if deleted == 0 { Guarded::ReviewMissing(id) } else { Guarded::Done(()) })
      })
      .await?
      .into_result()
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn record_activity(&self, input: NewActivity) -> Result<Activity> {
    self.record_activity_at(input, Utc::now()).await
  }

  async fn own_feed(&self, user: Uuid) -> Result<Vec<Activity>> {
    self.feed(user, "owner_id = ?1").await
  }

  async fn aggregate_feed(&self, user: Uuid) -> Result<Vec<Activity>> {
    self
      .feed(
        user,
        "owner_id = ?1
         OR owner_id IN (SELECT followee_id FROM follows WHERE follower_id = ?1)",
      )
      .await
  }

  async fn all_activities(&self) -> Result<Vec<Activity>> {
    let now_str = encode_dt(Utc::now());
    let sql = format!(
      "SELECT {ACTIVITY_COLS} FROM activities
       WHERE expires_at > ?1
       ORDER BY created_at DESC, seq DESC"
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([&now_str], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM activities WHERE expires_at <= ?1", [&now_str])?)
      })
      .await?;
    Ok(removed)
  }
}
