//! SQL schema for the CineTrunk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,        -- argon2 PHC string
    avatar        TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- One row per relationship. Both `following` and `followers` are read from
-- here, so the two sides cannot disagree. rowid gives insertion order.
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL REFERENCES users(user_id),
    followee_id TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    CHECK (follower_id != followee_id)
);

CREATE TABLE IF NOT EXISTS movies (
    movie_id     TEXT PRIMARY KEY,
    external_id  INTEGER NOT NULL UNIQUE,  -- TMDB id
    title        TEXT NOT NULL,
    release_year INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS lists (
    list_id     TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id),
    name        TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS list_movies (
    list_id  TEXT NOT NULL REFERENCES lists(list_id) ON DELETE CASCADE,
    movie_id TEXT NOT NULL REFERENCES movies(movie_id),
    added_at TEXT NOT NULL,
    PRIMARY KEY (list_id, movie_id)
);

-- The movie is embedded, not referenced.
CREATE TABLE IF NOT EXISTS reviews (
    review_id          TEXT PRIMARY KEY,
    author_id          TEXT NOT NULL REFERENCES users(user_id),
    title              TEXT NOT NULL,
    body               TEXT NOT NULL,
    rating             INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 10),
    movie_external_id  INTEGER NOT NULL,
    movie_title        TEXT NOT NULL,
    movie_release_year INTEGER NOT NULL,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- Activities are append-only. The only DELETE ever issued is the expiry
-- sweep on expires_at.
CREATE TABLE IF NOT EXISTS activities (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    activity_id  TEXT NOT NULL UNIQUE,
    owner_id     TEXT NOT NULL REFERENCES users(user_id),
    kind         TEXT NOT NULL,   -- discriminant of ActivityKind
    payload_json TEXT NOT NULL,   -- JSON payload (inner data only)
    created_at   TEXT NOT NULL,
    expires_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS follows_followee_idx     ON follows(followee_id);
CREATE INDEX IF NOT EXISTS reviews_author_idx       ON reviews(author_id);
CREATE INDEX IF NOT EXISTS lists_owner_idx          ON lists(owner_id);
CREATE INDEX IF NOT EXISTS activities_owner_idx     ON activities(owner_id, created_at);
CREATE INDEX IF NOT EXISTS activities_expires_idx   ON activities(expires_at);

PRAGMA user_version = 1;
";
