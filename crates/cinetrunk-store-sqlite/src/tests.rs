//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use cinetrunk_core::{
  Error as CoreError,
  activity::{ActivityKind, NewActivity},
  identity::{DEFAULT_AVATAR, Identity, IdentitySummary, NewIdentity},
  list::NewList,
  movie::MovieSnapshot,
  review::{NewReview, ReviewUpdate},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, username: &str) -> Identity {
  s.create_identity(NewIdentity {
    username:      username.into(),
    display_name:  format!("{username} display"),
    email:         format!("{username}@example.com"),
    password_hash: "$argon2id$not-a-real-hash".into(),
    avatar:        None,
  })
  .await
  .unwrap()
}

fn titanic() -> MovieSnapshot {
  MovieSnapshot {
    external_id:  597,
    title:        "Titanic".into(),
    release_year: 1997,
  }
}

fn matrix() -> MovieSnapshot {
  MovieSnapshot {
    external_id:  603,
    title:        "The Matrix".into(),
    release_year: 1999,
  }
}

fn review_of(author: Uuid, rating: u8, movie: MovieSnapshot) -> NewReview {
  NewReview {
    author_id: author,
    title:     "Worth it".into(),
    body:      "A long and careful review.".into(),
    rating,
    movie,
  }
}

fn core(err: Error) -> CoreError { err.into() }

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_identity() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  assert_eq!(alice.avatar, DEFAULT_AVATAR);

  let fetched = s.get_identity(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.username, "alice");
  assert!(fetched.following.is_empty());
  assert!(fetched.followers.is_empty());
}

#[tokio::test]
async fn get_identity_missing_returns_none() {
  let s = store().await;
  assert!(s.get_identity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_rejected() {
  let s = store().await;
  user(&s, "alice").await;

  let err = s
    .create_identity(NewIdentity {
      username:      "alice".into(),
      display_name:  "Other Alice".into(),
      email:         "other@example.com".into(),
      password_hash: "x".into(),
      avatar:        None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::UsernameTaken));
}

#[tokio::test]
async fn credentials_lookup() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let creds = s.find_credentials("alice").await.unwrap().unwrap();
  assert_eq!(creds.user_id, alice.user_id);
  assert_eq!(creds.password_hash, "$argon2id$not-a-real-hash");
  assert!(s.find_credentials("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn list_identities_in_creation_order() {
  let s = store().await;
  user(&s, "alice").await;
  user(&s, "bob").await;

  let all = s.list_identities().await.unwrap();
  let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
  assert_eq!(names, ["alice", "bob"]);
}

// ─── Follow graph ────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_updates_both_sides() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;

  s.follow(a.user_id, b.user_id).await.unwrap();

  let following = s.following(a.user_id).await.unwrap();
  assert_eq!(following.len(), 1);
  assert_eq!(following[0].user_id, b.user_id);

  let followers = s.followers(b.user_id).await.unwrap();
  assert_eq!(followers.len(), 1);
  assert_eq!(followers[0], IdentitySummary::from(&a));

  let a_view = s.get_identity(a.user_id).await.unwrap().unwrap();
  let b_view = s.get_identity(b.user_id).await.unwrap().unwrap();
  assert_eq!(a_view.following, vec![b.user_id]);
  assert_eq!(b_view.followers, vec![a.user_id]);
}

#[tokio::test]
async fn self_follow_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let err = s.follow(a.user_id, a.user_id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::SelfFollow));
}

#[tokio::test]
async fn follow_twice_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;

  s.follow(a.user_id, b.user_id).await.unwrap();
  let err = s.follow(a.user_id, b.user_id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::AlreadyFollowing(id) if id == b.user_id));
}

#[tokio::test]
async fn follow_missing_target_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let ghost = Uuid::new_v4();
  let err = s.follow(a.user_id, ghost).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(id) if id == ghost));
}

#[tokio::test]
async fn unfollow_when_not_following_is_noop() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  s.unfollow(a.user_id, b.user_id).await.unwrap();
  assert!(s.following(a.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unfollow_missing_identity_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let err = s.unfollow(Uuid::new_v4(), a.user_id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(_)));
}

#[tokio::test]
async fn follow_then_unfollow_restores_previous_state() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let c = user(&s, "c").await;

  // Unrelated edges that must survive.
  s.follow(a.user_id, c.user_id).await.unwrap();
  s.follow(c.user_id, b.user_id).await.unwrap();

  let a_before = s.following(a.user_id).await.unwrap();
  let b_before = s.followers(b.user_id).await.unwrap();

  s.follow(a.user_id, b.user_id).await.unwrap();
  s.unfollow(a.user_id, b.user_id).await.unwrap();

  assert_eq!(s.following(a.user_id).await.unwrap(), a_before);
  assert_eq!(s.followers(b.user_id).await.unwrap(), b_before);
}

#[tokio::test]
async fn followers_of_missing_user_rejected() {
  let s = store().await;
  let err = s.followers(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(_)));
}

// ─── Movies & lists ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_movie_is_idempotent() {
  let s = store().await;
  let first = s.upsert_movie(titanic()).await.unwrap();
  let second = s.upsert_movie(titanic()).await.unwrap();
  assert_eq!(first.movie_id, second.movie_id);
  assert_eq!(s.get_movie(597).await.unwrap().unwrap(), first);
}

#[tokio::test]
async fn duplicate_list_name_rejected() {
  let s = store().await;
  let u = user(&s, "u").await;
  let new = || NewList {
    owner_id:    u.user_id,
    name:        "Watchlist".into(),
    description: None,
  };
  s.create_list(new()).await.unwrap();
  let err = s.create_list(new()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateListName(n) if n == "Watchlist"));
}

#[tokio::test]
async fn empty_list_name_rejected() {
  let s = store().await;
  let u = user(&s, "u").await;
  let err = s
    .create_list(NewList { owner_id: u.user_id, name: " ".into(), description: None })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn add_movie_to_list_once() {
  let s = store().await;
  let u = user(&s, "u").await;
  let list = s
    .create_list(NewList { owner_id: u.user_id, name: "Watchlist".into(), description: None })
    .await
    .unwrap();

  let first = s.add_movie_to_list(list.list_id, titanic()).await.unwrap();
  assert!(first.added);
  assert_eq!(first.list.movies.len(), 1);

  let again = s.add_movie_to_list(list.list_id, titanic()).await.unwrap();
  assert!(!again.added);
  assert_eq!(again.list.movies.len(), 1);
  assert_eq!(again.movie.movie_id, first.movie.movie_id);
}

#[tokio::test]
async fn remove_movie_and_delete_list() {
  let s = store().await;
  let u = user(&s, "u").await;
  let list = s
    .create_list(NewList { owner_id: u.user_id, name: "Favs".into(), description: Some("best".into()) })
    .await
    .unwrap();
  s.add_movie_to_list(list.list_id, titanic()).await.unwrap();
  s.add_movie_to_list(list.list_id, matrix()).await.unwrap();

  let after = s.remove_movie_from_list(list.list_id, 597).await.unwrap();
  let remaining: Vec<i64> = after.movies.iter().map(|m| m.external_id).collect();
  assert_eq!(remaining, [603]);

  s.delete_list(list.list_id).await.unwrap();
  assert!(s.get_list(list.list_id).await.unwrap().is_none());
  assert!(s.lists_for_user(u.user_id).await.unwrap().is_empty());

  let err = s.delete_list(list.list_id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::ListNotFound(_)));
}

#[tokio::test]
async fn add_to_missing_list_rejected() {
  let s = store().await;
  let err = s.add_movie_to_list(Uuid::new_v4(), titanic()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::ListNotFound(_)));
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_update_delete_review() {
  let s = store().await;
  let u = user(&s, "u").await;

  let review = s.create_review(review_of(u.user_id, 8, matrix())).await.unwrap();
  assert!(s.get_movie(603).await.unwrap().is_some());

  let updated = s
    .update_review(review.review_id, ReviewUpdate { rating: Some(9), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(updated.rating, 9);
  assert_eq!(updated.title, review.title);
  assert!(updated.updated_at >= review.updated_at);

  let mine = s.reviews_for_user(u.user_id).await.unwrap();
  assert_eq!(mine.len(), 1);

  s.delete_review(review.review_id).await.unwrap();
  assert!(s.get_review(review.review_id).await.unwrap().is_none());
  let err = s.delete_review(review.review_id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::ReviewNotFound(_)));
}

#[tokio::test]
async fn review_rating_out_of_range_rejected() {
  let s = store().await;
  let u = user(&s, "u").await;
  let err = s.create_review(review_of(u.user_id, 11, matrix())).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn review_by_missing_author_rejected() {
  let s = store().await;
  let err = s.create_review(review_of(Uuid::new_v4(), 5, matrix())).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(_)));
}

// ─── Activities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn own_feed_is_newest_first() {
  let s = store().await;
  let u = user(&s, "u").await;
  let v = user(&s, "v").await;

  let review = s.create_review(review_of(u.user_id, 7, matrix())).await.unwrap();
  s.record_activity(NewActivity::review(&review)).await.unwrap();

  let list = s
    .create_list(NewList { owner_id: u.user_id, name: "Watchlist".into(), description: None })
    .await
    .unwrap();
  let addition = s.add_movie_to_list(list.list_id, titanic()).await.unwrap();
  s.record_activity(NewActivity::add_to_list(&addition)).await.unwrap();

  s.follow(u.user_id, v.user_id).await.unwrap();
  s.record_activity(NewActivity::follow(u.user_id, v.user_id)).await.unwrap();

  let feed = s.own_feed(u.user_id).await.unwrap();
  let kinds: Vec<_> = feed.iter().map(|a| a.kind.discriminant()).collect();
  assert_eq!(kinds, ["follow", "add_to_list", "review"]);
}

#[tokio::test]
async fn add_to_list_activity_embeds_movie() {
  let s = store().await;
  let u = user(&s, "u1").await;
  let list = s
    .create_list(NewList { owner_id: u.user_id, name: "Watchlist".into(), description: None })
    .await
    .unwrap();
  let addition = s.add_movie_to_list(list.list_id, titanic()).await.unwrap();
  s.record_activity(NewActivity::add_to_list(&addition)).await.unwrap();

  let feed = s.own_feed(u.user_id).await.unwrap();
  assert_eq!(feed.len(), 1);
  assert!(matches!(
    &feed[0].kind,
    ActivityKind::AddToList { list, .. } if list.movie.external_id == 597 && list.name == "Watchlist"
  ));
}

#[tokio::test]
async fn aggregate_feed_merges_followees() {
  let s = store().await;
  let u = user(&s, "u").await;
  let v = user(&s, "v").await;
  let stranger = user(&s, "w").await;

  s.follow(u.user_id, v.user_id).await.unwrap();

  let v_review = s.create_review(review_of(v.user_id, 6, matrix())).await.unwrap();
  s.record_activity(NewActivity::review(&v_review)).await.unwrap();
  let w_review = s.create_review(review_of(stranger.user_id, 2, matrix())).await.unwrap();
  s.record_activity(NewActivity::review(&w_review)).await.unwrap();
  let u_review = s.create_review(review_of(u.user_id, 9, titanic())).await.unwrap();
  s.record_activity(NewActivity::review(&u_review)).await.unwrap();

  let feed = s.aggregate_feed(u.user_id).await.unwrap();
  let owners: Vec<_> = feed.iter().map(|a| a.owner_id).collect();
  assert_eq!(owners, [u.user_id, v.user_id]);
}

#[tokio::test]
async fn equal_timestamps_break_ties_by_sequence() {
  let s = store().await;
  let u = user(&s, "u").await;
  let at = Utc::now();

  let first = s
    .record_activity_at(NewActivity::follow(u.user_id, Uuid::new_v4()), at)
    .await
    .unwrap();
  let second = s
    .record_activity_at(NewActivity::follow(u.user_id, Uuid::new_v4()), at)
    .await
    .unwrap();
  assert!(second.sequence > first.sequence);

  let feed = s.own_feed(u.user_id).await.unwrap();
  let ids: Vec<_> = feed.iter().map(|a| a.activity_id).collect();
  assert_eq!(ids, [second.activity_id, first.activity_id]);
}

#[tokio::test]
async fn snapshot_survives_review_edit() {
  let s = store().await;
  let u = user(&s, "u").await;

  let review = s.create_review(review_of(u.user_id, 4, matrix())).await.unwrap();
  s.record_activity(NewActivity::review(&review)).await.unwrap();
  s.update_review(review.review_id, ReviewUpdate { rating: Some(10), ..Default::default() })
    .await
    .unwrap();

  let feed = s.own_feed(u.user_id).await.unwrap();
  assert!(matches!(
    &feed[0].kind,
    ActivityKind::Review { snapshot, .. } if snapshot.rating == 4
  ));
}

#[tokio::test]
async fn expired_activities_hidden_and_purged() {
  let s = store().await;
  let u = user(&s, "u").await;
  let now = Utc::now();

  s.record_activity_at(NewActivity::follow(u.user_id, Uuid::new_v4()), now - Duration::days(41))
    .await
    .unwrap();
  s.record_activity_at(NewActivity::follow(u.user_id, Uuid::new_v4()), now - Duration::days(1))
    .await
    .unwrap();

  assert_eq!(s.own_feed(u.user_id).await.unwrap().len(), 1);

  let removed = s.purge_expired(now).await.unwrap();
  assert_eq!(removed, 1);
  assert_eq!(s.purge_expired(now).await.unwrap(), 0);

  let removed_later = s.purge_expired(now + Duration::days(40)).await.unwrap();
  assert_eq!(removed_later, 1);
}

#[tokio::test]
async fn all_activities_spans_owners_and_skips_expired() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let now = Utc::now();

  s.record_activity_at(NewActivity::follow(a.user_id, b.user_id), now - Duration::days(41))
    .await
    .unwrap();
  let older = s
    .record_activity_at(NewActivity::follow(a.user_id, b.user_id), now - Duration::hours(2))
    .await
    .unwrap();
  let newer = s
    .record_activity_at(NewActivity::follow(b.user_id, a.user_id), now - Duration::hours(1))
    .await
    .unwrap();

  let all = s.all_activities().await.unwrap();
  let ids: Vec<Uuid> = all.iter().map(|act| act.activity_id).collect();
  assert_eq!(ids, [newer.activity_id, older.activity_id]);
  assert_eq!(all[0].owner_id, b.user_id);
}

#[tokio::test]
async fn feeds_of_missing_user_rejected() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s.own_feed(ghost).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(id) if id == ghost));
  let err = s.aggregate_feed(ghost).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UserNotFound(_)));
}

#[tokio::test]
async fn followee_review_is_the_whole_aggregate_feed() {
  let s = store().await;
  let u1 = user(&s, "u1").await;
  let u2 = user(&s, "u2").await;
  s.follow(u1.user_id, u2.user_id).await.unwrap();

  let review = s.create_review(review_of(u2.user_id, 8, matrix())).await.unwrap();
  s.record_activity(NewActivity::review(&review)).await.unwrap();

  let feed = s.aggregate_feed(u1.user_id).await.unwrap();
  assert_eq!(feed.len(), 1);
  assert!(matches!(
    &feed[0].kind,
    ActivityKind::Review { snapshot, .. } if snapshot.rating == 8 && snapshot.movie_external_id == 603
  ));
}
