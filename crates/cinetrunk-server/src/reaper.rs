//! Background removal of expired activities.
//!
//! Feeds already hide expired rows; the reaper only reclaims their storage.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use cinetrunk_core::store::SocialStore;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Run [`sweep`] every `every`, starting immediately.
pub fn spawn<S>(store: Arc<S>, every: Duration) -> JoinHandle<()>
where
  S: SocialStore + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      sweep(store.as_ref()).await;
    }
  })
}

/// Purge everything expired as of now. Returns the number of rows removed;
/// failures are logged and count as zero.
pub async fn sweep<S: SocialStore>(store: &S) -> usize {
  match store.purge_expired(Utc::now()).await {
    Ok(removed) => {
      tracing::debug!(removed, "expired activities purged");
      removed
    }
    Err(e) => {
      tracing::warn!(error = %e, "activity expiry sweep failed");
      0
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::Duration as ChronoDuration;
  use cinetrunk_core::{activity::NewActivity, identity::NewIdentity};
  use cinetrunk_store_sqlite::SqliteStore;
  use uuid::Uuid;

  async fn store_with_user() -> (SqliteStore, Uuid) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let user = store
      .create_identity(NewIdentity {
        username:      "u".into(),
        display_name:  "U".into(),
        email:         "u@example.com".into(),
        password_hash: "x".into(),
        avatar:        None,
      })
      .await
      .unwrap();
    (store, user.user_id)
  }

  #[tokio::test]
  async fn sweep_removes_only_expired() {
    let (store, user) = store_with_user().await;
    let old = Utc::now() - ChronoDuration::days(45);
    store
      .record_activity_at(NewActivity::follow(user, Uuid::new_v4()), old)
      .await
      .unwrap();
    store
      .record_activity(NewActivity::follow(user, Uuid::new_v4()))
      .await
      .unwrap();

    assert_eq!(sweep(&store).await, 1);
    assert_eq!(sweep(&store).await, 0);
    assert_eq!(store.own_feed(user).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn spawned_reaper_sweeps_on_first_tick() {
    let (store, user) = store_with_user().await;
    let old = Utc::now() - ChronoDuration::days(41);
    store
      .record_activity_at(NewActivity::follow(user, Uuid::new_v4()), old)
      .await
      .unwrap();

    let store  = Arc::new(store);
    let handle = spawn(store.clone(), Duration::from_secs(3600));
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 0);
  }
}
