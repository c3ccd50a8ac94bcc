//! Identity — a registered user account and its place in the follow graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Avatar reference assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR: &str = "/default-profile.png";

/// A registered user as seen by other users. The credential hash never leaves
/// the store through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub user_id:      Uuid,
  pub username:     String,
  pub display_name: String,
  pub email:        String,
  pub avatar:       String,
  pub created_at:   DateTime<Utc>,
  /// Identities this user follows, in the order the follows happened.
  pub following:    Vec<Uuid>,
  /// Identities following this user, in the order the follows happened.
  pub followers:    Vec<Uuid>,
}

/// The slice of an [`Identity`] returned when listing many users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
  pub user_id:      Uuid,
  pub username:     String,
  pub display_name: String,
  pub avatar:       String,
}

impl From<&Identity> for IdentitySummary {
  fn from(i: &Identity) -> Self {
    Self {
      user_id:      i.user_id,
      username:     i.username.clone(),
      display_name: i.display_name.clone(),
      avatar:       i.avatar.clone(),
    }
  }
}

/// Stored login material for one username.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user_id:       Uuid,
  pub username:      String,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// Input to [`crate::store::SocialStore::create_identity`].
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub username:      String,
  pub display_name:  String,
  pub email:         String,
  pub password_hash: String,
  pub avatar:        Option<String>,
}

impl NewIdentity {
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::InvalidInput("username must not be empty".into()));
    }
    if self.display_name.trim().is_empty() {
      return Err(Error::InvalidInput("name must not be empty".into()));
    }
    if self.email.trim().is_empty() {
      return Err(Error::InvalidInput("email must not be empty".into()));
    }
    Ok(())
  }
}
