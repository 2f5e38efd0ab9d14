use sea_orm::ConnectionTrait;
use serde::Deserialize;

use crate::{
  entity::{stats, user},
  level,
  prelude::*,
};

/// Profile fields owned by the community side of the app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
  pub username: Option<String>,
  pub school_id: Option<String>,
  pub sido: Option<String>,
  pub sigungu: Option<String>,
}

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Creates the user with fresh level progress, or refreshes the profile
  /// of an existing one. Progress is never touched for existing users.
  pub async fn register(
    &self,
    id: &str,
    profile: Profile,
  ) -> Result<user::Model> {
    let txn = self.db.begin().await?;
    let now = utils::now();
    let Profile { username, school_id, sido, sigungu } = profile;

    let user = match user::Entity::find_by_id(id).one(&txn).await? {
      Some(user) => {
        user::ActiveModel {
          username: Set(username),
          school_id: Set(school_id),
          sido: Set(sido),
          sigungu: Set(sigungu),
          ..user.into()
        }
        .update(&txn)
        .await?
      }
      None => {
        let user = user::ActiveModel {
          id: Set(id.to_string()),
          username: Set(username),
          school_id: Set(school_id),
          sido: Set(sido),
          sigungu: Set(sigungu),
          created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        new_stats(id).insert(&txn).await?;
        info!("Registered user {id}");
        user
      }
    };

    txn.commit().await?;
    Ok(user)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn get(&self, id: &str) -> Result<user::Model> {
    self.by_id(id).await?.ok_or(Error::UserNotFound)
  }
}

fn new_stats(user_id: &str) -> stats::ActiveModel {
  stats::ActiveModel {
    user_id: Set(user_id.to_string()),
    level: Set(1),
    current_exp: Set(0),
    current_level_required_xp: Set(level::required_exp(1)),
    total_experience: Set(0),
    updated_at: Set(utils::now()),
  }
}

/// Progress of an existing user, created on first use for users whose
/// progress row is missing.
pub(crate) async fn stats_of<C: ConnectionTrait>(
  db: &C,
  user_id: &str,
) -> Result<stats::Model> {
  if let Some(stats) = stats::Entity::find_by_id(user_id).one(db).await? {
    return Ok(stats);
  }

  if user::Entity::find_by_id(user_id).one(db).await?.is_none() {
    return Err(Error::UserNotFound);
  }

  Ok(new_stats(user_id).insert(db).await?)
}
