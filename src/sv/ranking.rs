use sea_orm::{Condition, JoinType, RelationTrait};
use serde::Serialize;

use crate::{
  entity::{stats, user},
  level::{Exp, Level},
  prelude::*,
  sv::user::stats_of,
};

/// Which users a ranking compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
  Global,
  School(String),
  Region { sido: String, sigungu: Option<String> },
}

impl Scope {
  fn condition(&self) -> Condition {
    match self {
      Scope::Global => Condition::all(),
      Scope::School(id) => Condition::all().add(user::Column::SchoolId.eq(id)),
      Scope::Region { sido, sigungu } => {
        let cond = Condition::all().add(user::Column::Sido.eq(sido));
        match sigungu {
          Some(sigungu) => cond.add(user::Column::Sigungu.eq(sigungu)),
          None => cond,
        }
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
  pub rank: u64,
  pub user_id: String,
  pub username: Option<String>,
  pub school_id: Option<String>,
  pub level: Level,
  pub total_experience: Exp,
}

pub struct Ranking<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Ranking<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Users in `scope` by lifetime experience, highest first.
  pub async fn top(&self, scope: &Scope, limit: u64) -> Result<Vec<RankEntry>> {
    let rows = stats::Entity::find()
      .find_also_related(user::Entity)
      .filter(scope.condition())
      .order_by_desc(stats::Column::TotalExperience)
      .order_by_asc(stats::Column::UserId)
      .limit(limit)
      .all(self.db)
      .await?;

    Ok(
      rows
        .into_iter()
        .zip(1..)
        .map(|((stats, user), rank)| RankEntry {
          rank,
          username: user.as_ref().and_then(|u| u.username.clone()),
          school_id: user.and_then(|u| u.school_id),
          user_id: stats.user_id,
          level: stats.level,
          total_experience: stats.total_experience,
        })
        .collect(),
    )
  }

  /// One more than the number of users in `scope` with strictly more
  /// experience, so ties share a rank.
  pub async fn rank_of(&self, user_id: &str, scope: &Scope) -> Result<u64> {
    let total = stats_of(self.db, user_id).await?.total_experience;

    let ahead = stats::Entity::find()
      .join(JoinType::InnerJoin, stats::Relation::User.def())
      .filter(scope.condition())
      .filter(stats::Column::TotalExperience.gt(total))
      .count(self.db)
      .await?;

    Ok(ahead + 1)
  }
}
