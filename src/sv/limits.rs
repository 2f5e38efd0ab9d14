use sea_orm::{ConnectionTrait, sea_query::{Expr, SimpleExpr}};
use serde::Serialize;

use crate::{
  activity::{Activity, LimitKind, Rejection},
  entity::limits::{self, Column, DailyCounts},
  prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitCheck {
  pub allowed: bool,
  pub current: i32,
  pub limit: i32,
}

/// Daily activity counters. Works on a plain connection or inside the
/// transaction of an award.
pub struct Limits<'a, C = DatabaseConnection> {
  db: &'a C,
}

impl<'a, C: ConnectionTrait> Limits<'a, C> {
  pub fn new(db: &'a C) -> Self {
    Self { db }
  }

  /// Counts for `today`; a row last touched on another day reads as zero.
  pub async fn counts(
    &self,
    user_id: &str,
    today: Date,
  ) -> Result<DailyCounts> {
    Ok(
      limits::Entity::find_by_id(user_id)
        .one(self.db)
        .await?
        .map(|row| row.counts_on(today))
        .unwrap_or_default(),
    )
  }

  pub async fn check(
    &self,
    user_id: &str,
    kind: LimitKind,
    limit: i32,
    today: Date,
  ) -> Result<LimitCheck> {
    let current = self.counts(user_id, today).await?.get(kind);
    Ok(LimitCheck { allowed: current < limit, current, limit })
  }

  /// Takes one slot of today's allowance for `activity`.
  ///
  /// The increment is a single conditional update, so two requests racing
  /// for the last slot cannot both win. A stale row is zeroed first; callers
  /// run this in a transaction and roll back on rejection, which leaves the
  /// stored row untouched.
  pub async fn claim(
    &self,
    user_id: &str,
    activity: &Activity,
    limit: i32,
    today: Date,
  ) -> Result<Result<(), Rejection>> {
    let (kind, column) = match *activity {
      Activity::Post => (LimitKind::Posts, Column::Posts),
      Activity::Comment => (LimitKind::Comments, Column::Comments),
      Activity::Game { game, .. } => {
        (LimitKind::Games, limits::game_column(game))
      }
      Activity::Like
      | Activity::Attendance
      | Activity::AttendanceStreak
      | Activity::Referral => return Ok(Ok(())),
    };

    self.roll_over(user_id, today).await?;

    let claimed = limits::Entity::update_many()
      .col_expr(column, Expr::col(column).add(1))
      .filter(Column::UserId.eq(user_id))
      .filter(Column::LastResetDate.eq(today))
      .filter(Expr::expr(count_of(kind)).lt(limit))
      .exec(self.db)
      .await?;

    if claimed.rows_affected == 0 {
      let check = self.check(user_id, kind, limit, today).await?;
      return Ok(Err(Rejection::DailyLimit {
        current: check.current,
        limit: check.limit,
      }));
    }

    Ok(Ok(()))
  }

  /// Makes sure the user has a row stamped with `today`.
  async fn roll_over(&self, user_id: &str, today: Date) -> Result<()> {
    let Some(row) = limits::Entity::find_by_id(user_id).one(self.db).await?
    else {
      limits::ActiveModel {
        user_id: Set(user_id.to_string()),
        last_reset_date: Set(today),
        posts: Set(0),
        comments: Set(0),
        flappy_bird: Set(0),
        reaction_game: Set(0),
        tile_game: Set(0),
      }
      .insert(self.db)
      .await?;
      return Ok(());
    };

    if row.last_reset_date != today {
      limits::ActiveModel {
        last_reset_date: Set(today),
        posts: Set(0),
        comments: Set(0),
        flappy_bird: Set(0),
        reaction_game: Set(0),
        tile_game: Set(0),
        ..row.into()
      }
      .update(self.db)
      .await?;
    }

    Ok(())
  }
}

fn count_of(kind: LimitKind) -> SimpleExpr {
  match kind {
    LimitKind::Posts => Expr::col(Column::Posts).into(),
    LimitKind::Comments => Expr::col(Column::Comments).into(),
    LimitKind::Games => Expr::col(Column::FlappyBird).add(
      Expr::col(Column::ReactionGame).add(Expr::col(Column::TileGame)),
    ),
  }
}
