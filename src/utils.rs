use chrono::{Local, TimeDelta};

use crate::prelude::*;

/// Calendar day as seen by the server, used for daily limits and attendance.
pub fn today() -> Date {
  Local::now().date_naive()
}

pub fn now() -> DateTime {
  Utc::now().naive_utc()
}

pub fn yesterday(date: Date) -> Date {
  date - TimeDelta::days(1)
}

/// Monday to Sunday of the week containing `date`.
pub fn week_of(date: Date) -> [Date; 7] {
  let monday =
    date - TimeDelta::days(date.weekday().num_days_from_monday() as i64);
  std::array::from_fn(|i| monday + TimeDelta::days(i as i64))
}

#[cfg(test)]
pub async fn test_db() -> DatabaseConnection {
  use migration::{Migrator, MigratorTrait};

  let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
  Migrator::up(&db, None).await.unwrap();
  db
}

/// Makes every later write to `user_stats` fail, until allowed again.
#[cfg(test)]
pub async fn fail_stats_updates(db: &DatabaseConnection) {
  use sea_orm::ConnectionTrait;

  db.execute_unprepared(
    "CREATE TRIGGER stats_locked BEFORE UPDATE ON user_stats \
     BEGIN SELECT RAISE(ABORT, 'user_stats is locked'); END",
  )
  .await
  .unwrap();
}

#[cfg(test)]
pub async fn allow_stats_updates(db: &DatabaseConnection) {
  use sea_orm::ConnectionTrait;

  db.execute_unprepared("DROP TRIGGER stats_locked").await.unwrap();
}

#[cfg(test)]
pub fn date(y: i32, m: u32, d: u32) -> Date {
  Date::from_ymd_opt(y, m, d).unwrap()
}
