//! Daily check-in with streaks.

use serde::Serialize;

use crate::{
  activity::{Activity, AwardResult},
  entity::{attendance, attendance_day, user},
  level::Exp,
  prelude::*,
  settings::SettingsProvider,
  sv,
};

/// Every this many consecutive days the streak bonus is paid on top.
pub const STREAK_PERIOD: i32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
  /// false when today was already checked in
  pub checked_in: bool,
  pub streak: i32,
  pub exp_awarded: Exp,
  pub awards: Vec<AwardResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMark {
  pub date: Date,
  pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceState {
  pub can_check_today: bool,
  pub current_streak: i32,
  pub last_attendance: Option<Date>,
  /// Monday to Sunday of the current week
  pub week: Vec<DayMark>,
}

pub struct Attendance<'a> {
  db: &'a DatabaseConnection,
  settings: &'a SettingsProvider,
}

impl<'a> Attendance<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    settings: &'a SettingsProvider,
  ) -> Self {
    Self { db, settings }
  }

  pub async fn check_in(&self, user_id: &str, today: Date) -> Result<CheckIn> {
    let txn = self.db.begin().await?;

    if user::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
      return Err(Error::UserNotFound);
    }

    let row = attendance::Entity::find_by_id(user_id).one(&txn).await?;
    let streak = match row {
      Some(row) if row.last_date >= today => {
        return Ok(CheckIn {
          checked_in: false,
          streak: row.streak,
          exp_awarded: 0,
          awards: Vec::new(),
        });
      }
      Some(row) => {
        let streak = if row.last_date == utils::yesterday(today) {
          row.streak + 1
        } else {
          1
        };

        attendance::ActiveModel {
          streak: Set(streak),
          last_date: Set(today),
          ..row.into()
        }
        .update(&txn)
        .await?;
        streak
      }
      None => {
        attendance::ActiveModel {
          user_id: Set(user_id.to_string()),
          streak: Set(1),
          last_date: Set(today),
        }
        .insert(&txn)
        .await?;
        1
      }
    };

    attendance_day::ActiveModel {
      user_id: Set(user_id.to_string()),
      date: Set(today),
    }
    .insert(&txn)
    .await?;

    // the day only counts once its experience is in
    let experience = sv::Experience::new(&txn, self.settings);
    let mut awards =
      vec![experience.award_on(user_id, Activity::Attendance, today).await?];
    if streak % STREAK_PERIOD == 0 {
      awards.push(
        experience
          .award_on(user_id, Activity::AttendanceStreak, today)
          .await?,
      );
    }

    txn.commit().await?;
    info!("User {user_id} checked in, streak {streak}");

    Ok(CheckIn {
      checked_in: true,
      streak,
      exp_awarded: awards.iter().map(|a| a.exp_awarded).sum(),
      awards,
    })
  }

  pub async fn state(
    &self,
    user_id: &str,
    today: Date,
  ) -> Result<AttendanceState> {
    sv::User::new(self.db).get(user_id).await?;

    let week = utils::week_of(today);
    let attended: Vec<Date> = attendance_day::Entity::find()
      .filter(attendance_day::Column::UserId.eq(user_id))
      .filter(attendance_day::Column::Date.between(week[0], week[6]))
      .all(self.db)
      .await?
      .into_iter()
      .map(|day| day.date)
      .collect();

    let week = week
      .into_iter()
      .map(|date| DayMark { date, attended: attended.contains(&date) })
      .collect();

    let row = attendance::Entity::find_by_id(user_id).one(self.db).await?;

    Ok(match row {
      Some(row) => AttendanceState {
        can_check_today: row.last_date < today,
        // a streak that missed yesterday is already over
        current_streak: if row.last_date >= utils::yesterday(today) {
          row.streak
        } else {
          0
        },
        last_attendance: Some(row.last_date),
        week,
      },
      None => AttendanceState {
        can_check_today: true,
        current_streak: 0,
        last_attendance: None,
        week,
      },
    })
  }
}
