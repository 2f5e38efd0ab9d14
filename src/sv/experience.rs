//! Turns activities into experience.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::{
  activity::{Activity, AwardResult},
  entity::stats,
  level::{self, Exp, Level, LevelProgress},
  prelude::*,
  settings::SettingsProvider,
  sv::{self, user::stats_of},
};

/// Level progress as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
  pub level: Level,
  pub current_exp: Exp,
  pub required_exp: Exp,
  pub exp_to_next: Exp,
  pub percentage: u8,
  pub total_experience: Exp,
}

impl From<&stats::Model> for ProgressView {
  fn from(stats: &stats::Model) -> Self {
    let required = if stats.current_level_required_xp > 0 {
      stats.current_level_required_xp
    } else {
      level::required_exp(stats.level)
    };

    Self {
      level: stats.level,
      current_exp: stats.current_exp,
      required_exp: required,
      exp_to_next: (required - stats.current_exp).max(0),
      percentage: (stats.current_exp * 100 / required).clamp(0, 100) as u8,
      total_experience: stats.total_experience,
    }
  }
}

/// Awards and level progress. On a transaction, each award runs in a
/// savepoint and lands with the enclosing commit.
pub struct Experience<'a, C = DatabaseConnection> {
  db: &'a C,
  settings: &'a SettingsProvider,
}

impl<'a, C: ConnectionTrait + TransactionTrait> Experience<'a, C> {
  pub fn new(db: &'a C, settings: &'a SettingsProvider) -> Self {
    Self { db, settings }
  }

  pub async fn award(
    &self,
    user_id: &str,
    activity: Activity,
  ) -> Result<AwardResult> {
    self.award_on(user_id, activity, utils::today()).await
  }

  /// Awards `activity` as if it happened on `today`.
  ///
  /// Policy refusals come back as a rejected [`AwardResult`] with nothing
  /// written. The counter slot, the experience and the level change are
  /// committed together or not at all.
  pub async fn award_on(
    &self,
    user_id: &str,
    activity: Activity,
    today: Date,
  ) -> Result<AwardResult> {
    let settings = self.settings.get(self.db).await?;

    let exp = match settings.reward_for(&activity) {
      Ok(exp) => exp,
      Err(rejection) => {
        debug!("Rejected {:?} for {user_id}: {rejection}", activity.kind());
        return Ok(rejection.into());
      }
    };

    let txn = self.db.begin().await?;

    // read first so that an unknown user is an error, not a counter row
    let stats = stats_of(&txn, user_id).await?;

    if let Some(kind) = activity.limit() {
      let limit = settings.limit_for(kind);
      let claim =
        sv::Limits::new(&txn).claim(user_id, &activity, limit, today).await?;

      if let Err(rejection) = claim {
        txn.rollback().await?;
        debug!("Rejected {:?} for {user_id}: {rejection}", activity.kind());
        return Ok(rejection.into());
      }
    }

    let old_level = stats.level;
    let (Some(total), Some(current)) = (
      stats.total_experience.checked_add(exp),
      stats.current_exp.checked_add(exp),
    ) else {
      return Err(Error::Internal(format!(
        "experience of {user_id} overflows at {} + {exp}",
        stats.total_experience
      )));
    };
    let up = level::apply_level_up(
      stats.level,
      current,
      stats.current_level_required_xp,
    );

    stats::ActiveModel {
      level: Set(up.level),
      current_exp: Set(up.current_exp),
      current_level_required_xp: Set(up.required_exp),
      total_experience: Set(total),
      updated_at: Set(utils::now()),
      ..stats.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    if up.leveled_up {
      info!("User {user_id} leveled up: {old_level} -> {}", up.level);
    }
    debug!(
      "Awarded {exp} exp to {user_id} for {:?} (total {total})",
      activity.kind()
    );

    Ok(AwardResult::granted(exp, old_level, up.level))
  }

  pub async fn progress(&self, user_id: &str) -> Result<ProgressView> {
    Ok(ProgressView::from(&stats_of(self.db, user_id).await?))
  }

  /// Rebuilds level and in-level experience from the lifetime total, for
  /// records written before progress was tracked incrementally.
  pub async fn sync(&self, user_id: &str) -> Result<ProgressView> {
    let stats = stats_of(self.db, user_id).await?;
    let LevelProgress { level, current_exp, required_exp, .. } =
      level::progress_within(stats.total_experience);

    let stats = stats::ActiveModel {
      level: Set(level),
      current_exp: Set(current_exp),
      current_level_required_xp: Set(required_exp),
      updated_at: Set(utils::now()),
      ..stats.into()
    }
    .update(self.db)
    .await?;

    info!(
      "Synced {user_id}: level {level}, {current_exp}/{required_exp} \
       (total {})",
      stats.total_experience
    );

    Ok(ProgressView::from(&stats))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    activity::{GameType, Rejection},
    entity::limits,
    settings::{ExperienceSettings, GameRewards, Threshold},
    sv::user::Profile,
    utils::{allow_stats_updates, date, fail_stats_updates, test_db},
  };

  fn today() -> Date {
    date(2026, 10, 16)
  }

  async fn setup() -> (DatabaseConnection, SettingsProvider) {
    let db = test_db().await;
    sv::User::new(&db).register("u", Profile::default()).await.unwrap();
    (db, SettingsProvider::new())
  }

  fn game(game: GameType, score: f64) -> Activity {
    Activity::Game { game, score }
  }

  #[tokio::test]
  async fn post_awards_configured_exp() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let res = sv.award_on("u", Activity::Post, today()).await.unwrap();
    assert_eq!(res, AwardResult::granted(10, 1, 2));
    assert!(res.leveled_up);

    let progress = sv.progress("u").await.unwrap();
    assert_eq!(progress.level, 2);
    assert_eq!(progress.current_exp, 0);
    assert_eq!(progress.required_exp, 20);
    assert_eq!(progress.total_experience, 10);
  }

  #[tokio::test]
  async fn fourth_post_is_rejected() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    for _ in 0..3 {
      assert!(sv.award_on("u", Activity::Post, today()).await.unwrap().success);
    }
    let before = sv.progress("u").await.unwrap();

    let res = sv.award_on("u", Activity::Post, today()).await.unwrap();
    assert!(!res.success);
    assert_eq!(res.exp_awarded, 0);
    assert!(res.reason.as_deref().unwrap().contains("3/3"));

    assert_eq!(sv.progress("u").await.unwrap(), before);
    assert_eq!(before.total_experience, 30);
  }

  #[tokio::test]
  async fn yesterdays_posts_do_not_count() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);
    let yesterday = utils::yesterday(today());

    for _ in 0..3 {
      sv.award_on("u", Activity::Post, yesterday).await.unwrap();
    }
    let res = sv.award_on("u", Activity::Post, yesterday).await.unwrap();
    assert!(!res.success);

    let res = sv.award_on("u", Activity::Post, today()).await.unwrap();
    assert!(res.success);

    let row = limits::Entity::find_by_id("u").one(&db).await.unwrap().unwrap();
    assert_eq!((row.last_reset_date, row.posts), (today(), 1));
  }

  #[tokio::test]
  async fn game_award_uses_highest_threshold() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let res = sv
      .award_on("u", game(GameType::ReactionGame, 250.0), today())
      .await
      .unwrap();
    assert!(res.success);
    assert_eq!(res.exp_awarded, 10);

    let counts = sv::Limits::new(&db).counts("u", today()).await.unwrap();
    assert_eq!(counts.games.reaction_game, 1);
    assert_eq!(counts.posts, 0);
  }

  #[tokio::test]
  async fn low_score_is_rejected_without_using_a_play() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let res = sv
      .award_on("u", game(GameType::TileGame, 10.0), today())
      .await
      .unwrap();
    assert_eq!(res, AwardResult::rejected(Rejection::BelowThreshold));

    let counts = sv::Limits::new(&db).counts("u", today()).await.unwrap();
    assert_eq!(counts.games.total(), 0);
  }

  #[tokio::test]
  async fn games_are_capped_across_types() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let plays = [
      game(GameType::FlappyBird, 30.0),
      game(GameType::ReactionGame, 300.0),
      game(GameType::TileGame, 150.0),
      game(GameType::FlappyBird, 11.0),
      game(GameType::TileGame, 60.0),
    ];
    for play in plays {
      assert!(sv.award_on("u", play, today()).await.unwrap().success);
    }

    let res = sv
      .award_on("u", game(GameType::ReactionGame, 999.0), today())
      .await
      .unwrap();
    assert!(!res.success);
    assert!(res.reason.unwrap().contains("5/5"));
  }

  #[tokio::test]
  async fn uncapped_activities_keep_paying() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    for _ in 0..20 {
      assert!(sv.award_on("u", Activity::Like, today()).await.unwrap().success);
    }
    assert_eq!(sv.progress("u").await.unwrap().total_experience, 20);
  }

  #[tokio::test]
  async fn referral_jumps_several_levels() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    sv.award_on("u", Activity::Like, today()).await.unwrap();
    let res = sv.award_on("u", Activity::Referral, today()).await.unwrap();

    // 51 exp: 10 + 20 leaves 21 of the 30 needed at level 3
    assert_eq!(res, AwardResult::granted(50, 1, 3));
    let progress = sv.progress("u").await.unwrap();
    assert_eq!((progress.current_exp, progress.required_exp), (21, 30));
  }

  #[tokio::test]
  async fn total_is_sum_of_awards() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let activities = [
      Activity::Post,
      Activity::Comment,
      Activity::Referral,
      Activity::Post,
      Activity::Attendance,
      Activity::Post,
      Activity::Post,
      game(GameType::TileGame, 1.0),
      Activity::AttendanceStreak,
    ];

    let mut awarded = 0;
    let mut last_total = 0;
    for activity in activities {
      let res = sv.award_on("u", activity, today()).await.unwrap();
      awarded += res.exp_awarded;

      let total = sv.progress("u").await.unwrap().total_experience;
      assert!(total >= last_total);
      last_total = total;
    }

    assert_eq!(last_total, awarded);
    assert_eq!(awarded, 10 + 5 + 50 + 10 + 5 + 10 + 10);
  }

  #[tokio::test]
  async fn unknown_user_is_an_error() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let res = sv.award_on("ghost", Activity::Post, today()).await;
    assert!(matches!(res, Err(Error::UserNotFound)));
    let row = limits::Entity::find_by_id("ghost").one(&db).await.unwrap();
    assert!(row.is_none());
  }

  #[tokio::test]
  async fn storage_fault_undoes_the_claim() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);
    let yesterday = utils::yesterday(today());

    sv.award_on("u", Activity::Post, yesterday).await.unwrap();
    let counters = limits::Entity::find_by_id("u").one(&db).await.unwrap();
    let before = sv.progress("u").await.unwrap();

    fail_stats_updates(&db).await;
    let res = sv.award_on("u", Activity::Post, today()).await;
    assert!(matches!(res, Err(Error::Database(_))));

    // neither the roll-over nor the slot survived
    let after = limits::Entity::find_by_id("u").one(&db).await.unwrap();
    assert_eq!(after, counters);
    assert_eq!(after.unwrap().last_reset_date, yesterday);
    assert_eq!(sv.progress("u").await.unwrap(), before);

    allow_stats_updates(&db).await;
    assert!(sv.award_on("u", Activity::Post, today()).await.unwrap().success);
  }

  #[tokio::test]
  async fn overflowing_total_is_refused() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    stats::ActiveModel {
      total_experience: Set(Exp::MAX - 5),
      ..stats_of(&db, "u").await.unwrap().into()
    }
    .update(&db)
    .await
    .unwrap();

    let res = sv.award_on("u", Activity::Post, today()).await;
    assert!(matches!(res, Err(Error::Internal(_))));

    let counts = sv::Limits::new(&db).counts("u", today()).await.unwrap();
    assert_eq!(counts.posts, 0);
    let total = sv.progress("u").await.unwrap().total_experience;
    assert_eq!(total, Exp::MAX - 5);
  }

  #[tokio::test]
  async fn settings_change_after_invalidate() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let res = sv.award_on("u", Activity::Comment, today()).await.unwrap();
    assert_eq!(res.exp_awarded, 5);

    let mut changed = ExperienceSettings::default();
    changed.rewards.comment = 7;
    changed.games.flappy_bird =
      GameRewards { thresholds: vec![Threshold::new(0.0, 3)] };
    sv::Settings::new(&db).store(&changed).await.unwrap();
    settings.invalidate().await;

    let res = sv.award_on("u", Activity::Comment, today()).await.unwrap();
    assert_eq!(res.exp_awarded, 7);
    let res = sv
      .award_on("u", game(GameType::FlappyBird, 0.0), today())
      .await
      .unwrap();
    assert_eq!(res.exp_awarded, 3);
  }

  #[tokio::test]
  async fn sync_rebuilds_from_total() {
    let (db, settings) = setup().await;
    let sv = Experience::new(&db, &settings);

    let stats = stats_of(&db, "u").await.unwrap();
    stats::ActiveModel {
      level: Set(1),
      current_exp: Set(0),
      current_level_required_xp: Set(0),
      total_experience: Set(475),
      ..stats.into()
    }
    .update(&db)
    .await
    .unwrap();

    let view = sv.sync("u").await.unwrap();
    assert_eq!(view, ProgressView {
      level: 10,
      current_exp: 25,
      required_exp: 100,
      exp_to_next: 75,
      percentage: 25,
      total_experience: 475,
    });
    assert_eq!(sv.progress("u").await.unwrap(), view);
  }
}
