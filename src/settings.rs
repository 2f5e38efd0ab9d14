//! Tunable experience policy and the cache it is served from.

use std::sync::Arc;

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
  activity::{Activity, GameType, LimitKind, Rejection},
  level::Exp,
  prelude::*,
  sv,
};

/// Largest experience a single award may grant.
pub const MAX_REWARD: Exp = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
  pub post: Exp,
  pub comment: Exp,
  pub like: Exp,
  pub attendance: Exp,
  pub attendance_streak: Exp,
  pub referral: Exp,
}

impl Default for Rewards {
  fn default() -> Self {
    Self {
      post: 10,
      comment: 5,
      like: 1,
      attendance: 5,
      attendance_streak: 10,
      referral: 50,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyLimits {
  pub posts: i32,
  pub comments: i32,
  pub games: i32,
}

impl Default for DailyLimits {
  fn default() -> Self {
    Self { posts: 3, comments: 5, games: 5 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
  pub min_score: f64,
  pub xp_reward: Exp,
}

impl Threshold {
  pub fn new(min_score: f64, xp_reward: Exp) -> Self {
    Self { min_score, xp_reward }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRewards {
  pub thresholds: Vec<Threshold>,
}

impl GameRewards {
  /// Largest reward among the thresholds `score` reaches, whatever order
  /// they are listed in.
  pub fn reward_for(&self, score: f64) -> Option<Exp> {
    self
      .thresholds
      .iter()
      .filter(|t| score >= t.min_score)
      .map(|t| t.xp_reward)
      .max()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Games {
  pub flappy_bird: GameRewards,
  pub reaction_game: GameRewards,
  pub tile_game: GameRewards,
}

impl Default for Games {
  fn default() -> Self {
    let tiers = |list: &[(f64, Exp)]| GameRewards {
      thresholds: list.iter().map(|&(s, xp)| Threshold::new(s, xp)).collect(),
    };

    Self {
      flappy_bird: tiers(&[(10.0, 25)]),
      reaction_game: tiers(&[(100.0, 5), (200.0, 10), (300.0, 15)]),
      tile_game: tiers(&[(50.0, 5), (100.0, 10), (150.0, 15)]),
    }
  }
}

impl Games {
  pub fn get(&self, game: GameType) -> &GameRewards {
    match game {
      GameType::FlappyBird => &self.flappy_bird,
      GameType::ReactionGame => &self.reaction_game,
      GameType::TileGame => &self.tile_game,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceSettings {
  pub rewards: Rewards,
  pub daily_limits: DailyLimits,
  pub games: Games,
}

impl ExperienceSettings {
  pub fn reward_for(&self, activity: &Activity) -> Result<Exp, Rejection> {
    let rewards = &self.rewards;
    match *activity {
      Activity::Post => Ok(rewards.post),
      Activity::Comment => Ok(rewards.comment),
      Activity::Like => Ok(rewards.like),
      Activity::Attendance => Ok(rewards.attendance),
      Activity::AttendanceStreak => Ok(rewards.attendance_streak),
      Activity::Referral => Ok(rewards.referral),
      Activity::Game { game, score } => {
        self.games.get(game).reward_for(score).ok_or(Rejection::BelowThreshold)
      }
    }
  }

  pub fn limit_for(&self, kind: LimitKind) -> i32 {
    match kind {
      LimitKind::Posts => self.daily_limits.posts,
      LimitKind::Comments => self.daily_limits.comments,
      LimitKind::Games => self.daily_limits.games,
    }
  }

  pub fn validate(&self) -> Result<()> {
    let Rewards {
      post,
      comment,
      like,
      attendance,
      attendance_streak,
      referral,
    } = self.rewards;
    let rewards = [
      ("post", post),
      ("comment", comment),
      ("like", like),
      ("attendance", attendance),
      ("attendance_streak", attendance_streak),
      ("referral", referral),
    ];
    if let Some((name, xp)) =
      rewards.iter().find(|(_, xp)| !(0..=MAX_REWARD).contains(xp))
    {
      return Err(Error::InvalidSettings(format!(
        "`{name}` reward {xp} outside 0..={MAX_REWARD}"
      )));
    }

    let DailyLimits { posts, comments, games } = self.daily_limits;
    if posts < 0 || comments < 0 || games < 0 {
      return Err(Error::InvalidSettings("negative daily limit".into()));
    }

    let games =
      [GameType::FlappyBird, GameType::ReactionGame, GameType::TileGame];
    for game in games {
      for t in &self.games.get(game).thresholds {
        if !t.min_score.is_finite() || !(0..=MAX_REWARD).contains(&t.xp_reward)
        {
          return Err(Error::InvalidSettings(format!(
            "bad threshold for {game:?}: {} -> {}",
            t.min_score, t.xp_reward
          )));
        }
      }
    }

    Ok(())
  }
}

/// Serves [`ExperienceSettings`] from memory until told to forget them.
#[derive(Default)]
pub struct SettingsProvider {
  cache: RwLock<Option<Arc<ExperienceSettings>>>,
}

impl SettingsProvider {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn get<C: ConnectionTrait>(
    &self,
    db: &C,
  ) -> Result<Arc<ExperienceSettings>> {
    if let Some(settings) = self.cache.read().await.as_ref() {
      return Ok(settings.clone());
    }
    self.reload(db).await
  }

  /// Reads the stored settings and replaces the cached copy.
  pub async fn reload<C: ConnectionTrait>(
    &self,
    db: &C,
  ) -> Result<Arc<ExperienceSettings>> {
    let settings = Arc::new(sv::Settings::new(db).load().await?);
    *self.cache.write().await = Some(settings.clone());
    Ok(settings)
  }

  pub async fn invalidate(&self) {
    self.cache.write().await.take();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::test_db;

  fn game(game: GameType, score: f64) -> Activity {
    Activity::Game { game, score }
  }

  #[test]
  fn highest_qualifying_threshold_wins() {
    let settings = ExperienceSettings::default();

    let reward =
      |score| settings.reward_for(&game(GameType::ReactionGame, score));
    assert_eq!(reward(250.0), Ok(10));
    assert_eq!(reward(200.0), Ok(10));
    assert_eq!(reward(300.0), Ok(15));
    assert_eq!(reward(100.0), Ok(5));
    assert_eq!(reward(99.9), Err(Rejection::BelowThreshold));
  }

  #[test]
  fn threshold_order_does_not_matter() {
    let rewards = GameRewards {
      thresholds: vec![
        Threshold::new(300.0, 15),
        Threshold::new(100.0, 5),
        Threshold::new(200.0, 10),
      ],
    };

    assert_eq!(rewards.reward_for(250.0), Some(10));
    assert_eq!(rewards.reward_for(f64::NAN), None);
    assert_eq!(GameRewards::default().reward_for(1e9), None);
  }

  #[test]
  fn fixed_rewards() {
    let settings = ExperienceSettings::default();

    assert_eq!(settings.reward_for(&Activity::Post), Ok(10));
    assert_eq!(settings.reward_for(&Activity::Comment), Ok(5));
    assert_eq!(settings.reward_for(&Activity::Like), Ok(1));
    assert_eq!(settings.reward_for(&Activity::Attendance), Ok(5));
    assert_eq!(settings.reward_for(&Activity::AttendanceStreak), Ok(10));
    assert_eq!(settings.reward_for(&Activity::Referral), Ok(50));
    assert_eq!(settings.reward_for(&game(GameType::FlappyBird, 12.0)), Ok(25));
  }

  #[test]
  fn partial_document_keeps_defaults() {
    let settings: ExperienceSettings = json::from_str(
      r#"{"rewards":{"post":20},"daily_limits":{"games":2}}"#,
    )
    .unwrap();

    assert_eq!(settings.rewards.post, 20);
    assert_eq!(settings.rewards.comment, 5);
    assert_eq!(settings.limit_for(LimitKind::Games), 2);
    assert_eq!(settings.limit_for(LimitKind::Posts), 3);
    assert_eq!(settings.games, Games::default());
  }

  #[test]
  fn validation_rejects_negative_values() {
    let mut settings = ExperienceSettings::default();
    assert!(settings.validate().is_ok());

    settings.rewards.like = -1;
    assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));

    let mut settings = ExperienceSettings::default();
    settings.games.tile_game.thresholds.push(Threshold::new(f64::INFINITY, 1));
    assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
  }

  #[test]
  fn validation_caps_rewards() {
    let mut settings = ExperienceSettings::default();
    settings.rewards.referral = MAX_REWARD;
    assert!(settings.validate().is_ok());

    settings.rewards.referral = i64::MAX / 2 + 1;
    assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));

    let mut settings = ExperienceSettings::default();
    let generous = Threshold::new(50.0, MAX_REWARD + 1);
    settings.games.flappy_bird.thresholds.push(generous);
    assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
  }

  #[tokio::test]
  async fn cache_survives_until_invalidated() {
    let db = test_db().await;
    let provider = SettingsProvider::new();

    assert_eq!(provider.get(&db).await.unwrap().rewards.post, 10);

    let mut changed = ExperienceSettings::default();
    changed.rewards.post = 42;
    sv::Settings::new(&db).store(&changed).await.unwrap();

    // still served from memory
    assert_eq!(provider.get(&db).await.unwrap().rewards.post, 10);

    provider.invalidate().await;
    assert_eq!(provider.get(&db).await.unwrap().rewards.post, 42);
  }

  #[tokio::test]
  async fn reload_replaces_cached_copy() {
    let db = test_db().await;
    let provider = SettingsProvider::new();
    provider.get(&db).await.unwrap();

    let mut changed = ExperienceSettings::default();
    changed.daily_limits.posts = 1;
    sv::Settings::new(&db).store(&changed).await.unwrap();

    assert_eq!(provider.reload(&db).await.unwrap().daily_limits.posts, 1);
    assert_eq!(provider.get(&db).await.unwrap().daily_limits.posts, 1);
  }
}
