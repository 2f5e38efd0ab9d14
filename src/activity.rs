//! Activities that earn experience and the outcome of an award attempt.

use serde::{Deserialize, Serialize};

use crate::level::{Exp, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
  Post,
  Comment,
  Like,
  Attendance,
  AttendanceStreak,
  Referral,
  Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameType {
  FlappyBird,
  ReactionGame,
  TileGame,
}

/// Daily counter an activity is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitKind {
  Posts,
  Comments,
  /// shared by every game type
  Games,
}

/// A validated award request. Game results always carry their game and score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
  Post,
  Comment,
  Like,
  Attendance,
  AttendanceStreak,
  Referral,
  Game { game: GameType, score: f64 },
}

impl Activity {
  pub fn kind(&self) -> ActivityType {
    match self {
      Activity::Post => ActivityType::Post,
      Activity::Comment => ActivityType::Comment,
      Activity::Like => ActivityType::Like,
      Activity::Attendance => ActivityType::Attendance,
      Activity::AttendanceStreak => ActivityType::AttendanceStreak,
      Activity::Referral => ActivityType::Referral,
      Activity::Game { .. } => ActivityType::Game,
    }
  }

  /// `None` for activities without a daily cap.
  pub fn limit(&self) -> Option<LimitKind> {
    match self {
      Activity::Post => Some(LimitKind::Posts),
      Activity::Comment => Some(LimitKind::Comments),
      Activity::Game { .. } => Some(LimitKind::Games),
      Activity::Like
      | Activity::Attendance
      | Activity::AttendanceStreak
      | Activity::Referral => None,
    }
  }
}

/// Award request as collaborators send it.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRequest {
  pub activity_type: ActivityType,
  #[serde(default)]
  pub game_type: Option<GameType>,
  #[serde(default)]
  pub game_score: Option<f64>,
}

impl TryFrom<ActivityRequest> for Activity {
  type Error = Rejection;

  fn try_from(req: ActivityRequest) -> Result<Self, Self::Error> {
    Ok(match req.activity_type {
      ActivityType::Post => Activity::Post,
      ActivityType::Comment => Activity::Comment,
      ActivityType::Like => Activity::Like,
      ActivityType::Attendance => Activity::Attendance,
      ActivityType::AttendanceStreak => Activity::AttendanceStreak,
      ActivityType::Referral => Activity::Referral,
      ActivityType::Game => {
        let game = req.game_type.ok_or(Rejection::MissingGameType)?;
        let score = req.game_score.ok_or(Rejection::MissingGameScore)?;
        Activity::Game { game, score }
      }
    })
  }
}

/// Policy refusal. Never a fault: nothing is written when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
  #[error("게임 타입이 필요합니다.")]
  MissingGameType,
  #[error("게임 점수가 필요합니다.")]
  MissingGameScore,
  #[error("기준 점수에 도달하지 못했습니다.")]
  BelowThreshold,
  #[error("일일 제한에 도달했습니다. ({current}/{limit})")]
  DailyLimit { current: i32, limit: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardResult {
  pub success: bool,
  pub exp_awarded: Exp,
  pub leveled_up: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub old_level: Option<Level>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub new_level: Option<Level>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl AwardResult {
  pub fn granted(exp: Exp, old_level: Level, new_level: Level) -> Self {
    Self {
      success: true,
      exp_awarded: exp,
      leveled_up: new_level > old_level,
      old_level: Some(old_level),
      new_level: Some(new_level),
      reason: None,
    }
  }

  pub fn rejected(rejection: Rejection) -> Self {
    Self {
      success: false,
      exp_awarded: 0,
      leveled_up: false,
      old_level: None,
      new_level: None,
      reason: Some(rejection.to_string()),
    }
  }
}

impl From<Rejection> for AwardResult {
  fn from(rejection: Rejection) -> Self {
    Self::rejected(rejection)
  }
}
