//! Per-day activity counters. A row whose `last_reset_date` is not today
//! holds yesterday's (or older) numbers and reads as all zeroes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;
use crate::activity::{GameType, LimitKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_limits")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub user_id: String,
  pub last_reset_date: Date,
  pub posts: i32,
  pub comments: i32,
  pub flappy_bird: i32,
  pub reaction_game: i32,
  pub tile_game: i32,
}

impl Model {
  pub fn counts_on(&self, today: Date) -> DailyCounts {
    if self.last_reset_date != today {
      return DailyCounts::default();
    }

    DailyCounts {
      posts: self.posts,
      comments: self.comments,
      games: GameCounts {
        flappy_bird: self.flappy_bird,
        reaction_game: self.reaction_game,
        tile_game: self.tile_game,
      },
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameCounts {
  pub flappy_bird: i32,
  pub reaction_game: i32,
  pub tile_game: i32,
}

impl GameCounts {
  pub fn get(&self, game: GameType) -> i32 {
    match game {
      GameType::FlappyBird => self.flappy_bird,
      GameType::ReactionGame => self.reaction_game,
      GameType::TileGame => self.tile_game,
    }
  }

  pub fn total(&self) -> i32 {
    self.flappy_bird + self.reaction_game + self.tile_game
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyCounts {
  pub posts: i32,
  pub comments: i32,
  pub games: GameCounts,
}

impl DailyCounts {
  pub fn get(&self, kind: LimitKind) -> i32 {
    match kind {
      LimitKind::Posts => self.posts,
      LimitKind::Comments => self.comments,
      LimitKind::Games => self.games.total(),
    }
  }
}

/// Column counting `game`.
pub fn game_column(game: GameType) -> Column {
  match game {
    GameType::FlappyBird => Column::FlappyBird,
    GameType::ReactionGame => Column::ReactionGame,
    GameType::TileGame => Column::TileGame,
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id"
  )]
  User,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
