use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub username: Option<String>,
  pub school_id: Option<String>,
  /// region: province
  pub sido: Option<String>,
  /// region: district inside `sido`
  pub sigungu: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_one = "super::stats::Entity")]
  Stats,
  #[sea_orm(has_one = "super::limits::Entity")]
  Limits,
}

impl Related<super::stats::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Stats.def()
  }
}

impl Related<super::limits::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Limits.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
