use sea_orm_migration::prelude::*;

use super::m20261016_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ActivityLimits::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ActivityLimits::UserId)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(ActivityLimits::LastResetDate).date().not_null())
          .col(counter(ActivityLimits::Posts))
          .col(counter(ActivityLimits::Comments))
          .col(counter(ActivityLimits::FlappyBird))
          .col(counter(ActivityLimits::ReactionGame))
          .col(counter(ActivityLimits::TileGame))
          .foreign_key(
            ForeignKey::create()
              .name("fk_activity_limits_user")
              .from(ActivityLimits::Table, ActivityLimits::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ActivityLimits::Table).to_owned())
      .await
  }
}

fn counter(col: ActivityLimits) -> ColumnDef {
  ColumnDef::new(col).integer().not_null().default(0).to_owned()
}

#[derive(DeriveIden)]
pub enum ActivityLimits {
  Table,
  UserId,
  LastResetDate,
  Posts,
  Comments,
  FlappyBird,
  ReactionGame,
  TileGame,
}
