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
          .table(UserStats::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserStats::UserId)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(UserStats::Level).integer().not_null().default(1),
          )
          .col(
            ColumnDef::new(UserStats::CurrentExp)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(UserStats::CurrentLevelRequiredXp)
              .big_integer()
              .not_null()
              .default(10),
          )
          .col(
            ColumnDef::new(UserStats::TotalExperience)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(UserStats::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_stats_user")
              .from(UserStats::Table, UserStats::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_user_stats_total")
          .table(UserStats::Table)
          .col(UserStats::TotalExperience)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(UserStats::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum UserStats {
  Table,
  UserId,
  Level,
  CurrentExp,
  CurrentLevelRequiredXp,
  TotalExperience,
  UpdatedAt,
}
