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
          .table(Attendance::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Attendance::UserId)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Attendance::Streak).integer().not_null().default(0),
          )
          .col(ColumnDef::new(Attendance::LastDate).date().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_attendance_user")
              .from(Attendance::Table, Attendance::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(AttendanceDays::Table)
          .if_not_exists()
          .col(ColumnDef::new(AttendanceDays::UserId).string().not_null())
          .col(ColumnDef::new(AttendanceDays::Date).date().not_null())
          .primary_key(
            Index::create()
              .col(AttendanceDays::UserId)
              .col(AttendanceDays::Date),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_attendance_days_user")
              .from(AttendanceDays::Table, AttendanceDays::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AttendanceDays::Table).to_owned())
      .await?;
    manager.drop_table(Table::drop().table(Attendance::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Attendance {
  Table,
  UserId,
  Streak,
  LastDate,
}

#[derive(DeriveIden)]
pub enum AttendanceDays {
  Table,
  UserId,
  Date,
}
