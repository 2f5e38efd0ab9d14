use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SystemSettings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(SystemSettings::Key)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(SystemSettings::Value).json().not_null())
          .col(ColumnDef::new(SystemSettings::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(SystemSettings::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum SystemSettings {
  Table,
  Key,
  Value,
  UpdatedAt,
}
