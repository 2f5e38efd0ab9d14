pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_users;
mod m20261016_000002_create_user_stats;
mod m20261016_000003_create_activity_limits;
mod m20261016_000004_create_system_settings;
mod m20261016_000005_create_attendance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261016_000001_create_users::Migration),
      Box::new(m20261016_000002_create_user_stats::Migration),
      Box::new(m20261016_000003_create_activity_limits::Migration),
      Box::new(m20261016_000004_create_system_settings::Migration),
      Box::new(m20261016_000005_create_attendance::Migration),
    ]
  }
}
