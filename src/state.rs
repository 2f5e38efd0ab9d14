use std::{env, str::FromStr};

use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::{prelude::*, settings::SettingsProvider, sv};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// default size of ranking pages
  pub ranking_limit: u64,
  pub rate_per_second: u64,
  pub rate_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:levelup.db?mode=rwc"),
      port: 3000,
      ranking_limit: 100,
      rate_per_second: 2,
      rate_burst: 100,
    }
  }
}

impl Config {
  pub fn from_env() -> Self {
    let default = Self::default();

    Self {
      database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
      port: var_or("PORT", default.port),
      ranking_limit: var_or("RANKING_LIMIT", default.ranking_limit),
      rate_per_second: var_or("RATE_PER_SECOND", default.rate_per_second),
      rate_burst: var_or("RATE_BURST", default.rate_burst),
    }
  }
}

fn var_or<T>(key: &str, default: T) -> T
where
  T: FromStr + std::fmt::Display,
  T::Err: std::fmt::Display,
{
  match env::var(key) {
    Ok(raw) => raw.trim().parse().unwrap_or_else(|err| {
      warn!("Invalid {key} value `{raw}` ({err}), using default: {default}");
      default
    }),
    Err(_) => default,
  }
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub experience: sv::Experience<'a>,
  pub limits: sv::Limits<'a>,
  pub ranking: sv::Ranking<'a>,
  pub attendance: sv::Attendance<'a>,
  pub settings: sv::Settings<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  /// experience settings, shared by every request until invalidated
  pub settings: SettingsProvider,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    Self { db, config, settings: SettingsProvider::new() }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      experience: sv::Experience::new(&self.db, &self.settings),
      limits: sv::Limits::new(&self.db),
      ranking: sv::Ranking::new(&self.db),
      attendance: sv::Attendance::new(&self.db, &self.settings),
      settings: sv::Settings::new(&self.db),
    }
  }
}
