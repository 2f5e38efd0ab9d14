use sea_orm::ConnectionTrait;

use crate::{entity::setting, prelude::*, settings::ExperienceSettings};

const EXPERIENCE_KEY: &str = "experience";

pub struct Settings<'a, C = DatabaseConnection> {
  db: &'a C,
}

impl<'a, C: ConnectionTrait> Settings<'a, C> {
  pub fn new(db: &'a C) -> Self {
    Self { db }
  }

  /// Stored experience settings, or the defaults when none are stored or
  /// the stored document is unusable.
  pub async fn load(&self) -> Result<ExperienceSettings> {
    let Some(row) =
      setting::Entity::find_by_id(EXPERIENCE_KEY).one(self.db).await?
    else {
      debug!("No experience settings stored, using defaults");
      return Ok(ExperienceSettings::default());
    };

    let settings = json::from_value::<ExperienceSettings>(row.value)
      .map_err(Error::from)
      .and_then(|settings| settings.validate().map(|_| settings));

    match settings {
      Ok(settings) => Ok(settings),
      Err(err) => {
        warn!("Stored experience settings ignored: {err}");
        Ok(ExperienceSettings::default())
      }
    }
  }

  pub async fn store(&self, settings: &ExperienceSettings) -> Result<()> {
    settings.validate()?;

    let value = json::to_value(settings)?;
    let now = utils::now();

    match setting::Entity::find_by_id(EXPERIENCE_KEY).one(self.db).await? {
      Some(row) => {
        setting::ActiveModel {
          value: Set(value),
          updated_at: Set(now),
          ..row.into()
        }
        .update(self.db)
        .await?;
      }
      None => {
        setting::ActiveModel {
          key: Set(EXPERIENCE_KEY.to_string()),
          value: Set(value),
          updated_at: Set(now),
        }
        .insert(self.db)
        .await?;
      }
    }

    info!("Experience settings updated");
    Ok(())
  }
}
