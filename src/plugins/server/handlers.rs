use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
  activity::{Activity, ActivityRequest, AwardResult},
  entity::{limits::DailyCounts, user},
  prelude::*,
  settings::{DailyLimits, ExperienceSettings},
  state::AppState,
  sv::{
    attendance::{AttendanceState, CheckIn},
    experience::ProgressView,
    ranking::{RankEntry, Scope},
    user::Profile,
  },
};

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Debug, Deserialize)]
pub struct AwardReq {
  pub user_id: String,
  #[serde(flatten)]
  pub activity: ActivityRequest,
}

pub async fn award(
  State(app): State<Arc<AppState>>,
  Json(req): Json<AwardReq>,
) -> Result<Json<AwardResult>> {
  let activity = match Activity::try_from(req.activity) {
    Ok(activity) => activity,
    Err(rejection) => return Ok(Json(rejection.into())),
  };

  Ok(Json(app.sv().experience.award(&req.user_id, activity).await?))
}

#[derive(Debug, Deserialize)]
pub struct RegisterReq {
  pub id: String,
  #[serde(flatten)]
  pub profile: Profile,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RegisterReq>,
) -> Result<Json<user::Model>> {
  if req.id.trim().is_empty() {
    return Err(Error::BadRequest("empty user id".into()));
  }
  Ok(Json(app.sv().user.register(&req.id, req.profile).await?))
}

pub async fn progress(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ProgressView>> {
  Ok(Json(app.sv().experience.progress(&id).await?))
}

pub async fn sync(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ProgressView>> {
  Ok(Json(app.sv().experience.sync(&id).await?))
}

#[derive(Debug, Serialize)]
pub struct LimitsRes {
  pub date: Date,
  pub counts: DailyCounts,
  pub limits: DailyLimits,
}

pub async fn limits(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<LimitsRes>> {
  let sv = app.sv();
  sv.user.get(&id).await?;

  let today = utils::today();
  let settings = app.settings.get(&app.db).await?;

  Ok(Json(LimitsRes {
    date: today,
    counts: sv.limits.counts(&id, today).await?,
    limits: settings.daily_limits.clone(),
  }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
  pub scope: Option<String>,
  pub school_id: Option<String>,
  pub sido: Option<String>,
  pub sigungu: Option<String>,
  pub limit: Option<u64>,
}

impl ScopeQuery {
  fn scope(&self) -> Result<Scope> {
    let required = |value: &Option<String>, name: &str| {
      value
        .clone()
        .ok_or_else(|| Error::BadRequest(format!("`{name}` is required")))
    };

    match self.scope.as_deref().unwrap_or("global") {
      "global" => Ok(Scope::Global),
      "school" => Ok(Scope::School(required(&self.school_id, "school_id")?)),
      "region" => Ok(Scope::Region {
        sido: required(&self.sido, "sido")?,
        sigungu: self.sigungu.clone(),
      }),
      other => Err(Error::BadRequest(format!("unknown scope `{other}`"))),
    }
  }
}

pub async fn ranking(
  State(app): State<Arc<AppState>>,
  Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<RankEntry>>> {
  let scope = query.scope()?;
  let limit = query.limit.unwrap_or(app.config.ranking_limit);

  Ok(Json(app.sv().ranking.top(&scope, limit).await?))
}

#[derive(Debug, Serialize)]
pub struct RankRes {
  pub rank: u64,
}

pub async fn rank(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(query): Query<ScopeQuery>,
) -> Result<Json<RankRes>> {
  let scope = query.scope()?;
  let rank = app.sv().ranking.rank_of(&id, &scope).await?;

  Ok(Json(RankRes { rank }))
}

pub async fn attendance(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<AttendanceState>> {
  Ok(Json(app.sv().attendance.state(&id, utils::today()).await?))
}

pub async fn check_in(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CheckIn>> {
  Ok(Json(app.sv().attendance.check_in(&id, utils::today()).await?))
}

pub async fn settings(
  State(app): State<Arc<AppState>>,
) -> Result<Json<ExperienceSettings>> {
  let settings = app.settings.get(&app.db).await?;
  Ok(Json(settings.as_ref().clone()))
}

pub async fn update_settings(
  State(app): State<Arc<AppState>>,
  Json(settings): Json<ExperienceSettings>,
) -> Result<Json<ExperienceSettings>> {
  app.sv().settings.store(&settings).await?;
  app.settings.invalidate().await;

  Ok(Json(settings))
}

pub async fn reload_settings(
  State(app): State<Arc<AppState>>,
) -> Result<Json<ExperienceSettings>> {
  let settings = app.settings.reload(&app.db).await?;
  Ok(Json(settings.as_ref().clone()))
}
