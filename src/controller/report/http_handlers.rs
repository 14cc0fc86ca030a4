use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use chrono::NaiveDate;
use serde::Deserialize;

use super::data_service::{self, DEFAULT_PARTNER_LIMIT, DEFAULT_RECENT_LIMIT, DEFAULT_ROUND_COUNT};
use crate::error::AppError;
use crate::model::{
    Caller, PerformanceByPar, Player, ReportFilter, RoundType, ScoringDistribution,
};
use crate::storage::Storage;

/// Query string shared by the report endpoints. Filters are kept flat here
/// because url-encoded bodies do not mix with `#[serde(flatten)]`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub player_id: Option<i64>,
    pub round_count: Option<usize>,
    pub limit: Option<usize>,
    pub course_id: Option<i64>,
    pub holes_played: Option<i32>,
    pub round_type: Option<RoundType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportQuery {
    #[must_use]
    pub fn filter(&self) -> ReportFilter {
        ReportFilter {
            course_id: self.course_id,
            holes_played: self.holes_played,
            round_type: self.round_type,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reports")
            .route("/dashboard-stats", web::get().to(dashboard_stats))
            .route("/playing-partners", web::get().to(playing_partners))
            .route("/performance-summary", web::get().to(performance_summary))
            .route("/recent-rounds", web::get().to(recent_rounds))
            .route("/scoring-distribution", web::get().to(scoring_distribution))
            .route("/performance-by-par", web::get().to(performance_by_par)),
    );
}

/// An explicit `playerId` must exist and be visible; without one the caller's
/// own profile is used and may be absent.
async fn report_subject(
    storage: &dyn Storage,
    caller: &Caller,
    player_id: Option<i64>,
) -> Result<Option<Player>, AppError> {
    let player = data_service::resolve_player(storage, caller, player_id).await?;
    match (player_id, player) {
        (Some(id), None) => Err(AppError::NotFound(format!("player {id}"))),
        (_, player) => Ok(player),
    }
}

pub async fn dashboard_stats(
    caller: Caller,
    storage: Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    let stats = data_service::dashboard_stats(storage.get_ref(), &caller).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn playing_partners(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PARTNER_LIMIT);
    let partners = data_service::playing_partners(storage.get_ref(), &caller, limit).await?;
    Ok(HttpResponse::Ok().json(partners))
}

pub async fn performance_summary(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let round_count = query.round_count.unwrap_or(DEFAULT_ROUND_COUNT);
    let points = data_service::performance_summary(
        storage.get_ref(),
        &caller,
        round_count,
        &query.filter(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(points))
}

pub async fn recent_rounds(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let rounds = data_service::recent_rounds(storage.get_ref(), &caller, limit).await?;
    Ok(HttpResponse::Ok().json(rounds))
}

pub async fn scoring_distribution(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let distribution = match report_subject(storage.get_ref(), &caller, query.player_id).await? {
        Some(player) => {
            data_service::scoring_distribution(
                storage.get_ref(),
                player.player_id,
                &query.filter(),
            )
            .await?
        }
        None => ScoringDistribution::default(),
    };
    Ok(HttpResponse::Ok().json(distribution))
}

pub async fn performance_by_par(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let by_par = match report_subject(storage.get_ref(), &caller, query.player_id).await? {
        Some(player) => {
            data_service::performance_by_par(storage.get_ref(), player.player_id, &query.filter())
                .await?
        }
        None => PerformanceByPar::default(),
    };
    Ok(HttpResponse::Ok().json(by_par))
}
