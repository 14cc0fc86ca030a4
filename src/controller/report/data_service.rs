use std::collections::BTreeMap;

use tracing::debug;

use super::report_aggregators;
use crate::model::{
    Caller, CourseOption, DashboardStats, PerformanceByPar, PerformanceDataPoint, Player,
    PlayerReport, PlayingPartnerSummary, RecentRound, ReportFilter, RoundStatus,
    ScoringDistribution,
};
use crate::storage::{Storage, StorageError};

pub const DEFAULT_PARTNER_LIMIT: usize = 5;
pub const DEFAULT_ROUND_COUNT: usize = 7;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// The player a report is about: an explicit id the caller may see, or the
/// caller's own profile. `Ok(None)` when there is no such visible player.
///
/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn resolve_player(
    storage: &dyn Storage,
    caller: &Caller,
    player_id: Option<i64>,
) -> Result<Option<Player>, StorageError> {
    match player_id {
        Some(id) => Ok(storage
            .get_player(id)
            .await?
            .filter(|p| p.is_visible_to(caller))),
        None => storage.player_for_user(&caller.user_id).await,
    }
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn dashboard_stats(
    storage: &dyn Storage,
    caller: &Caller,
) -> Result<DashboardStats, StorageError> {
    let Some(player) = storage.player_for_user(&caller.user_id).await? else {
        debug!(user_id = %caller.user_id, "no player profile, empty dashboard");
        return Ok(DashboardStats::default());
    };
    let rounds = storage
        .rounds_for_player(player.player_id, Some(RoundStatus::Completed))
        .await?;
    Ok(report_aggregators::dashboard_stats(&rounds, player.player_id))
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn playing_partners(
    storage: &dyn Storage,
    caller: &Caller,
    limit: usize,
) -> Result<Vec<PlayingPartnerSummary>, StorageError> {
    let Some(player) = storage.player_for_user(&caller.user_id).await? else {
        return Ok(vec![]);
    };
    let rounds = storage.rounds_for_player(player.player_id, None).await?;
    let partners = storage.co_players(player.player_id).await?;
    Ok(report_aggregators::playing_partner_summary(
        &rounds,
        player.player_id,
        &partners,
        limit,
    ))
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn performance_summary(
    storage: &dyn Storage,
    caller: &Caller,
    round_count: usize,
    filter: &ReportFilter,
) -> Result<Vec<PerformanceDataPoint>, StorageError> {
    let Some(player) = storage.player_for_user(&caller.user_id).await? else {
        return Ok(vec![]);
    };
    let rounds = storage
        .rounds_for_player(player.player_id, Some(RoundStatus::Completed))
        .await?;
    let series = report_aggregators::performance_series(&rounds, player.player_id, filter);
    Ok(report_aggregators::most_recent_points(series, round_count))
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn recent_rounds(
    storage: &dyn Storage,
    caller: &Caller,
    limit: usize,
) -> Result<Vec<RecentRound>, StorageError> {
    let rounds = storage
        .recent_rounds_for_user(&caller.user_id, limit)
        .await?;
    Ok(rounds.iter().map(RecentRound::from).collect())
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn scoring_distribution(
    storage: &dyn Storage,
    player_id: i64,
    filter: &ReportFilter,
) -> Result<ScoringDistribution, StorageError> {
    let rounds = storage
        .rounds_for_player(player_id, Some(RoundStatus::Completed))
        .await?;
    Ok(report_aggregators::scoring_distribution(
        &rounds, player_id, filter,
    ))
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn performance_by_par(
    storage: &dyn Storage,
    player_id: i64,
    filter: &ReportFilter,
) -> Result<PerformanceByPar, StorageError> {
    let rounds = storage
        .rounds_for_player(player_id, Some(RoundStatus::Completed))
        .await?;
    Ok(report_aggregators::performance_by_par(
        &rounds, player_id, filter,
    ))
}

/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn player_report(
    storage: &dyn Storage,
    player: Player,
    filter: &ReportFilter,
) -> Result<PlayerReport, StorageError> {
    let rounds = storage
        .rounds_for_player(player.player_id, Some(RoundStatus::Completed))
        .await?;

    // keyed by id: different clubs may use the same course name
    let courses: BTreeMap<i64, &str> = rounds
        .iter()
        .map(|r| (r.golf_course_id, r.course_name.as_str()))
        .collect();
    let mut filter_courses: Vec<CourseOption> = courses
        .into_iter()
        .map(|(golf_course_id, name)| CourseOption {
            golf_course_id,
            name: name.to_string(),
        })
        .collect();
    filter_courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.golf_course_id.cmp(&b.golf_course_id)));

    let performance_data = report_aggregators::performance_series(&rounds, player.player_id, filter);
    Ok(PlayerReport {
        player,
        filter_courses,
        performance_data,
    })
}
