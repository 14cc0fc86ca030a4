use std::collections::HashMap;

use crate::model::{
    DashboardStats, ParGroup, PerformanceByPar, PerformanceDataPoint, Player,
    PlayingPartnerSummary, ReportFilter, Round, RoundStatus, Score, ScoreBucket,
    ScoringDistribution,
};

/// Rounds that count toward a filtered report: completed and matching the filter.
fn completed_matching<'a>(
    rounds: &'a [Round],
    filter: &'a ReportFilter,
) -> impl Iterator<Item = &'a Round> {
    rounds
        .iter()
        .filter(move |r| r.status == RoundStatus::Completed && filter.matches(r))
}

/// The player's scores from completed, filtered rounds that are usable for statistics.
pub fn filtered_scores<'a>(
    rounds: &'a [Round],
    player_id: i64,
    filter: &'a ReportFilter,
) -> impl Iterator<Item = &'a Score> {
    completed_matching(rounds, filter)
        .flat_map(move |r| r.scores_for(player_id))
        .filter(|s| s.counts_for_stats())
}

#[must_use]
pub fn scoring_distribution(
    rounds: &[Round],
    player_id: i64,
    filter: &ReportFilter,
) -> ScoringDistribution {
    let mut counts = [0u32; 6];
    for score in filtered_scores(rounds, player_id, filter) {
        let bucket = ScoreBucket::from_to_par(score.to_par());
        if let Some(idx) = ScoreBucket::ALL.iter().position(|b| *b == bucket) {
            counts[idx] += 1;
        }
    }
    ScoringDistribution::from_counts(counts)
}

#[must_use]
pub fn performance_by_par(
    rounds: &[Round],
    player_id: i64,
    filter: &ReportFilter,
) -> PerformanceByPar {
    // (total strokes, count) for par 3, 4, 5
    let mut groups = [(0i64, 0u32); 3];
    for score in filtered_scores(rounds, player_id, filter) {
        if let Some(slot) = usize::try_from(score.par - 3)
            .ok()
            .and_then(|idx| groups.get_mut(idx))
        {
            slot.0 += i64::from(score.strokes);
            slot.1 += 1;
        }
    }
    let par3 = ParGroup::from_total(3, groups[0].0, groups[0].1);
    let par4 = ParGroup::from_total(4, groups[1].0, groups[1].1);
    let par5 = ParGroup::from_total(5, groups[2].0, groups[2].1);
    let has_valid_data = par3.has_data || par4.has_data || par5.has_data;
    PerformanceByPar {
        par3,
        par4,
        par5,
        has_valid_data,
    }
}

/// One point per completed, filtered round in which the player recorded strokes,
/// oldest first.
#[must_use]
pub fn performance_series(
    rounds: &[Round],
    player_id: i64,
    filter: &ReportFilter,
) -> Vec<PerformanceDataPoint> {
    let mut points: Vec<PerformanceDataPoint> = completed_matching(rounds, filter)
        .filter_map(|round| {
            let total_score = round.total_strokes_for(player_id);
            if total_score <= 0 {
                return None;
            }
            let total_par = round.total_par_for(player_id);
            Some(PerformanceDataPoint {
                round_id: round.round_id,
                date: round.date_played,
                total_score,
                total_par,
                score_vs_par: total_score - total_par,
                course_name: round.course_name.clone(),
                holes_played: round.holes_played,
            })
        })
        .collect();
    points.sort_by_key(|p| (p.date, p.round_id));
    points
}

/// The last `count` points of an ascending series, still ascending.
#[must_use]
pub fn most_recent_points(
    mut series: Vec<PerformanceDataPoint>,
    count: usize,
) -> Vec<PerformanceDataPoint> {
    let skip = series.len().saturating_sub(count);
    series.drain(..skip);
    series
}

const STREAK_WINDOW: usize = 5;

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, n) = values.fold((0i64, 0usize), |(s, n), v| (s + i64::from(v), n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

#[must_use]
pub fn dashboard_stats(rounds: &[Round], player_id: i64) -> DashboardStats {
    let mut played: Vec<(&Round, i32, i32)> = rounds
        .iter()
        .filter(|r| r.status == RoundStatus::Completed)
        .filter_map(|r| {
            let total = r.total_strokes_for(player_id);
            (total > 0).then(|| (r, total, total - r.total_par_for(player_id)))
        })
        .collect();
    if played.is_empty() {
        return DashboardStats::default();
    }
    played.sort_by_key(|(r, _, _)| (r.date_played, r.round_id));

    let mut stats = DashboardStats {
        total_rounds: u32::try_from(played.len()).unwrap_or(u32::MAX),
        ..DashboardStats::default()
    };

    // min_by_key keeps the first minimum, i.e. the earliest round
    if let Some((best, total, _)) = played.iter().min_by_key(|(_, total, _)| *total) {
        stats.best_score = Some(*total);
        stats.best_score_round_id = Some(best.round_id);
        stats.best_score_course_name = Some(best.course_name.clone());
        stats.best_score_date = Some(best.date_played);
    }
    stats.average_score = mean(played.iter().map(|(_, total, _)| *total));
    stats.average_to_par = mean(played.iter().map(|(_, _, to_par)| *to_par));
    stats.lowest_to_par = played.iter().map(|(_, _, to_par)| *to_par).min();
    stats.last_round_date = played.last().map(|(r, _, _)| r.date_played);

    let mut course_counts: HashMap<i64, (u32, &str)> = HashMap::new();
    for (round, _, _) in &played {
        course_counts
            .entry(round.golf_course_id)
            .or_insert((0, round.course_name.as_str()))
            .0 += 1;
    }
    if let Some((count, name)) = course_counts
        .into_values()
        .min_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)))
    {
        stats.favorite_course_name = Some(name.to_string());
        stats.favorite_course_rounds = count;
    }

    if played.len() > STREAK_WINDOW {
        let split = played.len() - STREAK_WINDOW;
        let (earlier, recent) = played.split_at(split);
        let earlier_avg = mean(earlier.iter().map(|(_, _, p)| *p)).unwrap_or_default();
        let recent_avg = mean(recent.iter().map(|(_, _, p)| *p)).unwrap_or_default();
        let improving = recent_avg < earlier_avg;
        let on_side = |to_par: i32| {
            if improving {
                f64::from(to_par) < earlier_avg
            } else {
                f64::from(to_par) >= earlier_avg
            }
        };
        stats.is_improving_streak = improving;
        stats.current_streak = u32::try_from(
            played
                .iter()
                .rev()
                .take_while(|(_, _, to_par)| on_side(*to_par))
                .count(),
        )
        .unwrap_or(u32::MAX);
    }
    stats
}

/// Head-to-head tallies against everyone in `partners`, over every round `player_id` played.
#[must_use]
pub fn playing_partner_summary(
    rounds: &[Round],
    player_id: i64,
    partners: &[Player],
    limit: usize,
) -> Vec<PlayingPartnerSummary> {
    let mine: Vec<&Round> = rounds.iter().filter(|r| r.has_player(player_id)).collect();
    let mut summaries: Vec<PlayingPartnerSummary> = partners
        .iter()
        .filter(|p| p.player_id != player_id)
        .filter_map(|partner| {
            let shared: Vec<&&Round> = mine
                .iter()
                .filter(|r| r.has_player(partner.player_id))
                .collect();
            let last_played_date = shared.iter().map(|r| r.date_played).max()?;
            let mut summary = PlayingPartnerSummary {
                partner_id: partner.player_id,
                partner_name: partner.full_name(),
                last_played_date,
                rounds_together: u32::try_from(shared.len()).unwrap_or(u32::MAX),
                user_wins: 0,
                partner_wins: 0,
                ties: 0,
            };
            for round in shared {
                let user_total = round.total_strokes_for(player_id);
                let partner_total = round.total_strokes_for(partner.player_id);
                if user_total <= 0 || partner_total <= 0 {
                    continue;
                }
                match user_total.cmp(&partner_total) {
                    std::cmp::Ordering::Less => summary.user_wins += 1,
                    std::cmp::Ordering::Greater => summary.partner_wins += 1,
                    std::cmp::Ordering::Equal => summary.ties += 1,
                }
            }
            Some(summary)
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.last_played_date
            .cmp(&a.last_played_date)
            .then_with(|| a.partner_name.cmp(&b.partner_name))
    });
    summaries.truncate(limit);
    summaries
}
