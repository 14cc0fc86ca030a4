use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::score::ScoreBucket;
use crate::model::types::{Player, Round, RoundStatus, RoundType};

/// Optional criteria narrowing which rounds feed a report. Field names follow
/// the query-string convention of the API (`?courseId=3&roundType=Competitive`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub course_id: Option<i64>,
    pub holes_played: Option<i32>,
    pub round_type: Option<RoundType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    #[must_use]
    pub fn matches(&self, round: &Round) -> bool {
        self.course_id.is_none_or(|id| round.golf_course_id == id)
            && self.holes_played.is_none_or(|h| round.holes_played == h)
            && self.round_type.is_none_or(|t| round.round_type == t)
            && self.start_date.is_none_or(|d| round.date_played >= d)
            && self.end_date.is_none_or(|d| round.date_played <= d)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ScoringDistribution {
    pub eagle_count: u32,
    pub birdie_count: u32,
    pub par_count: u32,
    pub bogey_count: u32,
    pub double_bogey_count: u32,
    pub triple_bogey_or_worse_count: u32,
    pub total_holes: u32,
    pub eagle_percentage: f64,
    pub birdie_percentage: f64,
    pub par_percentage: f64,
    pub bogey_percentage: f64,
    pub double_bogey_percentage: f64,
    pub triple_bogey_or_worse_percentage: f64,
}

impl ScoringDistribution {
    /// Counts are ordered as [`ScoreBucket::ALL`].
    #[must_use]
    pub fn from_counts(counts: [u32; 6]) -> Self {
        let total: u32 = counts.iter().sum();
        let pct = |n: u32| percentage(n, total);
        Self {
            eagle_count: counts[0],
            birdie_count: counts[1],
            par_count: counts[2],
            bogey_count: counts[3],
            double_bogey_count: counts[4],
            triple_bogey_or_worse_count: counts[5],
            total_holes: total,
            eagle_percentage: pct(counts[0]),
            birdie_percentage: pct(counts[1]),
            par_percentage: pct(counts[2]),
            bogey_percentage: pct(counts[3]),
            double_bogey_percentage: pct(counts[4]),
            triple_bogey_or_worse_percentage: pct(counts[5]),
        }
    }

    #[must_use]
    pub fn count(&self, bucket: ScoreBucket) -> u32 {
        match bucket {
            ScoreBucket::EagleOrBetter => self.eagle_count,
            ScoreBucket::Birdie => self.birdie_count,
            ScoreBucket::Par => self.par_count,
            ScoreBucket::Bogey => self.bogey_count,
            ScoreBucket::DoubleBogey => self.double_bogey_count,
            ScoreBucket::TripleBogeyOrWorse => self.triple_bogey_or_worse_count,
        }
    }

    #[must_use]
    pub fn percentage(&self, bucket: ScoreBucket) -> f64 {
        match bucket {
            ScoreBucket::EagleOrBetter => self.eagle_percentage,
            ScoreBucket::Birdie => self.birdie_percentage,
            ScoreBucket::Par => self.par_percentage,
            ScoreBucket::Bogey => self.bogey_percentage,
            ScoreBucket::DoubleBogey => self.double_bogey_percentage,
            ScoreBucket::TripleBogeyOrWorse => self.triple_bogey_or_worse_percentage,
        }
    }
}

/// `part / total * 100`, or 0 when there is nothing to divide by.
#[must_use]
pub fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(total) * 100.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParGroup {
    pub par: i32,
    pub average: f64,
    pub count: u32,
    pub relative_to_par: f64,
    pub has_data: bool,
}

impl ParGroup {
    #[must_use]
    pub fn empty(par: i32) -> Self {
        Self {
            par,
            average: 0.0,
            count: 0,
            relative_to_par: 0.0,
            has_data: false,
        }
    }

    #[must_use]
    pub fn from_total(par: i32, total_strokes: i64, count: u32) -> Self {
        if count == 0 {
            return Self::empty(par);
        }
        #[allow(clippy::cast_precision_loss)]
        let average = total_strokes as f64 / f64::from(count);
        Self {
            par,
            average,
            count,
            relative_to_par: average - f64::from(par),
            has_data: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PerformanceByPar {
    pub par3: ParGroup,
    pub par4: ParGroup,
    pub par5: ParGroup,
    pub has_valid_data: bool,
}

impl Default for PerformanceByPar {
    fn default() -> Self {
        Self {
            par3: ParGroup::empty(3),
            par4: ParGroup::empty(4),
            par5: ParGroup::empty(5),
            has_valid_data: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PerformanceDataPoint {
    pub round_id: i64,
    pub date: NaiveDate,
    pub total_score: i32,
    pub total_par: i32,
    pub score_vs_par: i32,
    pub course_name: String,
    pub holes_played: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub total_rounds: u32,
    pub best_score: Option<i32>,
    pub best_score_round_id: Option<i64>,
    pub best_score_course_name: Option<String>,
    pub best_score_date: Option<NaiveDate>,
    pub average_score: Option<f64>,
    pub average_to_par: Option<f64>,
    pub lowest_to_par: Option<i32>,
    pub favorite_course_name: Option<String>,
    pub favorite_course_rounds: u32,
    pub last_round_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub is_improving_streak: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayingPartnerSummary {
    pub partner_id: i64,
    pub partner_name: String,
    pub last_played_date: NaiveDate,
    pub rounds_together: u32,
    pub user_wins: u32,
    pub partner_wins: u32,
    pub ties: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CourseOption {
    pub golf_course_id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayerReport {
    pub player: Player,
    pub filter_courses: Vec<CourseOption>,
    pub performance_data: Vec<PerformanceDataPoint>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecentRound {
    pub round_id: i64,
    pub date_played: NaiveDate,
    pub course_name: String,
    pub holes_played: i32,
    pub round_type: RoundType,
    pub status: RoundStatus,
    pub player_count: usize,
}

impl From<&Round> for RecentRound {
    fn from(round: &Round) -> Self {
        Self {
            round_id: round.round_id,
            date_played: round.date_played,
            course_name: round.course_name.clone(),
            holes_played: round.holes_played,
            round_type: round.round_type,
            status: round.status,
            player_count: round.player_ids.len(),
        }
    }
}
