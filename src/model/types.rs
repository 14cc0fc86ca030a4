use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum RoundType {
    #[default]
    Friendly,
    Competitive,
}

impl RoundType {
    #[must_use]
    pub fn from_i64(i: i64) -> Self {
        match i {
            1 => RoundType::Competitive,
            _ => RoundType::Friendly,
        }
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            RoundType::Friendly => 0,
            RoundType::Competitive => 1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum RoundStatus {
    #[default]
    InProgress,
    Completed,
}

impl RoundStatus {
    #[must_use]
    pub fn from_i64(i: i64) -> Self {
        match i {
            1 => RoundStatus::Completed,
            _ => RoundStatus::InProgress,
        }
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            RoundStatus::InProgress => 0,
            RoundStatus::Completed => 1,
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundStatus::InProgress => "in progress",
            RoundStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Who owns a player profile: a login identity playing as themselves, or a
/// user who manages the profile for a guest.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "link", rename_all = "snake_case")]
pub enum PlayerLink {
    SelfLinked { user_id: String },
    Managed { created_by: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Player {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub handicap: Option<f64>,
    pub link: PlayerLink,
}

impl Player {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Non-admins see their own profile and the guests they manage.
    #[must_use]
    pub fn is_visible_to(&self, caller: &Caller) -> bool {
        if caller.is_admin {
            return true;
        }
        match &self.link {
            PlayerLink::SelfLinked { user_id } => *user_id == caller.user_id,
            PlayerLink::Managed { created_by } => *created_by == caller.user_id,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub handicap: Option<f64>,
    pub link: PlayerLink,
}

/// Identity of whoever is making the request, as asserted by the upstream proxy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GolfClub {
    pub golf_club_id: i64,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewGolfClub {
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GolfCourse {
    pub golf_course_id: i64,
    pub golf_club_id: i64,
    pub club_name: String,
    pub name: String,
    pub default_par: i32,
    pub number_of_holes: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hole {
    pub hole_id: i64,
    pub golf_course_id: i64,
    pub hole_number: i32,
    pub par: i32,
    pub stroke_index: Option<i32>,
    pub length_yards: Option<i32>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewHole {
    pub hole_number: i32,
    pub par: i32,
    pub stroke_index: Option<i32>,
    pub length_yards: Option<i32>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewGolfCourse {
    pub golf_club_id: i64,
    pub name: String,
    pub default_par: Option<i32>,
    #[serde(default)]
    pub holes: Vec<NewHole>,
}

/// One player's strokes on one hole, joined with the hole's number and par.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Score {
    pub score_id: i64,
    pub round_id: i64,
    pub player_id: i64,
    pub hole_id: i64,
    pub hole_number: i32,
    pub par: i32,
    pub strokes: i32,
    pub putts: Option<i32>,
    pub fairway_hit: Option<bool>,
}

impl Score {
    /// Strokes must be positive and the hole must have a par to count toward statistics.
    #[must_use]
    pub fn counts_for_stats(&self) -> bool {
        self.strokes > 0 && self.par > 0
    }

    #[must_use]
    pub fn to_par(&self) -> i32 {
        self.strokes - self.par
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Round {
    pub round_id: i64,
    pub golf_course_id: i64,
    pub course_name: String,
    pub date_played: NaiveDate,
    pub starting_hole: i32,
    pub holes_played: i32,
    pub round_type: RoundType,
    pub status: RoundStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub player_ids: Vec<i64>,
    pub scores: Vec<Score>,
}

impl Round {
    pub fn scores_for(&self, player_id: i64) -> impl Iterator<Item = &Score> {
        self.scores.iter().filter(move |s| s.player_id == player_id)
    }

    /// Sum of strokes a player recorded in this round; holes without strokes add nothing.
    #[must_use]
    pub fn total_strokes_for(&self, player_id: i64) -> i32 {
        self.scores_for(player_id)
            .filter(|s| s.strokes > 0)
            .map(|s| s.strokes)
            .sum()
    }

    /// Par of the holes the player recorded strokes on.
    #[must_use]
    pub fn total_par_for(&self, player_id: i64) -> i32 {
        self.scores_for(player_id)
            .filter(|s| s.strokes > 0)
            .map(|s| s.par.max(0))
            .sum()
    }

    #[must_use]
    pub fn has_player(&self, player_id: i64) -> bool {
        self.player_ids.contains(&player_id)
    }
}

/// Everything needed to write a round and its full set of scores in one go.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSubmission {
    pub existing_round_id: Option<i64>,
    pub golf_course_id: i64,
    pub date_played: NaiveDate,
    pub starting_hole: i32,
    pub holes_played: i32,
    pub round_type: RoundType,
    pub status: RoundStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub player_ids: Vec<i64>,
    pub scores: Vec<ScoreSubmission>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSubmission {
    pub player_id: i64,
    pub hole_id: i64,
    pub strokes: i32,
    pub putts: Option<i32>,
    pub fairway_hit: Option<bool>,
}
