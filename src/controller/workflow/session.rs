use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::scorecard::{
    CourseHoleInfo, DEFAULT_MAX_HOLE, HoleScoreEntry, PlayerScorecard, played_hole_numbers,
};
use crate::model::{
    Caller, Player, Round, RoundStatus, RoundSubmission, RoundType, ScoreSubmission,
};
use crate::storage::StorageError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} while the round is {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: SessionStage,
    },
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("player {0} is not available to this user")]
    PlayerNotVisible(i64),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "stage", rename_all = "PascalCase")]
pub enum SessionStage {
    New,
    Setup,
    PlayersSelected,
    ScoresEntered,
    Saved { round_id: i64 },
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStage::New => write!(f, "new"),
            SessionStage::Setup => write!(f, "in setup"),
            SessionStage::PlayersSelected => write!(f, "selecting players"),
            SessionStage::ScoresEntered => write!(f, "entering scores"),
            SessionStage::Saved { round_id } => write!(f, "saved as round {round_id}"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoundSetup {
    pub date_played: Option<NaiveDate>,
    pub golf_course_id: Option<i64>,
    pub starting_hole: i32,
    pub holes_played: i32,
    pub round_type: RoundType,
    pub notes: Option<String>,
}

impl RoundSetup {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date_played: Some(today),
            golf_course_id: None,
            starting_hole: 1,
            holes_played: 18,
            round_type: RoundType::Friendly,
            notes: None,
        }
    }

    fn changes_layout(&self, other: &RoundSetup) -> bool {
        self.golf_course_id != other.golf_course_id
            || self.starting_hole != other.starting_hole
            || self.holes_played != other.holes_played
    }
}

/// What a user typed for one hole. Missing strokes clear the hole.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct HoleScoreInput {
    pub strokes: Option<i32>,
    pub putts: Option<i32>,
    pub fairway_hit: Option<bool>,
}

/// A round being built or edited by one user. Every mutation goes through a
/// transition method that checks the current stage first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoundSession {
    pub created_by: String,
    pub round_id: Option<i64>,
    pub stage: SessionStage,
    pub setup: RoundSetup,
    pub course: Option<CourseHoleInfo>,
    pub players: Vec<Player>,
    pub scorecards: Vec<PlayerScorecard>,
}

impl RoundSession {
    #[must_use]
    pub fn new(created_by: &str, today: NaiveDate) -> Self {
        Self {
            created_by: created_by.to_string(),
            round_id: None,
            stage: SessionStage::New,
            setup: RoundSetup::new(today),
            course: None,
            players: vec![],
            scorecards: vec![],
        }
    }

    /// Rebuilds a session from a stored round. The stage follows from what the
    /// round already holds.
    #[must_use]
    pub fn from_round(round: &Round, course: Option<CourseHoleInfo>, players: Vec<Player>) -> Self {
        let mut session = Self {
            created_by: round.created_by.clone(),
            round_id: Some(round.round_id),
            stage: SessionStage::Setup,
            setup: RoundSetup {
                date_played: Some(round.date_played),
                golf_course_id: Some(round.golf_course_id),
                starting_hole: round.starting_hole,
                holes_played: round.holes_played,
                round_type: round.round_type,
                notes: round.notes.clone(),
            },
            course,
            players,
            scorecards: vec![],
        };
        if session.players.is_empty() {
            return session;
        }
        session.stage = SessionStage::PlayersSelected;
        if round.scores.is_empty() || session.course.is_none() {
            return session;
        }
        session.rebuild_scorecards();
        for score in &round.scores {
            if let Some(entry) = session
                .scorecards
                .iter_mut()
                .find(|c| c.player_id == score.player_id)
                .and_then(|c| c.entry_mut(score.hole_number))
            {
                entry.strokes = Some(score.strokes);
                entry.putts = score.putts;
                entry.fairway_hit = score.fairway_hit;
            }
        }
        session.stage = SessionStage::ScoresEntered;
        session
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.stage {
            SessionStage::Saved { .. } => Err(WorkflowError::InvalidTransition {
                action,
                stage: self.stage,
            }),
            _ => Ok(()),
        }
    }

    fn max_hole(&self) -> i32 {
        self.course
            .as_ref()
            .map_or(DEFAULT_MAX_HOLE, |c| c.max_hole)
    }

    fn stage_without_scorecard(&self) -> SessionStage {
        if self.players.is_empty() {
            SessionStage::Setup
        } else {
            SessionStage::PlayersSelected
        }
    }

    /// Applies round details with the matching course info. Changing the hole
    /// layout discards any scorecard already generated.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the session has already been saved
    pub fn apply_setup(
        &mut self,
        mut setup: RoundSetup,
        course: Option<CourseHoleInfo>,
    ) -> Result<(), WorkflowError> {
        self.ensure_open("change setup")?;
        if let Some(info) = &course {
            setup.holes_played = setup.holes_played.min(info.max_hole);
        }
        let layout_changed = setup.changes_layout(&self.setup);
        self.setup = setup;
        self.course = course;
        if layout_changed && !self.scorecards.is_empty() {
            self.scorecards.clear();
        }
        self.stage = match self.stage {
            SessionStage::ScoresEntered if self.scorecards.is_empty() => {
                self.stage_without_scorecard()
            }
            SessionStage::New => self.stage_without_scorecard(),
            other => other,
        };
        Ok(())
    }

    /// Adds a player the caller may see. Adding someone already in the round is a no-op.
    ///
    /// # Errors
    ///
    /// Will return `Err` before setup, after saving, or when the player is not visible
    pub fn add_player(&mut self, player: Player, caller: &Caller) -> Result<(), WorkflowError> {
        self.ensure_open("add a player")?;
        if self.stage == SessionStage::New {
            return Err(WorkflowError::InvalidTransition {
                action: "add a player",
                stage: self.stage,
            });
        }
        if self.players.iter().any(|p| p.player_id == player.player_id) {
            return Ok(());
        }
        if !player.is_visible_to(caller) {
            return Err(WorkflowError::PlayerNotVisible(player.player_id));
        }
        if self.stage == SessionStage::ScoresEntered {
            if let Some(course) = &self.course {
                let numbers = self.hole_numbers();
                self.scorecards
                    .push(PlayerScorecard::build(&player, course, &numbers, None));
            }
        }
        self.players.push(player);
        if self.stage == SessionStage::Setup {
            self.stage = SessionStage::PlayersSelected;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Will return `Err` if the session has already been saved
    pub fn remove_player(&mut self, player_id: i64) -> Result<(), WorkflowError> {
        self.ensure_open("remove a player")?;
        self.players.retain(|p| p.player_id != player_id);
        self.scorecards.retain(|c| c.player_id != player_id);
        if self.players.is_empty() {
            self.scorecards.clear();
            if self.stage != SessionStage::New {
                self.stage = SessionStage::Setup;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn hole_numbers(&self) -> Vec<i32> {
        played_hole_numbers(
            self.setup.starting_hole,
            self.setup.holes_played,
            self.max_hole(),
        )
    }

    fn rebuild_scorecards(&mut self) {
        let Some(course) = &self.course else {
            return;
        };
        let numbers = self.hole_numbers();
        self.scorecards = self
            .players
            .iter()
            .map(|player| {
                let previous = self.scorecards.iter().find(|c| c.player_id == player.player_id);
                PlayerScorecard::build(player, course, &numbers, previous)
            })
            .collect();
    }

    /// One row per played hole per player, keeping values already entered.
    ///
    /// # Errors
    ///
    /// Will return `Err` unless players are selected and a course is attached
    pub fn generate_scorecard(&mut self) -> Result<(), WorkflowError> {
        self.ensure_open("generate a scorecard")?;
        if !matches!(
            self.stage,
            SessionStage::PlayersSelected | SessionStage::ScoresEntered
        ) || self.course.is_none()
        {
            return Err(WorkflowError::InvalidTransition {
                action: "generate a scorecard",
                stage: self.stage,
            });
        }
        self.rebuild_scorecards();
        self.stage = SessionStage::ScoresEntered;
        Ok(())
    }

    /// # Errors
    ///
    /// Will return `Err` outside score entry, for an unknown player or hole, or
    /// for non-positive strokes or negative putts
    pub fn record_score(
        &mut self,
        player_id: i64,
        hole_number: i32,
        input: HoleScoreInput,
    ) -> Result<(), WorkflowError> {
        if self.stage != SessionStage::ScoresEntered {
            return Err(WorkflowError::InvalidTransition {
                action: "record a score",
                stage: self.stage,
            });
        }
        let mut problems = vec![];
        if input.strokes.is_some_and(|s| s <= 0) {
            problems.push(format!("Strokes on hole {hole_number} must be greater than 0"));
        }
        if input.putts.is_some_and(|p| p < 0) {
            problems.push(format!("Putts on hole {hole_number} cannot be negative"));
        }
        if !problems.is_empty() {
            return Err(WorkflowError::Validation(problems));
        }
        let entry = self
            .scorecards
            .iter_mut()
            .find(|c| c.player_id == player_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("player {player_id} in this round")))?
            .entry_mut(hole_number)
            .ok_or_else(|| WorkflowError::NotFound(format!("hole {hole_number} in this round")))?;
        entry.strokes = input.strokes;
        entry.putts = input.putts;
        entry.fairway_hit = input.fairway_hit;
        Ok(())
    }

    /// Every reason the round cannot be saved yet; empty when it can.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut messages = vec![];
        if self.setup.date_played.is_none() {
            messages.push("Date played is required".to_string());
        }
        if self.setup.golf_course_id.is_none() {
            messages.push("Please select a golf course".to_string());
        }
        if self.setup.starting_hole < 1 {
            messages.push("Starting hole must be at least 1".to_string());
        }
        if self.setup.holes_played < 1 {
            messages.push("Holes played must be at least 1".to_string());
        } else if self.setup.holes_played > self.max_hole() {
            messages.push(format!(
                "Holes played cannot exceed {} for this course",
                self.max_hole()
            ));
        }
        if self.players.is_empty() {
            messages.push("At least one player is required".to_string());
        }
        messages
    }

    #[must_use]
    pub fn has_scores(&self) -> bool {
        self.scorecards
            .iter()
            .any(|c| c.entries.iter().any(HoleScoreEntry::is_entered))
    }

    /// The full write for this session: setup, players and every entered score.
    ///
    /// # Errors
    ///
    /// Will return `Err` after saving or when validation finds problems
    pub fn to_submission(&self) -> Result<RoundSubmission, WorkflowError> {
        self.ensure_open("save")?;
        let messages = self.validate();
        if !messages.is_empty() {
            return Err(WorkflowError::Validation(messages));
        }
        let (Some(date_played), Some(golf_course_id)) =
            (self.setup.date_played, self.setup.golf_course_id)
        else {
            return Err(WorkflowError::Validation(vec![
                "Round setup is incomplete".to_string(),
            ]));
        };
        let scores = self
            .scorecards
            .iter()
            .flat_map(|card| {
                card.entries
                    .iter()
                    .filter(|e| e.is_entered())
                    .map(|e| ScoreSubmission {
                        player_id: card.player_id,
                        hole_id: e.hole_id,
                        strokes: e.strokes.unwrap_or_default(),
                        putts: e.putts,
                        fairway_hit: e.fairway_hit,
                    })
            })
            .collect::<Vec<_>>();
        let status = if scores.is_empty() {
            RoundStatus::InProgress
        } else {
            RoundStatus::Completed
        };
        Ok(RoundSubmission {
            existing_round_id: self.round_id,
            golf_course_id,
            date_played,
            starting_hole: self.setup.starting_hole,
            holes_played: self.setup.holes_played,
            round_type: self.setup.round_type,
            status,
            notes: self.setup.notes.clone(),
            created_by: self.created_by.clone(),
            player_ids: self.players.iter().map(|p| p.player_id).collect(),
            scores,
        })
    }

    pub fn mark_saved(&mut self, round_id: i64) {
        self.round_id = Some(round_id);
        self.stage = SessionStage::Saved { round_id };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GolfCourse, Hole, PlayerLink};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn caller() -> Caller {
        Caller {
            user_id: "u1".to_string(),
            is_admin: false,
        }
    }

    fn course_info() -> CourseHoleInfo {
        let course = GolfCourse {
            golf_course_id: 3,
            golf_club_id: 1,
            club_name: "Club".to_string(),
            name: "North".to_string(),
            default_par: 72,
            number_of_holes: 18,
        };
        let holes = (1..=18)
            .map(|n| Hole {
                hole_id: i64::from(n) * 10,
                golf_course_id: 3,
                hole_number: n,
                par: if n % 6 == 0 { 5 } else { 4 },
                stroke_index: None,
                length_yards: None,
            })
            .collect();
        CourseHoleInfo::new(&course, holes)
    }

    fn player(id: i64, owner: &str) -> Player {
        Player {
            player_id: id,
            first_name: format!("P{id}"),
            last_name: "Golfer".to_string(),
            handicap: None,
            link: PlayerLink::Managed {
                created_by: owner.to_string(),
            },
        }
    }

    fn setup(start: i32, holes: i32) -> RoundSetup {
        RoundSetup {
            golf_course_id: Some(3),
            starting_hole: start,
            holes_played: holes,
            ..RoundSetup::new(today())
        }
    }

    fn ready_session() -> RoundSession {
        let mut session = RoundSession::new("u1", today());
        session.apply_setup(setup(16, 5), Some(course_info())).unwrap();
        session.add_player(player(1, "u1"), &caller()).unwrap();
        session.generate_scorecard().unwrap();
        session
    }

    #[test]
    fn stages_advance_in_order() {
        let mut session = RoundSession::new("u1", today());
        assert_eq!(session.stage, SessionStage::New);
        assert!(matches!(
            session.add_player(player(1, "u1"), &caller()),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        session.apply_setup(setup(1, 18), Some(course_info())).unwrap();
        assert_eq!(session.stage, SessionStage::Setup);
        assert!(session.generate_scorecard().is_err());
        session.add_player(player(1, "u1"), &caller()).unwrap();
        assert_eq!(session.stage, SessionStage::PlayersSelected);
        session.generate_scorecard().unwrap();
        assert_eq!(session.stage, SessionStage::ScoresEntered);
        assert_eq!(session.scorecards[0].entries.len(), 18);
    }

    #[test]
    fn scorecard_wraps_from_starting_hole() {
        let session = ready_session();
        let numbers: Vec<i32> = session.scorecards[0]
            .entries
            .iter()
            .map(|e| e.hole_number)
            .collect();
        assert_eq!(numbers, vec![16, 17, 18, 1, 2]);
    }

    #[test]
    fn holes_played_is_clamped_to_course() {
        let mut session = RoundSession::new("u1", today());
        let mut short = course_info();
        short.holes.truncate(9);
        short.max_hole = 9;
        session.apply_setup(setup(1, 18), Some(short)).unwrap();
        assert_eq!(session.setup.holes_played, 9);
    }

    #[test]
    fn duplicates_ignored_and_invisible_players_rejected() {
        let mut session = ready_session();
        session.add_player(player(1, "u1"), &caller()).unwrap();
        assert_eq!(session.players.len(), 1);
        assert_eq!(
            session.add_player(player(2, "someone-else"), &caller()),
            Err(WorkflowError::PlayerNotVisible(2))
        );
        let admin = Caller {
            user_id: "root".to_string(),
            is_admin: true,
        };
        session.add_player(player(2, "someone-else"), &admin).unwrap();
        assert_eq!(session.scorecards.len(), 2);
    }

    #[test]
    fn layout_change_discards_scorecard() {
        let mut session = ready_session();
        session
            .record_score(
                1,
                17,
                HoleScoreInput {
                    strokes: Some(4),
                    ..HoleScoreInput::default()
                },
            )
            .unwrap();
        let mut notes_only = session.setup.clone();
        notes_only.notes = Some("windy".to_string());
        session.apply_setup(notes_only, Some(course_info())).unwrap();
        assert_eq!(session.stage, SessionStage::ScoresEntered);
        assert!(session.has_scores());

        session.apply_setup(setup(1, 9), Some(course_info())).unwrap();
        assert!(session.scorecards.is_empty());
        assert_eq!(session.stage, SessionStage::PlayersSelected);
    }

    #[test]
    fn record_score_rejects_bad_values() {
        let mut session = ready_session();
        let zero = HoleScoreInput {
            strokes: Some(0),
            ..HoleScoreInput::default()
        };
        assert!(matches!(
            session.record_score(1, 16, zero),
            Err(WorkflowError::Validation(_))
        ));
        let negative_putts = HoleScoreInput {
            strokes: Some(4),
            putts: Some(-1),
            fairway_hit: None,
        };
        assert!(session.record_score(1, 16, negative_putts).is_err());
        let unplayed = HoleScoreInput {
            strokes: Some(4),
            ..HoleScoreInput::default()
        };
        assert!(matches!(
            session.record_score(1, 5, unplayed),
            Err(WorkflowError::NotFound(_))
        ));
    }

    #[test]
    fn removing_player_drops_their_rows() {
        let mut session = ready_session();
        let admin = Caller {
            user_id: "u1".to_string(),
            is_admin: true,
        };
        session.add_player(player(2, "x"), &admin).unwrap();
        session.remove_player(1).unwrap();
        assert_eq!(session.scorecards.len(), 1);
        assert_eq!(session.scorecards[0].player_id, 2);
        session.remove_player(2).unwrap();
        assert_eq!(session.stage, SessionStage::Setup);
    }

    #[test]
    fn validation_accumulates_messages() {
        let mut session = RoundSession::new("u1", today());
        let mut bad = RoundSetup::new(today());
        bad.date_played = None;
        bad.starting_hole = 0;
        bad.holes_played = 0;
        session.apply_setup(bad, None).unwrap();
        let messages = session.validate();
        assert_eq!(messages.len(), 5);
        assert!(matches!(
            session.to_submission(),
            Err(WorkflowError::Validation(m)) if m.len() == 5
        ));
    }

    #[test]
    fn status_follows_entered_scores() {
        let mut session = ready_session();
        let submission = session.to_submission().unwrap();
        assert_eq!(submission.status, RoundStatus::InProgress);
        assert!(submission.scores.is_empty());

        session
            .record_score(
                1,
                18,
                HoleScoreInput {
                    strokes: Some(5),
                    putts: Some(2),
                    fairway_hit: Some(true),
                },
            )
            .unwrap();
        let submission = session.to_submission().unwrap();
        assert_eq!(submission.status, RoundStatus::Completed);
        assert_eq!(submission.scores.len(), 1);
        assert_eq!(submission.scores[0].hole_id, 180);
    }

    #[test]
    fn saved_session_is_closed() {
        let mut session = ready_session();
        session.mark_saved(42);
        assert_eq!(session.stage, SessionStage::Saved { round_id: 42 });
        assert!(session.remove_player(1).is_err());
        assert!(session.to_submission().is_err());
        assert!(session.apply_setup(setup(1, 18), None).is_err());
    }
}
