use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use super::scorecard::CourseHoleInfo;
use super::session::{HoleScoreInput, RoundSession, RoundSetup, WorkflowError};
use crate::model::{Caller, NewPlayer, Player, PlayerLink, RoundType};
use crate::storage::Storage;

#[derive(Deserialize, Clone, Debug)]
pub struct GuestPlayer {
    pub first_name: String,
    pub last_name: String,
    pub handicap: Option<f64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct HoleScoreRequest {
    pub player_id: i64,
    pub hole_number: i32,
    #[serde(flatten)]
    pub input: HoleScoreInput,
}

/// Body of a round create or edit. Anything left out falls back to the
/// session's current value; blank `notes` clear them.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RoundRequest {
    pub date_played: Option<NaiveDate>,
    pub golf_course_id: Option<i64>,
    pub starting_hole: Option<i32>,
    pub holes_played: Option<i32>,
    pub round_type: Option<RoundType>,
    pub notes: Option<String>,
    #[serde(default)]
    pub player_ids: Vec<i64>,
    #[serde(default)]
    pub guest_players: Vec<GuestPlayer>,
    #[serde(default)]
    pub scores: Vec<HoleScoreRequest>,
}

/// Drives a [`RoundSession`] against storage for one caller.
pub struct RoundWorkflow<'a> {
    storage: &'a dyn Storage,
    caller: &'a Caller,
}

impl<'a> RoundWorkflow<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage, caller: &'a Caller) -> Self {
        Self { storage, caller }
    }

    #[must_use]
    pub fn start(&self, today: NaiveDate) -> RoundSession {
        RoundSession::new(&self.caller.user_id, today)
    }

    /// # Errors
    ///
    /// Will return `Err` if the round does not exist or storage fails
    pub async fn load(&self, round_id: i64) -> Result<RoundSession, WorkflowError> {
        let round = self
            .storage
            .get_round(round_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("round {round_id}")))?;
        let course = self.course_hole_info(round.golf_course_id).await?;
        let mut players = Vec::with_capacity(round.player_ids.len());
        for player_id in &round.player_ids {
            if let Some(player) = self.storage.get_player(*player_id).await? {
                players.push(player);
            }
        }
        Ok(RoundSession::from_round(&round, course, players))
    }

    /// # Errors
    ///
    /// Will return `Err` if storage fails
    pub async fn course_hole_info(
        &self,
        course_id: i64,
    ) -> Result<Option<CourseHoleInfo>, WorkflowError> {
        let Some(course) = self.storage.get_course(course_id).await? else {
            return Ok(None);
        };
        let holes = self.storage.holes_for_course(course_id).await?;
        Ok(Some(CourseHoleInfo::new(&course, holes)))
    }

    /// # Errors
    ///
    /// Will return `Err` if the session refuses the change or storage fails
    pub async fn apply_setup(
        &self,
        session: &mut RoundSession,
        setup: RoundSetup,
    ) -> Result<(), WorkflowError> {
        let course = match setup.golf_course_id {
            Some(course_id) => self.course_hole_info(course_id).await?,
            None => None,
        };
        let mut setup = setup;
        if course.is_none() {
            setup.golf_course_id = None;
        }
        session.apply_setup(setup, course)
    }

    /// # Errors
    ///
    /// Will return `Err` if the player is unknown or not visible to the caller
    pub async fn add_player(
        &self,
        session: &mut RoundSession,
        player_id: i64,
    ) -> Result<(), WorkflowError> {
        let player = self
            .storage
            .get_player(player_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("player {player_id}")))?;
        session.add_player(player, self.caller)
    }

    /// Creates a player managed by the caller and adds them to the round.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the player cannot be created or added
    pub async fn create_guest_player(
        &self,
        session: &mut RoundSession,
        guest: &GuestPlayer,
    ) -> Result<Player, WorkflowError> {
        let player = self
            .storage
            .add_player(&NewPlayer {
                first_name: guest.first_name.clone(),
                last_name: guest.last_name.clone(),
                handicap: guest.handicap,
                link: PlayerLink::Managed {
                    created_by: self.caller.user_id.clone(),
                },
            })
            .await?;
        debug!(player_id = player.player_id, "created guest player");
        session.add_player(player.clone(), self.caller)?;
        Ok(player)
    }

    /// # Errors
    ///
    /// Will return `Err` on validation failures or when storage fails
    pub async fn save(&self, session: &mut RoundSession) -> Result<i64, WorkflowError> {
        let submission = session.to_submission()?;
        let round_id = self.storage.save_round(&submission).await?;
        info!(
            round_id,
            status = %submission.status,
            scores = submission.scores.len(),
            "round saved"
        );
        session.mark_saved(round_id);
        Ok(round_id)
    }

    /// Applies a full create/edit request to the session and saves it.
    /// Edits replace the player list and every score.
    ///
    /// # Errors
    ///
    /// Will return `Err` on any refused step, validation failure or storage failure
    pub async fn submit(
        &self,
        session: &mut RoundSession,
        request: RoundRequest,
    ) -> Result<i64, WorkflowError> {
        let current = session.setup.clone();
        let setup = RoundSetup {
            date_played: request.date_played.or(current.date_played),
            golf_course_id: request.golf_course_id.or(current.golf_course_id),
            starting_hole: request.starting_hole.unwrap_or(current.starting_hole),
            holes_played: request.holes_played.unwrap_or(current.holes_played),
            round_type: request.round_type.unwrap_or(current.round_type),
            notes: match request.notes {
                Some(notes) if notes.trim().is_empty() => None,
                Some(notes) => Some(notes),
                None => current.notes,
            },
        };
        self.apply_setup(session, setup).await?;

        // a player list replaces the round's players; guests only ever add
        if !request.player_ids.is_empty() {
            let dropped: Vec<i64> = session
                .players
                .iter()
                .map(|p| p.player_id)
                .filter(|id| !request.player_ids.contains(id))
                .collect();
            for player_id in dropped {
                session.remove_player(player_id)?;
            }
            for player_id in &request.player_ids {
                self.add_player(session, *player_id).await?;
            }
        }
        for guest in &request.guest_players {
            self.create_guest_player(session, guest).await?;
        }

        let problems = session.validate();
        if !problems.is_empty() {
            return Err(WorkflowError::Validation(problems));
        }

        if session.course.is_some() && !session.players.is_empty() {
            session.generate_scorecard()?;
            if !request.scores.is_empty() {
                // a submitted score list replaces the whole card
                for card in &mut session.scorecards {
                    for entry in &mut card.entries {
                        entry.strokes = None;
                        entry.putts = None;
                        entry.fairway_hit = None;
                    }
                }
            }
            for score in &request.scores {
                session
                    .record_score(score.player_id, score.hole_number, score.input)
                    .map_err(|e| match e {
                        WorkflowError::NotFound(what) => {
                            WorkflowError::Validation(vec![format!("Cannot score {what}")])
                        }
                        other => other,
                    })?;
            }
        }
        self.save(session).await
    }
}
