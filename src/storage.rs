use async_trait::async_trait;
use sql_middleware::middleware::ConfigAndPool;
use thiserror::Error;

use crate::model::{
    Caller, GolfClub, GolfCourse, Hole, NewGolfClub, NewGolfCourse, NewPlayer, Player, Round,
    RoundStatus, RoundSubmission, database_read, database_write,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("db error: {0}")]
    Db(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sql_middleware::SqlMiddlewareDbError> for StorageError {
    fn from(err: sql_middleware::SqlMiddlewareDbError) -> Self {
        Self::Db(err.to_string())
    }
}

/// Read and write queries the reports and the round workflow depend on.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn player_for_user(&self, user_id: &str) -> Result<Option<Player>, StorageError>;
    async fn get_player(&self, player_id: i64) -> Result<Option<Player>, StorageError>;
    async fn list_players(&self, caller: &Caller) -> Result<Vec<Player>, StorageError>;
    /// Every other player who shared at least one round with `player_id`.
    async fn co_players(&self, player_id: i64) -> Result<Vec<Player>, StorageError>;
    async fn add_player(&self, player: &NewPlayer) -> Result<Player, StorageError>;
    async fn delete_player(&self, player_id: i64) -> Result<bool, StorageError>;

    async fn list_clubs(&self) -> Result<Vec<GolfClub>, StorageError>;
    async fn add_club(&self, club: &NewGolfClub) -> Result<GolfClub, StorageError>;
    async fn list_courses(&self) -> Result<Vec<GolfCourse>, StorageError>;
    async fn get_course(&self, course_id: i64) -> Result<Option<GolfCourse>, StorageError>;
    async fn add_course(&self, course: &NewGolfCourse) -> Result<GolfCourse, StorageError>;
    async fn holes_for_course(&self, course_id: i64) -> Result<Vec<Hole>, StorageError>;

    /// Rounds the player took part in, with every participant's scores.
    async fn rounds_for_player(
        &self,
        player_id: i64,
        status: Option<RoundStatus>,
    ) -> Result<Vec<Round>, StorageError>;
    async fn get_round(&self, round_id: i64) -> Result<Option<Round>, StorageError>;
    /// Rounds the user created or played in as their own profile, newest first.
    async fn recent_rounds_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Round>, StorageError>;
    /// Inserts or updates the round and replaces all of its scores; returns the round id.
    async fn save_round(&self, round: &RoundSubmission) -> Result<i64, StorageError>;
    async fn delete_round(&self, round_id: i64) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct SqlStorage {
    config_and_pool: ConfigAndPool,
}

impl SqlStorage {
    #[must_use]
    pub fn new(config_and_pool: ConfigAndPool) -> Self {
        Self { config_and_pool }
    }
}

#[async_trait]
impl Storage for SqlStorage {
    async fn player_for_user(&self, user_id: &str) -> Result<Option<Player>, StorageError> {
        Ok(database_read::get_player_for_user(&self.config_and_pool, user_id).await?)
    }

    async fn get_player(&self, player_id: i64) -> Result<Option<Player>, StorageError> {
        Ok(database_read::get_player(&self.config_and_pool, player_id).await?)
    }

    async fn list_players(&self, caller: &Caller) -> Result<Vec<Player>, StorageError> {
        let players = database_read::get_all_players(&self.config_and_pool).await?;
        Ok(players
            .into_iter()
            .filter(|p| p.is_visible_to(caller))
            .collect())
    }

    async fn co_players(&self, player_id: i64) -> Result<Vec<Player>, StorageError> {
        Ok(database_read::get_co_players(&self.config_and_pool, player_id).await?)
    }

    async fn add_player(&self, player: &NewPlayer) -> Result<Player, StorageError> {
        let existing = database_read::get_all_players(&self.config_and_pool).await?;
        if let Some(conflict) = database_write::player_conflict(&existing, player) {
            return Err(StorageError::Conflict(conflict));
        }
        Ok(database_write::insert_player(&self.config_and_pool, player).await?)
    }

    async fn delete_player(&self, player_id: i64) -> Result<bool, StorageError> {
        Ok(database_write::delete_player(&self.config_and_pool, player_id).await?)
    }

    async fn list_clubs(&self) -> Result<Vec<GolfClub>, StorageError> {
        Ok(database_read::get_all_clubs(&self.config_and_pool).await?)
    }

    async fn add_club(&self, club: &NewGolfClub) -> Result<GolfClub, StorageError> {
        Ok(database_write::insert_club(&self.config_and_pool, club).await?)
    }

    async fn list_courses(&self) -> Result<Vec<GolfCourse>, StorageError> {
        Ok(database_read::get_all_courses(&self.config_and_pool).await?)
    }

    async fn get_course(&self, course_id: i64) -> Result<Option<GolfCourse>, StorageError> {
        Ok(database_read::get_course(&self.config_and_pool, course_id).await?)
    }

    async fn add_course(&self, course: &NewGolfCourse) -> Result<GolfCourse, StorageError> {
        let course_id = database_write::insert_course(&self.config_and_pool, course).await?;
        database_read::get_course(&self.config_and_pool, course_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("course {course_id} after insert")))
    }

    async fn holes_for_course(&self, course_id: i64) -> Result<Vec<Hole>, StorageError> {
        Ok(database_read::get_holes_for_course(&self.config_and_pool, course_id).await?)
    }

    async fn rounds_for_player(
        &self,
        player_id: i64,
        status: Option<RoundStatus>,
    ) -> Result<Vec<Round>, StorageError> {
        Ok(database_read::get_rounds_for_player(&self.config_and_pool, player_id, status).await?)
    }

    async fn get_round(&self, round_id: i64) -> Result<Option<Round>, StorageError> {
        Ok(database_read::get_round(&self.config_and_pool, round_id).await?)
    }

    async fn recent_rounds_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Round>, StorageError> {
        Ok(database_read::get_recent_rounds_for_user(&self.config_and_pool, user_id, limit).await?)
    }

    async fn save_round(&self, round: &RoundSubmission) -> Result<i64, StorageError> {
        if let Some(round_id) = round.existing_round_id {
            if database_read::get_round(&self.config_and_pool, round_id)
                .await?
                .is_none()
            {
                return Err(StorageError::NotFound(format!("round {round_id}")));
            }
        }
        Ok(database_write::store_round_in_db(&self.config_and_pool, round).await?)
    }

    async fn delete_round(&self, round_id: i64) -> Result<bool, StorageError> {
        Ok(database_write::delete_round(&self.config_and_pool, round_id).await?)
    }
}
