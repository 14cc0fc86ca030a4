use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::model::{NewGolfClub, NewGolfCourse, NewHole, NewPlayer, PlayerLink};
use crate::storage::{Storage, StorageError};

#[derive(Deserialize, Debug, Default)]
struct SeedData {
    #[serde(default)]
    clubs: Vec<SeedClub>,
    #[serde(default)]
    players: Vec<SeedPlayer>,
}

#[derive(Deserialize, Debug)]
struct SeedClub {
    name: String,
    city: Option<String>,
    country: Option<String>,
    website: Option<String>,
    #[serde(default)]
    courses: Vec<SeedCourse>,
}

#[derive(Deserialize, Debug)]
struct SeedCourse {
    name: String,
    default_par: Option<i32>,
    #[serde(default)]
    holes: Vec<NewHole>,
}

#[derive(Deserialize, Debug)]
struct SeedPlayer {
    first_name: String,
    last_name: String,
    handicap: Option<f64>,
    user_id: Option<String>,
    created_by: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrefillSummary {
    pub clubs: usize,
    pub courses: usize,
    pub players: usize,
}

/// Loads clubs, courses with their holes, and players from a seed document.
/// Anything already present (club by name, course by club and name, player
/// by the usual uniqueness rules) is left alone, so reruns are harmless.
///
/// # Errors
///
/// Will return `Err` if the json does not match the seed layout or storage fails
pub async fn db_prefill(
    json: &Value,
    storage: &dyn Storage,
) -> Result<PrefillSummary, StorageError> {
    let seed: SeedData = serde_json::from_value(json.clone())
        .map_err(|e| StorageError::Db(format!("Failed to parse seed json: {e}")))?;
    let mut summary = PrefillSummary::default();

    let mut clubs = storage.list_clubs().await?;
    let mut courses = storage.list_courses().await?;
    for club in seed.clubs {
        let club_id = match clubs.iter().find(|c| c.name == club.name) {
            Some(existing) => existing.golf_club_id,
            None => {
                let created = storage
                    .add_club(&NewGolfClub {
                        name: club.name.clone(),
                        city: club.city,
                        country: club.country,
                        website: club.website,
                    })
                    .await?;
                summary.clubs += 1;
                let id = created.golf_club_id;
                clubs.push(created);
                id
            }
        };
        for course in club.courses {
            if courses
                .iter()
                .any(|c| c.golf_club_id == club_id && c.name == course.name)
            {
                debug!(course = %course.name, "course already present");
                continue;
            }
            let created = storage
                .add_course(&NewGolfCourse {
                    golf_club_id: club_id,
                    name: course.name,
                    default_par: course.default_par,
                    holes: course.holes,
                })
                .await?;
            summary.courses += 1;
            courses.push(created);
        }
    }

    for player in seed.players {
        let link = match (player.user_id, player.created_by) {
            (Some(user_id), _) => PlayerLink::SelfLinked { user_id },
            (None, Some(created_by)) => PlayerLink::Managed { created_by },
            (None, None) => continue,
        };
        let new_player = NewPlayer {
            first_name: player.first_name,
            last_name: player.last_name,
            handicap: player.handicap,
            link,
        };
        match storage.add_player(&new_player).await {
            Ok(_) => summary.players += 1,
            Err(StorageError::Conflict(reason)) => debug!(%reason, "player already present"),
            Err(e) => return Err(e),
        }
    }

    info!(
        clubs = summary.clubs,
        courses = summary.courses,
        players = summary.players,
        "seed data loaded"
    );
    Ok(summary)
}
