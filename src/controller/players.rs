use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use serde::Deserialize;
use tracing::info;

use crate::controller::report::data_service;
use crate::controller::report::ReportQuery;
use crate::error::AppError;
use crate::model::{Caller, NewPlayer, Player, PlayerLink};
use crate::storage::{Storage, StorageError};

#[derive(Deserialize, Debug)]
pub struct PlayerRequest {
    pub first_name: String,
    pub last_name: String,
    pub handicap: Option<f64>,
    /// Link the new profile to the caller's own identity instead of managing it as a guest.
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<String>,
    /// Comma separated ids to leave out, usually players already in a round.
    pub exclude_ids: Option<String>,
}

impl SearchQuery {
    fn excluded(&self) -> Vec<i64> {
        self.exclude_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/players")
            .route("", web::get().to(list_players))
            .route("", web::post().to(create_player))
            .route("/search", web::get().to(search_players))
            .route("/{id}", web::get().to(get_player))
            .route("/{id}", web::delete().to(delete_player))
            .route("/{id}/report", web::get().to(player_report)),
    );
}

/// Players visible to the caller whose full name contains `term`, ignoring case.
///
/// # Errors
///
/// Will return `Err` if the storage query fails
pub async fn find_players(
    storage: &dyn Storage,
    caller: &Caller,
    term: &str,
    exclude_ids: &[i64],
) -> Result<Vec<Player>, StorageError> {
    let needle = term.trim().to_lowercase();
    Ok(storage
        .list_players(caller)
        .await?
        .into_iter()
        .filter(|p| !exclude_ids.contains(&p.player_id))
        .filter(|p| needle.is_empty() || p.full_name().to_lowercase().contains(&needle))
        .collect())
}

async fn visible_player(
    storage: &dyn Storage,
    caller: &Caller,
    player_id: i64,
) -> Result<Player, AppError> {
    storage
        .get_player(player_id)
        .await?
        .filter(|p| p.is_visible_to(caller))
        .ok_or_else(|| AppError::NotFound(format!("player {player_id}")))
}

pub async fn list_players(
    caller: Caller,
    storage: Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    let players = storage.list_players(&caller).await?;
    Ok(HttpResponse::Ok().json(players))
}

pub async fn create_player(
    caller: Caller,
    storage: Data<dyn Storage>,
    body: web::Json<PlayerRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "First and last name are required".to_string(),
        ));
    }
    let link = if body.is_self {
        PlayerLink::SelfLinked {
            user_id: caller.user_id.clone(),
        }
    } else {
        PlayerLink::Managed {
            created_by: caller.user_id.clone(),
        }
    };
    let player = storage
        .add_player(&NewPlayer {
            first_name: body.first_name,
            last_name: body.last_name,
            handicap: body.handicap,
            link,
        })
        .await?;
    info!(player_id = player.player_id, user_id = %caller.user_id, "player created");
    Ok(HttpResponse::Created().json(player))
}

pub async fn search_players(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let term = query.search_term.clone().unwrap_or_default();
    let players = find_players(storage.get_ref(), &caller, &term, &query.excluded()).await?;
    Ok(HttpResponse::Ok().json(players))
}

pub async fn get_player(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let player = visible_player(storage.get_ref(), &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(player))
}

pub async fn delete_player(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let player = visible_player(storage.get_ref(), &caller, path.into_inner()).await?;
    storage.delete_player(player.player_id).await?;
    info!(player_id = player.player_id, "player deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub async fn player_report(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let player = visible_player(storage.get_ref(), &caller, path.into_inner()).await?;
    let report = data_service::player_report(storage.get_ref(), player, &query.filter()).await?;
    Ok(HttpResponse::Ok().json(report))
}
