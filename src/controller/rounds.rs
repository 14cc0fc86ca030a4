use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::controller::workflow::{RoundRequest, RoundWorkflow};
use crate::error::AppError;
use crate::model::{Caller, Round, RoundStatus};
use crate::storage::Storage;

const DEFAULT_ROUND_LIST_LIMIT: usize = 20;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoundListQuery {
    pub player_id: Option<i64>,
    pub status: Option<RoundStatus>,
    pub limit: Option<usize>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/rounds")
            .route("", web::get().to(list_rounds))
            .route("", web::post().to(create_round))
            .route("/{id}", web::get().to(get_round))
            .route("/{id}", web::put().to(update_round))
            .route("/{id}", web::delete().to(delete_round)),
    );
}

/// A round is readable by its creator, by admins, and by anyone whose own
/// profile played in it.
async fn readable_round(
    storage: &dyn Storage,
    caller: &Caller,
    round_id: i64,
) -> Result<Round, AppError> {
    let round = storage
        .get_round(round_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("round {round_id}")))?;
    if caller.is_admin || round.created_by == caller.user_id {
        return Ok(round);
    }
    match storage.player_for_user(&caller.user_id).await? {
        Some(own) if round.player_ids.contains(&own.player_id) => Ok(round),
        _ => Err(AppError::NotFound(format!("round {round_id}"))),
    }
}

/// Only the creator or an admin may change a round.
async fn owned_round(
    storage: &dyn Storage,
    caller: &Caller,
    round_id: i64,
) -> Result<Round, AppError> {
    let round = readable_round(storage, caller, round_id).await?;
    if caller.is_admin || round.created_by == caller.user_id {
        Ok(round)
    } else {
        Err(AppError::NotFound(format!("round {round_id}")))
    }
}

pub async fn list_rounds(
    caller: Caller,
    storage: Data<dyn Storage>,
    query: web::Query<RoundListQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ROUND_LIST_LIMIT);
    let rounds = match query.player_id {
        Some(player_id) => {
            let player = storage
                .get_player(player_id)
                .await?
                .filter(|p| p.is_visible_to(&caller))
                .ok_or_else(|| AppError::NotFound(format!("player {player_id}")))?;
            let mut rounds = storage
                .rounds_for_player(player.player_id, query.status)
                .await?;
            rounds.reverse();
            rounds.truncate(limit);
            rounds
        }
        None => {
            let mut rounds = storage.recent_rounds_for_user(&caller.user_id, limit).await?;
            if let Some(status) = query.status {
                rounds.retain(|r| r.status == status);
            }
            rounds
        }
    };
    Ok(HttpResponse::Ok().json(rounds))
}

pub async fn create_round(
    caller: Caller,
    storage: Data<dyn Storage>,
    body: web::Json<RoundRequest>,
) -> Result<HttpResponse, AppError> {
    let workflow = RoundWorkflow::new(storage.get_ref(), &caller);
    let mut session = workflow.start(Local::now().date_naive());
    let round_id = workflow.submit(&mut session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "round_id": round_id, "session": session })))
}

pub async fn get_round(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let round = readable_round(storage.get_ref(), &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(round))
}

pub async fn update_round(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
    body: web::Json<RoundRequest>,
) -> Result<HttpResponse, AppError> {
    let round = owned_round(storage.get_ref(), &caller, path.into_inner()).await?;
    let workflow = RoundWorkflow::new(storage.get_ref(), &caller);
    let mut session = workflow.load(round.round_id).await?;
    let round_id = workflow.submit(&mut session, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "round_id": round_id, "session": session })))
}

pub async fn delete_round(
    caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let round = owned_round(storage.get_ref(), &caller, path.into_inner()).await?;
    storage.delete_round(round.round_id).await?;
    info!(round_id = round.round_id, user_id = %caller.user_id, "round deleted");
    Ok(HttpResponse::NoContent().finish())
}
