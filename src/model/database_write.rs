use sql_middleware::middleware::{
    ConfigAndPool, ConversionMode, MiddlewarePool, MiddlewarePoolConnection, QueryAndParams,
    RowValues,
};
use sql_middleware::{SqlMiddlewareDbError, SqliteParamsExecute, convert_sql_params};

use crate::model::types::{
    GolfClub, NewGolfClub, NewGolfCourse, NewPlayer, Player, PlayerLink, RoundSubmission,
};

/// Runs a multi-statement script in one transaction.
///
/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn execute_batch_sql(
    config_and_pool: &ConfigAndPool,
    query: &str,
) -> Result<(), SqlMiddlewareDbError> {
    let pool = config_and_pool.pool.get().await?;
    let conn = MiddlewarePool::get_connection(pool).await?;
    let script = query.to_string();

    match conn {
        MiddlewarePoolConnection::Postgres(mut pg_conn) => {
            let tx = pg_conn.transaction().await?;
            tx.batch_execute(&script).await?;
            tx.commit().await?;
            Ok(())
        }
        MiddlewarePoolConnection::Sqlite(sqlite_conn) => {
            sqlite_conn
                .interact(move |db_conn| {
                    let tx = db_conn.transaction()?;
                    tx.execute_batch(&script)?;
                    tx.commit()?;
                    Ok::<_, SqlMiddlewareDbError>(())
                })
                .await?
        }
        #[allow(unreachable_patterns)]
        _ => Err(unsupported()),
    }
}

fn unsupported() -> SqlMiddlewareDbError {
    SqlMiddlewareDbError::Other("Database type not supported for this operation".to_string())
}

/// A statement run after the parent insert. When `with_parent_id` is set the
/// parent's new row id is bound as `?1` ahead of `params`.
struct ChildStatement {
    query: String,
    params: Vec<RowValues>,
    with_parent_id: bool,
}

impl ChildStatement {
    fn new(query: &str, params: Vec<RowValues>) -> Self {
        Self {
            query: query.to_string(),
            params,
            with_parent_id: false,
        }
    }

    fn of_parent(query: &str, params: Vec<RowValues>) -> Self {
        Self {
            with_parent_id: true,
            ..Self::new(query, params)
        }
    }
}

/// Runs `head` and then every statement in `children` inside one transaction.
/// Returns the row id produced by `head`.
async fn run_in_transaction(
    config_and_pool: &ConfigAndPool,
    head: QueryAndParams,
    children: Vec<ChildStatement>,
) -> Result<i64, SqlMiddlewareDbError> {
    let pool = config_and_pool.pool.get().await?;
    let conn = MiddlewarePool::get_connection(pool).await?;

    match &conn {
        MiddlewarePoolConnection::Sqlite(sqlite_conn) => {
            sqlite_conn
                .interact(move |db_conn| {
                    let tx = db_conn.transaction()?;
                    let head_id = {
                        let converted = convert_sql_params::<SqliteParamsExecute>(
                            &head.params,
                            ConversionMode::Execute,
                        )?;
                        let mut stmt = tx.prepare(&head.query)?;
                        stmt.execute(converted.0)?;
                        tx.last_insert_rowid()
                    };
                    for child in children {
                        let mut params = Vec::with_capacity(child.params.len() + 1);
                        if child.with_parent_id {
                            params.push(RowValues::Int(head_id));
                        }
                        params.extend(child.params);
                        let converted = convert_sql_params::<SqliteParamsExecute>(
                            &params,
                            ConversionMode::Execute,
                        )?;
                        let mut stmt = tx.prepare(&child.query)?;
                        stmt.execute(converted.0)?;
                    }
                    tx.commit()?;
                    Ok::<_, SqlMiddlewareDbError>(head_id)
                })
                .await?
        }
        _ => Err(unsupported()),
    }
}

async fn run_single(
    config_and_pool: &ConfigAndPool,
    query: &str,
    params: Vec<RowValues>,
) -> Result<i64, SqlMiddlewareDbError> {
    run_in_transaction(
        config_and_pool,
        QueryAndParams {
            query: query.to_string(),
            params,
        },
        vec![],
    )
    .await
}

fn opt_text(value: Option<&String>) -> RowValues {
    value.map_or(RowValues::Null, |v| RowValues::Text(v.clone()))
}

fn opt_int(value: Option<i32>) -> RowValues {
    value.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v)))
}

/// Reason a new player cannot be stored alongside `existing`, if any.
#[must_use]
pub fn player_conflict(existing: &[Player], new_player: &NewPlayer) -> Option<String> {
    match &new_player.link {
        PlayerLink::SelfLinked { user_id } => existing
            .iter()
            .any(|p| matches!(&p.link, PlayerLink::SelfLinked { user_id: u } if u == user_id))
            .then(|| format!("User {user_id} is already linked to a player")),
        PlayerLink::Managed { created_by } => existing
            .iter()
            .any(|p| {
                matches!(&p.link, PlayerLink::Managed { created_by: c } if c == created_by)
                    && p.first_name.eq_ignore_ascii_case(new_player.first_name.trim())
                    && p.last_name.eq_ignore_ascii_case(new_player.last_name.trim())
            })
            .then(|| {
                format!(
                    "A player named {} {} already exists",
                    new_player.first_name.trim(),
                    new_player.last_name.trim()
                )
            }),
    }
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn insert_player(
    config_and_pool: &ConfigAndPool,
    new_player: &NewPlayer,
) -> Result<Player, SqlMiddlewareDbError> {
    let (user_id, created_by) = match &new_player.link {
        PlayerLink::SelfLinked { user_id } => (Some(user_id), None),
        PlayerLink::Managed { created_by } => (None, Some(created_by)),
    };
    let first_name = new_player.first_name.trim().to_string();
    let last_name = new_player.last_name.trim().to_string();
    let player_id = run_single(
        config_and_pool,
        "INSERT INTO player (first_name, last_name, handicap, user_id, created_by) VALUES (?1, ?2, ?3, ?4, ?5);",
        vec![
            RowValues::Text(first_name.clone()),
            RowValues::Text(last_name.clone()),
            new_player.handicap.map_or(RowValues::Null, RowValues::Float),
            opt_text(user_id),
            opt_text(created_by),
        ],
    )
    .await?;
    Ok(Player {
        player_id,
        first_name,
        last_name,
        handicap: new_player.handicap,
        link: new_player.link.clone(),
    })
}

/// Removes the player with their scores and round links.
///
/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn delete_player(
    config_and_pool: &ConfigAndPool,
    player_id: i64,
) -> Result<bool, SqlMiddlewareDbError> {
    if crate::model::database_read::get_player(config_and_pool, player_id)
        .await?
        .is_none()
    {
        return Ok(false);
    }
    let id = RowValues::Int(player_id);
    run_in_transaction(
        config_and_pool,
        QueryAndParams {
            query: "DELETE FROM score WHERE player_id = ?1;".to_string(),
            params: vec![id.clone()],
        },
        vec![
            ChildStatement::new(
                "DELETE FROM round_player WHERE player_id = ?1;",
                vec![id.clone()],
            ),
            ChildStatement::new("DELETE FROM player WHERE player_id = ?1;", vec![id]),
        ],
    )
    .await?;
    Ok(true)
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn insert_club(
    config_and_pool: &ConfigAndPool,
    club: &NewGolfClub,
) -> Result<GolfClub, SqlMiddlewareDbError> {
    let golf_club_id = run_single(
        config_and_pool,
        "INSERT INTO golf_club (name, city, country, website) VALUES (?1, ?2, ?3, ?4);",
        vec![
            RowValues::Text(club.name.clone()),
            opt_text(club.city.as_ref()),
            opt_text(club.country.as_ref()),
            opt_text(club.website.as_ref()),
        ],
    )
    .await?;
    Ok(GolfClub {
        golf_club_id,
        name: club.name.clone(),
        city: club.city.clone(),
        country: club.country.clone(),
        website: club.website.clone(),
    })
}

/// Inserts the course and its holes; returns the new course id.
///
/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn insert_course(
    config_and_pool: &ConfigAndPool,
    course: &NewGolfCourse,
) -> Result<i64, SqlMiddlewareDbError> {
    let number_of_holes = if course.holes.is_empty() {
        18
    } else {
        i64::try_from(course.holes.len()).unwrap_or(18)
    };
    let head = QueryAndParams {
        query: "INSERT INTO golf_course (golf_club_id, name, default_par, number_of_holes) VALUES (?1, ?2, ?3, ?4);"
            .to_string(),
        params: vec![
            RowValues::Int(course.golf_club_id),
            RowValues::Text(course.name.clone()),
            RowValues::Int(i64::from(course.default_par.unwrap_or(72))),
            RowValues::Int(number_of_holes),
        ],
    };
    let holes = course
        .holes
        .iter()
        .map(|hole| {
            ChildStatement::of_parent(
                "INSERT INTO hole (golf_course_id, hole_number, par, stroke_index, length_yards) VALUES (?1, ?2, ?3, ?4, ?5);",
                vec![
                    RowValues::Int(i64::from(hole.hole_number)),
                    RowValues::Int(i64::from(hole.par)),
                    opt_int(hole.stroke_index),
                    opt_int(hole.length_yards),
                ],
            )
        })
        .collect();
    run_in_transaction(config_and_pool, head, holes).await
}

/// Writes the round, replaces its player links and replaces every score in one
/// transaction. Returns the round id.
///
/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn store_round_in_db(
    config_and_pool: &ConfigAndPool,
    round: &RoundSubmission,
) -> Result<i64, SqlMiddlewareDbError> {
    let mut setup = vec![
        RowValues::Int(round.golf_course_id),
        RowValues::Text(round.date_played.format("%Y-%m-%d").to_string()),
        RowValues::Int(i64::from(round.starting_hole)),
        RowValues::Int(i64::from(round.holes_played)),
        RowValues::Int(round.round_type.as_i64()),
        RowValues::Int(round.status.as_i64()),
        opt_text(round.notes.as_ref()),
    ];

    // on edit the round id is known up front, otherwise children bind the new id
    let child = |query: &str, params: Vec<RowValues>| match round.existing_round_id {
        Some(round_id) => {
            let mut with_id = vec![RowValues::Int(round_id)];
            with_id.extend(params);
            ChildStatement::new(query, with_id)
        }
        None => ChildStatement::of_parent(query, params),
    };

    let mut children = vec![];
    let head = match round.existing_round_id {
        Some(round_id) => {
            setup.push(RowValues::Int(round_id));
            children.push(child("DELETE FROM score WHERE round_id = ?1;", vec![]));
            children.push(child("DELETE FROM round_player WHERE round_id = ?1;", vec![]));
            QueryAndParams {
                query: "UPDATE round SET golf_course_id = ?1, date_played = ?2, starting_hole = ?3, holes_played = ?4, \
                        round_type = ?5, status = ?6, notes = ?7 WHERE round_id = ?8;"
                    .to_string(),
                params: setup,
            }
        }
        None => {
            setup.push(RowValues::Text(round.created_by.clone()));
            QueryAndParams {
                query: "INSERT INTO round (golf_course_id, date_played, starting_hole, holes_played, round_type, status, notes, created_by) \
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
                    .to_string(),
                params: setup,
            }
        }
    };

    for player_id in &round.player_ids {
        children.push(child(
            "INSERT INTO round_player (round_id, player_id) VALUES (?1, ?2);",
            vec![RowValues::Int(*player_id)],
        ));
    }
    for score in &round.scores {
        children.push(child(
            "INSERT INTO score (round_id, player_id, hole_id, strokes, putts, fairway_hit) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            vec![
                RowValues::Int(score.player_id),
                RowValues::Int(score.hole_id),
                RowValues::Int(i64::from(score.strokes)),
                opt_int(score.putts),
                score
                    .fairway_hit
                    .map_or(RowValues::Null, |hit| RowValues::Int(i64::from(hit))),
            ],
        ));
    }

    let head_id = run_in_transaction(config_and_pool, head, children).await?;
    Ok(round.existing_round_id.unwrap_or(head_id))
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn delete_round(
    config_and_pool: &ConfigAndPool,
    round_id: i64,
) -> Result<bool, SqlMiddlewareDbError> {
    if crate::model::database_read::get_round(config_and_pool, round_id)
        .await?
        .is_none()
    {
        return Ok(false);
    }
    let id = RowValues::Int(round_id);
    run_in_transaction(
        config_and_pool,
        QueryAndParams {
            query: "DELETE FROM score WHERE round_id = ?1;".to_string(),
            params: vec![id.clone()],
        },
        vec![
            ChildStatement::new(
                "DELETE FROM round_player WHERE round_id = ?1;",
                vec![id.clone()],
            ),
            ChildStatement::new("DELETE FROM round WHERE round_id = ?1;", vec![id]),
        ],
    )
    .await?;
    Ok(true)
}
