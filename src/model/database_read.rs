use chrono::NaiveDate;
use sql_middleware::middleware::{
    ConfigAndPool, ConversionMode, CustomDbRow, MiddlewarePool, MiddlewarePoolConnection,
    QueryAndParams, ResultSet, RowValues,
};
use sql_middleware::{SqlMiddlewareDbError, SqliteParamsQuery, convert_sql_params};

use crate::model::types::{
    GolfClub, GolfCourse, Hole, Player, PlayerLink, Round, RoundStatus, RoundType, Score,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Runs a read query against the pooled sqlite connection.
///
/// # Errors
///
/// Will return `Err` if the query fails or the connection is not sqlite
pub async fn execute_query(
    conn: &MiddlewarePoolConnection,
    query: &str,
    params: Vec<RowValues>,
) -> Result<ResultSet, SqlMiddlewareDbError> {
    let query_and_params = QueryAndParams {
        query: query.to_string(),
        params,
    };

    match conn {
        MiddlewarePoolConnection::Sqlite(sqlite_conn) => {
            sqlite_conn
                .interact(move |db_conn| {
                    let converted_params = convert_sql_params::<SqliteParamsQuery>(
                        &query_and_params.params,
                        ConversionMode::Query,
                    )?;
                    let tx = db_conn.transaction()?;
                    let result_set = {
                        let mut stmt = tx.prepare(&query_and_params.query)?;
                        sql_middleware::sqlite_build_result_set(&mut stmt, &converted_params.0)?
                    };
                    tx.commit()?;
                    Ok::<_, SqlMiddlewareDbError>(result_set)
                })
                .await?
        }
        _ => Err(SqlMiddlewareDbError::Other(
            "Database type not supported for this operation".to_string(),
        )),
    }
}

async fn select(
    config_and_pool: &ConfigAndPool,
    query: &str,
    params: Vec<RowValues>,
) -> Result<Vec<CustomDbRow>, SqlMiddlewareDbError> {
    let pool = config_and_pool.pool.get().await?;
    let conn = MiddlewarePool::get_connection(pool).await?;
    Ok(execute_query(&conn, query, params).await?.results)
}

fn int(row: &CustomDbRow, field: &str) -> Option<i64> {
    row.get(field).and_then(|v| v.as_int()).copied()
}

fn int32(row: &CustomDbRow, field: &str) -> Option<i32> {
    int(row, field).and_then(|v| i32::try_from(v).ok())
}

fn text(row: &CustomDbRow, field: &str) -> Option<String> {
    row.get(field)
        .and_then(|v| v.as_text())
        .map(ToString::to_string)
}

fn required_int(row: &CustomDbRow, field: &str) -> Result<i64, SqlMiddlewareDbError> {
    int(row, field).ok_or_else(|| SqlMiddlewareDbError::Other(format!("{field} not found")))
}

fn required_text(row: &CustomDbRow, field: &str) -> Result<String, SqlMiddlewareDbError> {
    text(row, field).ok_or_else(|| SqlMiddlewareDbError::Other(format!("{field} not found")))
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// # Errors
///
/// Will return `Err` if a column is missing or a field is malformed
pub fn player_from_row(row: &CustomDbRow) -> Result<Player, SqlMiddlewareDbError> {
    let link = match (text(row, "user_id"), text(row, "created_by")) {
        (Some(user_id), _) => PlayerLink::SelfLinked { user_id },
        (None, Some(created_by)) => PlayerLink::Managed { created_by },
        (None, None) => {
            return Err(SqlMiddlewareDbError::Other(
                "Player has neither user_id nor created_by".to_string(),
            ));
        }
    };
    Ok(Player {
        player_id: required_int(row, "player_id")?,
        first_name: required_text(row, "first_name")?,
        last_name: required_text(row, "last_name")?,
        handicap: row.get("handicap").and_then(|v| v.as_float()),
        link,
    })
}

fn course_from_row(row: &CustomDbRow) -> Result<GolfCourse, SqlMiddlewareDbError> {
    Ok(GolfCourse {
        golf_course_id: required_int(row, "golf_course_id")?,
        golf_club_id: required_int(row, "golf_club_id")?,
        club_name: text(row, "club_name").unwrap_or_default(),
        name: required_text(row, "name")?,
        default_par: int32(row, "default_par").unwrap_or(72),
        number_of_holes: int32(row, "number_of_holes").unwrap_or(18),
    })
}

fn round_from_row(row: &CustomDbRow) -> Result<Round, SqlMiddlewareDbError> {
    let date_text = required_text(row, "date_played")?;
    let date_played = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|e| {
        SqlMiddlewareDbError::Other(format!("Failed to parse date_played {date_text}: {e}"))
    })?;
    Ok(Round {
        round_id: required_int(row, "round_id")?,
        golf_course_id: required_int(row, "golf_course_id")?,
        course_name: text(row, "course_name").unwrap_or_default(),
        date_played,
        starting_hole: int32(row, "starting_hole").unwrap_or(1),
        holes_played: int32(row, "holes_played").unwrap_or(18),
        round_type: RoundType::from_i64(int(row, "round_type").unwrap_or_default()),
        status: RoundStatus::from_i64(int(row, "status").unwrap_or_default()),
        notes: text(row, "notes"),
        created_by: required_text(row, "created_by")?,
        player_ids: vec![],
        scores: vec![],
    })
}

fn score_from_row(row: &CustomDbRow) -> Result<Score, SqlMiddlewareDbError> {
    Ok(Score {
        score_id: required_int(row, "score_id")?,
        round_id: required_int(row, "round_id")?,
        player_id: required_int(row, "player_id")?,
        hole_id: required_int(row, "hole_id")?,
        hole_number: int32(row, "hole_number").unwrap_or_default(),
        par: int32(row, "par").unwrap_or_default(),
        strokes: int32(row, "strokes").unwrap_or_default(),
        putts: int32(row, "putts"),
        fairway_hit: int(row, "fairway_hit").map(|v| v != 0),
    })
}

/// Fills in participants and scores for rounds that were read without them.
async fn attach_players_and_scores(
    config_and_pool: &ConfigAndPool,
    mut rounds: Vec<Round>,
) -> Result<Vec<Round>, SqlMiddlewareDbError> {
    if rounds.is_empty() {
        return Ok(rounds);
    }
    let ids: Vec<RowValues> = rounds.iter().map(|r| RowValues::Int(r.round_id)).collect();
    let in_list = placeholders(ids.len());

    let player_rows = select(
        config_and_pool,
        &format!(
            "SELECT round_id, player_id FROM round_player WHERE round_id IN ({in_list}) ORDER BY round_id, player_id;"
        ),
        ids.clone(),
    )
    .await?;
    let score_rows = select(
        config_and_pool,
        &format!(
            "SELECT s.score_id, s.round_id, s.player_id, s.hole_id, h.hole_number, h.par, \
             s.strokes, s.putts, s.fairway_hit \
             FROM score s JOIN hole h ON h.hole_id = s.hole_id \
             WHERE s.round_id IN ({in_list}) ORDER BY s.round_id, s.player_id, h.hole_number;"
        ),
        ids,
    )
    .await?;
    let scores = score_rows
        .iter()
        .map(score_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    for round in &mut rounds {
        round.player_ids = player_rows
            .iter()
            .filter(|row| int(row, "round_id") == Some(round.round_id))
            .filter_map(|row| int(row, "player_id"))
            .collect();
        round.scores = scores
            .iter()
            .filter(|s| s.round_id == round.round_id)
            .cloned()
            .collect();
    }
    Ok(rounds)
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_all_players(
    config_and_pool: &ConfigAndPool,
) -> Result<Vec<Player>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        include_str!("../sql/functions/sqlite/01_sp_get_players.sql"),
        vec![],
    )
    .await?;
    rows.iter().map(player_from_row).collect()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_player(
    config_and_pool: &ConfigAndPool,
    player_id: i64,
) -> Result<Option<Player>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT player_id, first_name, last_name, handicap, user_id, created_by FROM player WHERE player_id = ?1;",
        vec![RowValues::Int(player_id)],
    )
    .await?;
    rows.first().map(player_from_row).transpose()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_player_for_user(
    config_and_pool: &ConfigAndPool,
    user_id: &str,
) -> Result<Option<Player>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT player_id, first_name, last_name, handicap, user_id, created_by FROM player WHERE user_id = ?1;",
        vec![RowValues::Text(user_id.to_string())],
    )
    .await?;
    rows.first().map(player_from_row).transpose()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_co_players(
    config_and_pool: &ConfigAndPool,
    player_id: i64,
) -> Result<Vec<Player>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        include_str!("../sql/functions/sqlite/02_sp_get_co_players.sql"),
        vec![RowValues::Int(player_id)],
    )
    .await?;
    rows.iter().map(player_from_row).collect()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_all_clubs(
    config_and_pool: &ConfigAndPool,
) -> Result<Vec<GolfClub>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT golf_club_id, name, city, country, website FROM golf_club ORDER BY name;",
        vec![],
    )
    .await?;
    rows.iter()
        .map(|row| {
            Ok(GolfClub {
                golf_club_id: required_int(row, "golf_club_id")?,
                name: required_text(row, "name")?,
                city: text(row, "city"),
                country: text(row, "country"),
                website: text(row, "website"),
            })
        })
        .collect()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_all_courses(
    config_and_pool: &ConfigAndPool,
) -> Result<Vec<GolfCourse>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        include_str!("../sql/functions/sqlite/03_sp_get_courses.sql"),
        vec![],
    )
    .await?;
    rows.iter().map(course_from_row).collect()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_course(
    config_and_pool: &ConfigAndPool,
    course_id: i64,
) -> Result<Option<GolfCourse>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT gc.golf_course_id, gc.golf_club_id, c.name AS club_name, gc.name, gc.default_par, gc.number_of_holes \
         FROM golf_course gc JOIN golf_club c ON c.golf_club_id = gc.golf_club_id WHERE gc.golf_course_id = ?1;",
        vec![RowValues::Int(course_id)],
    )
    .await?;
    rows.first().map(course_from_row).transpose()
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_holes_for_course(
    config_and_pool: &ConfigAndPool,
    course_id: i64,
) -> Result<Vec<Hole>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT hole_id, golf_course_id, hole_number, par, stroke_index, length_yards \
         FROM hole WHERE golf_course_id = ?1 ORDER BY hole_number;",
        vec![RowValues::Int(course_id)],
    )
    .await?;
    rows.iter()
        .map(|row| {
            Ok(Hole {
                hole_id: required_int(row, "hole_id")?,
                golf_course_id: required_int(row, "golf_course_id")?,
                hole_number: int32(row, "hole_number").unwrap_or_default(),
                par: int32(row, "par").unwrap_or_default(),
                stroke_index: int32(row, "stroke_index"),
                length_yards: int32(row, "length_yards"),
            })
        })
        .collect()
}

/// Rounds the player took part in, oldest first.
///
/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_rounds_for_player(
    config_and_pool: &ConfigAndPool,
    player_id: i64,
    status: Option<RoundStatus>,
) -> Result<Vec<Round>, SqlMiddlewareDbError> {
    let status_param = status.map_or(RowValues::Null, |s| RowValues::Int(s.as_i64()));
    let rows = select(
        config_and_pool,
        include_str!("../sql/functions/sqlite/04_sp_get_rounds_for_player.sql"),
        vec![RowValues::Int(player_id), status_param],
    )
    .await?;
    let rounds = rows
        .iter()
        .map(round_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    attach_players_and_scores(config_and_pool, rounds).await
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_round(
    config_and_pool: &ConfigAndPool,
    round_id: i64,
) -> Result<Option<Round>, SqlMiddlewareDbError> {
    let rows = select(
        config_and_pool,
        "SELECT r.round_id, r.golf_course_id, gc.name AS course_name, r.date_played, r.starting_hole, \
         r.holes_played, r.round_type, r.status, r.notes, r.created_by \
         FROM round r JOIN golf_course gc ON gc.golf_course_id = r.golf_course_id WHERE r.round_id = ?1;",
        vec![RowValues::Int(round_id)],
    )
    .await?;
    let rounds = rows
        .iter()
        .map(round_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attach_players_and_scores(config_and_pool, rounds)
        .await?
        .into_iter()
        .next())
}

/// # Errors
///
/// Will return `Err` if the database query fails
pub async fn get_recent_rounds_for_user(
    config_and_pool: &ConfigAndPool,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Round>, SqlMiddlewareDbError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = select(
        config_and_pool,
        include_str!("../sql/functions/sqlite/05_sp_get_recent_rounds_for_user.sql"),
        vec![RowValues::Text(user_id.to_string()), RowValues::Int(limit)],
    )
    .await?;
    let rounds = rows
        .iter()
        .map(round_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    attach_players_and_scores(config_and_pool, rounds).await
}
