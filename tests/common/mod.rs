use std::time::{SystemTime, UNIX_EPOCH};

use golf_tracker::model::database_write::execute_batch_sql;
use golf_tracker::model::{Caller, SQLITE_DROP_TABLES, SQLITE_SCHEMA};
use golf_tracker::storage::SqlStorage;
use sql_middleware::SqlMiddlewareDbError;
use sql_middleware::middleware::ConfigAndPool;

pub const FIXTURE_SQL: &str = include_str!("../fixture.sql");

/// Fresh in-memory database with the schema applied and `fixture_sql` loaded.
pub async fn setup_test_context(fixture_sql: &str) -> Result<SqlStorage, SqlMiddlewareDbError> {
    let db_name = format!(
        "file:test_db_{}?mode=memory&cache=shared",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time went backwards")
            .as_nanos()
    );
    let config_and_pool = ConfigAndPool::new_sqlite(db_name).await?;

    execute_batch_sql(&config_and_pool, SQLITE_DROP_TABLES).await?;
    execute_batch_sql(&config_and_pool, &SQLITE_SCHEMA.join("\n")).await?;
    if !fixture_sql.is_empty() {
        execute_batch_sql(&config_and_pool, fixture_sql).await?;
    }

    Ok(SqlStorage::new(config_and_pool))
}

pub fn caller(user_id: &str) -> Caller {
    Caller {
        user_id: user_id.to_string(),
        is_admin: false,
    }
}

pub fn admin(user_id: &str) -> Caller {
    Caller {
        user_id: user_id.to_string(),
        is_admin: true,
    }
}
