use clap::Parser;
use serde_json::Value;
use sql_middleware::middleware::DatabaseType;

/// Golf round tracker: score entry, player management and reports over http.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backing database, sqlite or postgres. Data queries need sqlite.
    #[arg(
        short = 'd',
        long,
        value_name = "DB_TYPE",
        default_value = "Sqlite",
        value_parser = clap::value_parser!(DatabaseType)
    )]
    pub db_type: DatabaseType,
    /// Sqlite file name, or the postgres database name.
    #[arg(short = 'n', long, value_name = "DB_NAME", default_value = "golf_tracker.db")]
    pub db_name: String,

    // postgres connection, ignored for sqlite
    #[arg(long, value_name = "DB_HOST", default_value = "localhost")]
    pub db_host: Option<String>,
    #[arg(short = 'p', long, value_name = "DB_PORT", default_value = "5432")]
    pub db_port: Option<u16>,
    #[arg(short = 'u', long, value_name = "DB_USER", default_value = "postgres")]
    pub db_user: Option<String>,
    /// Password, or the path of a mounted secret holding it.
    #[arg(short = 'w', long, value_name = "DB_PASSWORD")]
    pub db_password: Option<String>,

    /// Sql files run on startup, separated by `;`. Runs after the schema is created.
    #[arg(
        long,
        value_name = "SQL_FILES",
        value_parser = crate::args::validation::check_readable_file
    )]
    pub db_startup_script: Option<String>,
    /// Clubs, courses with holes, and players to load when missing.
    #[arg(
        long,
        value_name = "SEED_JSON",
        value_parser = crate::args::validation::check_readable_file_and_json
    )]
    pub db_populate_json: Option<Value>,

    #[arg(short = 'b', long, value_name = "ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,
    #[arg(long, value_name = "PORT", default_value = "5201")]
    pub bind_port: u16,
}

/// Validated settings the server starts from.
#[derive(Debug, Clone)]
pub struct CleanArgs {
    pub db_type: DatabaseType,
    pub db_name: String,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_populate_json: Option<Value>,
    /// Every startup script concatenated in the order given.
    pub combined_sql_script: String,
    pub bind_address: String,
    pub bind_port: u16,
}
