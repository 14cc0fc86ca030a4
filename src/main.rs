use std::sync::Arc;

use actix_files::Files;
use actix_web::web::{self, Data};
use actix_web::{App, HttpResponse, HttpServer};
use deadpool_postgres::{ManagerConfig, RecyclingMethod};
use sql_middleware::middleware::{ConfigAndPool, DatabaseType};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use golf_tracker::args::{self, CleanArgs};
use golf_tracker::controller::{courses, db_prefill, players, report, rounds};
use golf_tracker::model::SQLITE_SCHEMA;
use golf_tracker::model::database_write::execute_batch_sql;
use golf_tracker::storage::{SqlStorage, Storage};
use golf_tracker::view;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match args::args_checks() {
        Ok(args) => args,
        Err(e) => {
            error!(error = %e, "invalid arguments");
            std::process::exit(1);
        }
    };

    let config_and_pool = connect(&args).await?;

    if args.db_type == DatabaseType::Sqlite {
        execute_batch_sql(&config_and_pool, &SQLITE_SCHEMA.join("\n")).await?;
    }
    if !args.combined_sql_script.trim().is_empty() {
        execute_batch_sql(&config_and_pool, &args.combined_sql_script).await?;
        info!("startup scripts applied");
    }

    let storage: Arc<dyn Storage> = Arc::new(SqlStorage::new(config_and_pool));
    if let Some(seed) = &args.db_populate_json {
        db_prefill::db_prefill(seed, storage.as_ref()).await?;
    }

    let bind = (args.bind_address.clone(), args.bind_port);
    info!(address = %bind.0, port = bind.1, "starting server");
    let storage_data: Data<dyn Storage> = Data::from(storage);
    HttpServer::new(move || {
        App::new()
            .app_data(storage_data.clone())
            .configure(report::configure)
            .configure(players::configure)
            .configure(rounds::configure)
            .configure(courses::configure)
            .route("/report", web::get().to(view::report::report_page))
            .route("/health", web::get().to(HttpResponse::Ok))
            .service(Files::new("/static", "./static"))
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}

async fn connect(args: &CleanArgs) -> Result<ConfigAndPool, Box<dyn std::error::Error>> {
    if args.db_type == DatabaseType::Postgres {
        let mut postgres_config = deadpool_postgres::Config::new();
        postgres_config.dbname = Some(args.db_name.clone());
        postgres_config.host.clone_from(&args.db_host);
        postgres_config.port = args.db_port;
        postgres_config.user.clone_from(&args.db_user);
        postgres_config.password.clone_from(&args.db_password);
        postgres_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        Ok(ConfigAndPool::new_postgres(postgres_config).await?)
    } else {
        Ok(ConfigAndPool::new_sqlite(args.db_name.clone()).await?)
    }
}
