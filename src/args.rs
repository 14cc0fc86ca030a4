use clap::Parser;
use std::fs;
use tracing::warn;

pub mod database;
pub mod types;
pub mod validation;

pub use types::{Args, CleanArgs};

/// # Errors
///
/// Will return `Err` if the arguments are invalid
pub fn args_checks() -> Result<CleanArgs, String> {
    let mut args = Args::parse();
    args.validate()?;
    Ok(CleanArgs::new(args))
}

impl CleanArgs {
    #[must_use]
    pub fn new(args: Args) -> Self {
        let mut combined_sql_script = String::new();
        if let Some(db_startup_script) = &args.db_startup_script {
            for file in db_startup_script.split(';').map(str::trim) {
                if file.is_empty() {
                    continue;
                }
                match fs::read_to_string(file) {
                    Ok(script) => {
                        combined_sql_script.push_str(&script);
                        combined_sql_script.push('\n');
                    }
                    Err(e) => warn!(file, error = %e, "skipping unreadable sql startup script"),
                }
            }
        }
        CleanArgs {
            db_type: args.db_type,
            db_host: args.db_host,
            db_port: args.db_port,
            db_user: args.db_user,
            db_password: args.db_password,
            db_name: args.db_name,
            db_populate_json: args.db_populate_json,
            combined_sql_script,
            bind_address: args.bind_address,
            bind_port: args.bind_port,
        }
    }
}
