use super::types::Args;
use sql_middleware::middleware::DatabaseType;

const SECRETS_LOCATIONS: [&str; 2] = ["/secrets/db_password", "/run/secrets/db_password"];

impl Args {
    /// # Errors
    ///
    /// Will return `Err` if the database configuration is invalid
    pub fn validate(&mut self) -> Result<(), String> {
        if self.db_type != DatabaseType::Postgres {
            return Ok(());
        }
        if self.db_user.is_none() {
            return Err("Postgres user is required".to_string());
        }
        if self.db_host.as_deref().is_none_or(str::is_empty) {
            return Err("Postgres host is required".to_string());
        }
        if self.db_port.is_none() {
            return Err("Postgres port is required".to_string());
        }
        match self.db_password.as_deref() {
            None => return Err("Postgres password is required".to_string()),
            Some(location) if SECRETS_LOCATIONS.contains(&location) => {
                // the password may be given as a mounted secret file
                let contents = std::fs::read_to_string(location)
                    .map_err(|e| format!("Cannot read password file {location}: {e}"))?;
                self.db_password = Some(contents.trim().to_string());
            }
            Some(_) => {}
        }
        Ok(())
    }
}
