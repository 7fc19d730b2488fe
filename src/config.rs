//! Configuration loading
//!
//! Loads generator configuration from environment variables, optionally
//! reading from a .env file first. The struct is built once at startup and
//! passed into each component; nothing else reads the environment.

use crate::prelude::SqlSharpError;
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{debug, error, trace, warn};

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Render empty-bodied procedure classes instead of skipping them
    pub generate_empty_classes: bool,
    /// Apply the `?` suffix to nullable table columns
    pub use_nullable_types: bool,
    /// Directory for table model classes
    pub table_output_path: PathBuf,
    /// Directory for procedure request (input) classes
    pub input_output_path: PathBuf,
    /// Directory for procedure result (output) classes
    pub output_output_path: PathBuf,
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    ///
    /// Connection variables:
    /// - DB_SERVER (default: localhost)
    /// - DB_PORT (default: 5432)
    /// - DB_DATABASE (required)
    /// - DB_USERNAME (required)
    /// - DB_PASSWORD (required)
    ///
    /// Generation variables:
    /// - GENERATE_EMPTY_CLASSES (default: false)
    /// - USE_NULLABLE_TYPES (default: true)
    /// - TABLE_OUTPUT_PATH (default: ./TableModels)
    /// - INPUT_OUTPUT_PATH (default: ./)
    /// - OUTPUT_OUTPUT_PATH (default: ./)
    pub fn from_env() -> Result<Self, SqlSharpError> {
        debug!("Loading generator configuration from environment");

        let server = env::var("DB_SERVER").unwrap_or_else(|_| {
            trace!("DB_SERVER not set, using default");
            "localhost".to_string()
        });

        let port_str = env::var("DB_PORT").unwrap_or_else(|_| {
            trace!("DB_PORT not set, using default");
            "5432".to_string()
        });

        let port = port_str.parse::<u16>().map_err(|e| {
            error!(port = ?port_str, error = ?e, "Invalid DB_PORT value");
            SqlSharpError::Config("DB_PORT must be a valid port number".to_string())
        })?;

        let database = env::var("DB_DATABASE").map_err(|_| {
            error!("DB_DATABASE environment variable is not set");
            SqlSharpError::Config("DB_DATABASE environment variable is required".to_string())
        })?;

        let username = env::var("DB_USERNAME").map_err(|_| {
            error!("DB_USERNAME environment variable is not set");
            SqlSharpError::Config("DB_USERNAME environment variable is required".to_string())
        })?;

        let password = env::var("DB_PASSWORD").map_err(|_| {
            error!("DB_PASSWORD environment variable is not set");
            SqlSharpError::Config("DB_PASSWORD environment variable is required".to_string())
        })?;

        let generate_empty_classes = env_flag("GENERATE_EMPTY_CLASSES", false);
        let use_nullable_types = env_flag("USE_NULLABLE_TYPES", true);

        let table_output_path = env_path("TABLE_OUTPUT_PATH", "./TableModels");
        let input_output_path = env_path("INPUT_OUTPUT_PATH", "./");
        let output_output_path = env_path("OUTPUT_OUTPUT_PATH", "./");

        debug!(
            server = ?server,
            port = ?port,
            database = ?database,
            username = ?username,
            use_nullable_types = ?use_nullable_types,
            generate_empty_classes = ?generate_empty_classes,
            "Configuration loaded"
        );

        Ok(Self {
            server,
            port,
            database,
            username,
            password,
            generate_empty_classes,
            use_nullable_types,
            table_output_path,
            input_output_path,
            output_output_path,
        })
    }

    /// Load a .env file and then read configuration from environment
    pub fn load(env_file: &Path) -> Result<Self, SqlSharpError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                SqlSharpError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        Self::from_env()
    }

    /// Build a PostgreSQL connection string
    pub fn postgres_connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.server, self.port, self.database, self.username, self.password
        )
    }

    /// Build a connection string with password redacted (for log output)
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password=***",
            self.server, self.port, self.database, self.username
        )
    }
}

/// Read a boolean variable: the value lower-cased must equal "true",
/// anything else is false, unset means the default.
fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => value.to_lowercase() == "true",
        Err(_) => default,
    }
}

fn env_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
