//! Direct PostgreSQL access to the geodetic database.
//!
//! When configured this replaces the web service entirely. Marks are read
//! through the `gdb.gdb_mark_json` stored procedure, which returns the same
//! JSON document the web service serves.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::domain::MarkCode;

use super::error::SourceError;
use super::source::MarkSource;

/// Default database name.
const DEFAULT_DATABASE: &str = "linz_db";

const MARK_BY_CODE_SQL: &str = "SELECT gdb.gdb_mark_json($1::VARCHAR, 'F')::TEXT";
const MARK_BY_ID_SQL: &str = "SELECT gdb.gdb_mark_json($1::INTEGER, 'F')::TEXT";

/// Connection parameters for the geodetic database.
///
/// Unset parameters fall back to the usual libpq environment variables
/// (`PGHOST`, `PGUSER`, ...) and defaults.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// How long to keep trying to open the connection, in seconds
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Create a config for the default database on the default host.
    pub fn new() -> Self {
        Self {
            host: None,
            port: None,
            database: DEFAULT_DATABASE.to_string(),
            user: None,
            password: None,
            connect_timeout_secs: 10,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new().database(&self.database);
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        options
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Mark source backed by a PostgreSQL connection.
///
/// The rest of the crate is blocking, so the pool is driven by a private
/// current-thread runtime.
pub struct DatabaseSource {
    runtime: Runtime,
    pool: PgPool,
}

impl DatabaseSource {
    /// Connect to the database. Fails if the database is unreachable.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, SourceError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceError::Runtime)?;

        let pool = runtime.block_on(
            PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
                .connect_with(config.connect_options()),
        )?;

        info!(database = %config.database, host = ?config.host, "connected to geodetic database");

        Ok(Self { runtime, pool })
    }
}

impl MarkSource for DatabaseSource {
    fn fetch(&self, code: &MarkCode) -> Result<Option<String>, SourceError> {
        debug!(%code, "querying geodetic database");

        let row: Option<Option<String>> = match code {
            MarkCode::Id(_) => {
                // gdb_mark_json takes an INTEGER id; anything larger cannot exist
                let Some(id) = code.id().and_then(|id| i32::try_from(id).ok()) else {
                    return Ok(None);
                };
                self.runtime.block_on(
                    sqlx::query_scalar::<_, Option<String>>(MARK_BY_ID_SQL)
                        .bind(id)
                        .fetch_optional(&self.pool),
                )?
            }
            MarkCode::Code(_) => self.runtime.block_on(
                sqlx::query_scalar::<_, Option<String>>(MARK_BY_CODE_SQL)
                    .bind(code.to_string())
                    .fetch_optional(&self.pool),
            )?,
        };

        Ok(row.flatten())
    }

    fn name(&self) -> &'static str {
        "database"
    }
}

impl Drop for DatabaseSource {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}
