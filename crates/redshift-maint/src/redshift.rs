//! Redshift connection over the PostgreSQL wire protocol.
//!
//! Commands go through the simple query protocol outside any transaction
//! block, since Redshift refuses VACUUM inside one. Server errors are
//! classified into [`BackendError`] by SQLSTATE.

use crate::config::ConnectionConfig;
use crate::connection::{MaintenanceConnection, SUPPORTS_MAINTENANCE_OPERATIONS};
use crate::error::BackendError;
use crate::maintenance::TableIdentifier;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, warn};

const TABLE_EXISTS_SQL: &str = "SELECT 1 FROM information_schema.tables \
     WHERE table_schema::text = COALESCE($1::text, current_schema()::text) \
     AND table_name::text = $2::text";

/// Maintenance connection to a Redshift cluster.
pub struct RedshiftConnection {
    client: Client,
}

impl RedshiftConnection {
    /// Connect to the cluster described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_seconds);

        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user)
            .application_name(&config.application_name)
            .connect_timeout(connect_timeout);
        if let Some(password) = &config.password {
            pg.password(password);
        }

        debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connecting to Redshift"
        );

        let (client, connection) = tokio::time::timeout(connect_timeout, pg.connect(NoTls))
            .await
            .map_err(|_| {
                BackendError::Timeout(format!(
                    "connecting to {}:{} took longer than {}s",
                    config.host, config.port, config.connect_timeout_seconds
                ))
            })?
            .map_err(|e| classify_error(&e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "Redshift connection closed with error");
            }
        });

        if let Some(seconds) = config.statement_timeout_seconds {
            client
                .batch_execute(&statement_timeout_sql(seconds))
                .await
                .map_err(|e| classify_error(&e))?;
        }

        info!(
            host = %config.host,
            database = %config.database,
            "Redshift connection established"
        );

        Ok(Self::from_client(client))
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Whether the underlying connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

#[async_trait]
impl MaintenanceConnection for RedshiftConnection {
    fn has_capability(&self, capability: &str) -> bool {
        capability == SUPPORTS_MAINTENANCE_OPERATIONS
    }

    async fn execute_command(&self, sql: &str) -> std::result::Result<(), BackendError> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| classify_error(&e))
    }

    async fn table_exists(
        &self,
        table: &TableIdentifier,
    ) -> std::result::Result<bool, BackendError> {
        let row = self
            .client
            .query_opt(TABLE_EXISTS_SQL, &[&table.schema(), &table.table()])
            .await
            .map_err(|e| classify_error(&e))?;
        Ok(row.is_some())
    }
}

/// `SET statement_timeout` in milliseconds, saturating for huge values.
fn statement_timeout_sql(seconds: u64) -> String {
    format!("SET statement_timeout TO {}", seconds.saturating_mul(1000))
}

/// Map a driver error onto the backend taxonomy.
fn classify_error(err: &tokio_postgres::Error) -> BackendError {
    match err.as_db_error() {
        Some(db) => classify_sqlstate(db.code().code(), db.message()),
        None => BackendError::Transport(err.to_string()),
    }
}

/// Map a SQLSTATE code and server message onto the backend taxonomy.
fn classify_sqlstate(code: &str, message: &str) -> BackendError {
    let message = message.to_string();
    match code {
        "42501" => BackendError::PermissionDenied(message),
        // object_in_use, lock_not_available
        "55006" | "55P03" => BackendError::ObjectInUse(message),
        // undefined_table, invalid_schema_name
        "42P01" | "3F000" => BackendError::ObjectNotFound(message),
        "57014" => BackendError::Cancelled(message),
        // admin_shutdown, crash_shutdown, cannot_connect_now
        "57P01" | "57P02" | "57P03" => BackendError::Transport(message),
        _ => BackendError::Database {
            code: code.to_string(),
            message,
        },
    }
}
