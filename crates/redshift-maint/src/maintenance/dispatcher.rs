//! Maintenance command dispatcher.
//!
//! Checks the connection's maintenance capability, validates the table
//! identifier, renders the command and submits it once. Failures are
//! returned to the caller untouched; nothing is retried or logged here.

use super::command::{MaintenanceCommand, MaintenanceOperation, TableIdentifier};
use crate::connection::{MaintenanceConnection, SUPPORTS_MAINTENANCE_OPERATIONS};
use crate::error::{MaintenanceError, UnsupportedReason};
use tracing::debug;

/// Dispatches VACUUM and ANALYZE commands to a connection.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceDispatcher {
    verify_table_exists: bool,
}

impl MaintenanceDispatcher {
    /// Create a dispatcher with no existence pre-check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the connection whether the table exists before sending a command.
    pub fn with_table_verification(mut self, enabled: bool) -> Self {
        self.verify_table_exists = enabled;
        self
    }

    /// Run `operation` with default options against `table`.
    pub async fn execute<C>(
        &self,
        connection: &C,
        table: &str,
        operation: MaintenanceOperation,
    ) -> Result<(), MaintenanceError>
    where
        C: MaintenanceConnection + ?Sized,
    {
        ensure_capability(connection)?;
        let table = TableIdentifier::new(table)?;
        self.submit(connection, &MaintenanceCommand::new(operation, table)).await
    }

    /// Run a fully specified command.
    pub async fn run<C>(
        &self,
        connection: &C,
        command: &MaintenanceCommand,
    ) -> Result<(), MaintenanceError>
    where
        C: MaintenanceConnection + ?Sized,
    {
        ensure_capability(connection)?;
        self.submit(connection, command).await
    }

    async fn submit<C>(
        &self,
        connection: &C,
        command: &MaintenanceCommand,
    ) -> Result<(), MaintenanceError>
    where
        C: MaintenanceConnection + ?Sized,
    {
        if self.verify_table_exists && !connection.table_exists(command.table()).await? {
            return Err(MaintenanceError::TableNotFound(command.table().to_string()));
        }

        let sql = command.to_sql();
        debug!(
            table = %command.table(),
            operation = %command.operation(),
            sql = %sql,
            "Dispatching maintenance command"
        );

        connection.execute_command(&sql).await?;
        Ok(())
    }
}

fn ensure_capability<C>(connection: &C) -> Result<(), MaintenanceError>
where
    C: MaintenanceConnection + ?Sized,
{
    if connection.has_capability(SUPPORTS_MAINTENANCE_OPERATIONS) {
        Ok(())
    } else {
        Err(MaintenanceError::unsupported(UnsupportedReason::MissingCapability))
    }
}

/// Run `operation` against `table` with default options.
pub async fn execute<C>(
    connection: &C,
    table: &str,
    operation: MaintenanceOperation,
) -> Result<(), MaintenanceError>
where
    C: MaintenanceConnection + ?Sized,
{
    MaintenanceDispatcher::new()
        .execute(connection, table, operation)
        .await
}

/// `VACUUM <table>`.
pub async fn vacuum_table<C>(connection: &C, table: &str) -> Result<(), MaintenanceError>
where
    C: MaintenanceConnection + ?Sized,
{
    execute(connection, table, MaintenanceOperation::Vacuum).await
}

/// `ANALYZE <table>`.
pub async fn analyze_table<C>(connection: &C, table: &str) -> Result<(), MaintenanceError>
where
    C: MaintenanceConnection + ?Sized,
{
    execute(connection, table, MaintenanceOperation::Analyze).await
}
