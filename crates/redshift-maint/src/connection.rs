//! Connection boundary consumed by the maintenance dispatcher.
//!
//! Any connection can opt in to maintenance by answering the
//! [`SUPPORTS_MAINTENANCE_OPERATIONS`] capability; the dispatcher never
//! inspects the concrete connection type.

use crate::error::BackendError;
use crate::maintenance::TableIdentifier;
use async_trait::async_trait;

/// Capability name queried before any maintenance command is sent.
pub const SUPPORTS_MAINTENANCE_OPERATIONS: &str = "supports_maintenance_operations";

/// Operations a warehouse connection offers to the dispatcher.
#[async_trait]
pub trait MaintenanceConnection: Send + Sync {
    /// Whether this connection supports the named optional capability.
    fn has_capability(&self, capability: &str) -> bool;

    /// Submit a command and wait for it to finish.
    async fn execute_command(&self, sql: &str) -> Result<(), BackendError>;

    /// Check that the table exists in the catalog.
    ///
    /// Connections without a catalog view report every table as present
    /// and leave the failure to the command itself.
    async fn table_exists(&self, _table: &TableIdentifier) -> Result<bool, BackendError> {
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording connection double shared by module tests.

    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    /// Mock connection that records every submitted command.
    pub(crate) struct MockConnection {
        capable: bool,
        failure: Option<BackendError>,
        failing_tables: HashSet<String>,
        known_tables: Option<HashSet<String>>,
        pub(crate) commands: Mutex<Vec<String>>,
        pub(crate) existence_checks: Mutex<Vec<String>>,
    }

    impl MockConnection {
        pub(crate) fn capable() -> Self {
            Self {
                capable: true,
                failure: None,
                failing_tables: HashSet::new(),
                known_tables: None,
                commands: Mutex::new(Vec::new()),
                existence_checks: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn incapable() -> Self {
            Self {
                capable: false,
                ..Self::capable()
            }
        }

        /// Every command fails with `error`.
        pub(crate) fn failing(error: BackendError) -> Self {
            Self {
                failure: Some(error),
                ..Self::capable()
            }
        }

        /// Commands naming `table` fail with a lock error.
        pub(crate) fn failing_for(mut self, table: &str) -> Self {
            self.failing_tables.insert(table.to_string());
            self
        }

        /// Only these tables exist in the catalog.
        pub(crate) fn with_tables(mut self, tables: &[&str]) -> Self {
            self.known_tables = Some(tables.iter().map(|t| t.to_string()).collect());
            self
        }

        pub(crate) fn commands(&self) -> Vec<String> {
            self.commands.lock().clone()
        }

        pub(crate) fn execute_count(&self) -> usize {
            self.commands.lock().len()
        }
    }

    #[async_trait]
    impl MaintenanceConnection for MockConnection {
        fn has_capability(&self, capability: &str) -> bool {
            self.capable && capability == SUPPORTS_MAINTENANCE_OPERATIONS
        }

        async fn execute_command(&self, sql: &str) -> Result<(), BackendError> {
            self.commands.lock().push(sql.to_string());
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            if self
                .failing_tables
                .iter()
                .any(|t| sql.split_whitespace().any(|word| word == t))
            {
                return Err(BackendError::ObjectInUse(sql.to_string()));
            }
            Ok(())
        }

        async fn table_exists(&self, table: &TableIdentifier) -> Result<bool, BackendError> {
            self.existence_checks.lock().push(table.to_string());
            Ok(self
                .known_tables
                .as_ref()
                .map_or(true, |known| known.contains(table.as_str())))
        }
    }

    #[tokio::test]
    async fn test_default_table_exists_is_permissive() {
        struct Bare;

        #[async_trait]
        impl MaintenanceConnection for Bare {
            fn has_capability(&self, _capability: &str) -> bool {
                true
            }

            async fn execute_command(&self, _sql: &str) -> Result<(), BackendError> {
                Ok(())
            }
        }

        let table = TableIdentifier::new("anything").unwrap();
        assert!(Bare.table_exists(&table).await.unwrap());
    }

    #[test]
    fn test_mock_capability_name() {
        let conn = MockConnection::capable();
        assert!(conn.has_capability(SUPPORTS_MAINTENANCE_OPERATIONS));
        assert!(!conn.has_capability("supports_savepoints"));
        assert!(!MockConnection::incapable().has_capability(SUPPORTS_MAINTENANCE_OPERATIONS));
    }
}
