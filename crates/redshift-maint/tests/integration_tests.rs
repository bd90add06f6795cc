//! Integration tests for redshift-maint.
//!
//! The PostgreSQL tests require Docker to be running and are marked with
//! #[ignore] to avoid running them in normal test runs. PostgreSQL accepts
//! the same plain `VACUUM <table>` / `ANALYZE <table>` commands.
//!
//! Run with: cargo test --test integration_tests -- --ignored

use async_trait::async_trait;
use redshift_maint::config::ConnectionConfig;
use redshift_maint::maintenance::{MaintenanceRunResult, MaintenanceScheduler, TableIdentifier};
use redshift_maint::{
    analyze_table, vacuum_table, BackendError, Maintainable, MaintenanceConnection,
    MaintenanceError, RedshiftConnection, SUPPORTS_MAINTENANCE_OPERATIONS,
};
use std::sync::{Arc, Mutex};

/// Host-side connection that records commands instead of sending them.
#[derive(Default)]
struct RecordingConnection {
    capable: bool,
    commands: Mutex<Vec<String>>,
}

#[async_trait]
impl MaintenanceConnection for RecordingConnection {
    fn has_capability(&self, capability: &str) -> bool {
        self.capable && capability == SUPPORTS_MAINTENANCE_OPERATIONS
    }

    async fn execute_command(&self, sql: &str) -> Result<(), BackendError> {
        self.commands.lock().unwrap().push(sql.to_string());
        Ok(())
    }
}

mod host_wiring {
    use super::*;

    struct LineItems {
        connection: Arc<RecordingConnection>,
    }

    impl Maintainable for LineItems {
        type Connection = RecordingConnection;

        fn table_name(&self) -> &str {
            "sales.line_items"
        }

        fn connection(&self) -> &RecordingConnection {
            &self.connection
        }
    }

    #[tokio::test]
    async fn test_host_type_opts_in() {
        let connection = Arc::new(RecordingConnection {
            capable: true,
            ..Default::default()
        });
        let model = LineItems {
            connection: connection.clone(),
        };

        model.vacuum_table().await.unwrap();
        model.analyze_table().await.unwrap();

        assert_eq!(
            *connection.commands.lock().unwrap(),
            vec!["VACUUM sales.line_items", "ANALYZE sales.line_items"]
        );
    }

    #[tokio::test]
    async fn test_incapable_host_connection() {
        let connection = RecordingConnection::default();

        let err = vacuum_table(&connection, "orders").await.unwrap_err();
        assert!(matches!(err, MaintenanceError::Unsupported { .. }));
        assert!(connection.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_with_host_connection() {
        let connection = Arc::new(RecordingConnection {
            capable: true,
            ..Default::default()
        });
        let config = redshift_maint::config::MaintenanceConfig {
            tables: vec!["orders".into(), "events".into()],
            ..Default::default()
        };
        let scheduler = MaintenanceScheduler::new(config, connection.clone()).unwrap();

        let result: MaintenanceRunResult = scheduler.trigger_analyze().await;

        assert!(result.is_success());
        assert_eq!(
            *connection.commands.lock().unwrap(),
            vec!["ANALYZE orders", "ANALYZE events"]
        );
    }

    #[test]
    fn test_scheduler_rejects_zero_interval() {
        let connection = Arc::new(RecordingConnection {
            capable: true,
            ..Default::default()
        });
        let config = redshift_maint::config::MaintenanceConfig {
            tables: vec!["orders".into()],
            vacuum_interval_seconds: 0,
            ..Default::default()
        };

        assert!(MaintenanceScheduler::new(config, connection).is_err());
    }
}

mod postgres_integration {
    use super::*;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::postgres::Postgres;

    fn connection_config(port: u16) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".into(),
            port,
            database: "postgres".into(),
            user: "postgres".into(),
            password: Some("postgres".into()),
            application_name: "redshift-maint-it".into(),
            connect_timeout_seconds: 10,
            statement_timeout_seconds: Some(60),
        }
    }

    /// Run VACUUM and ANALYZE against a real server.
    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_vacuum_and_analyze_round_trip() {
        let node = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");
        let port = node
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let conn = RedshiftConnection::connect(&connection_config(port))
            .await
            .expect("Failed to connect");

        conn.execute_command("CREATE TABLE orders (id INT, customer_id INT)")
            .await
            .expect("Failed to create table");
        conn.execute_command("INSERT INTO orders SELECT g, g % 7 FROM generate_series(1, 1000) g")
            .await
            .expect("Failed to insert rows");
        conn.execute_command("DELETE FROM orders WHERE id % 2 = 0")
            .await
            .expect("Failed to delete rows");

        vacuum_table(&conn, "orders").await.expect("VACUUM failed");
        analyze_table(&conn, "public.orders")
            .await
            .expect("ANALYZE failed");
    }

    /// Catalog lookup and missing-table classification.
    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_missing_table() {
        let node = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");
        let port = node
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let conn = RedshiftConnection::connect(&connection_config(port))
            .await
            .expect("Failed to connect");
        conn.execute_command("CREATE TABLE events (id INT)")
            .await
            .expect("Failed to create table");

        let events = TableIdentifier::new("events").unwrap();
        let qualified = TableIdentifier::new("public.events").unwrap();
        let missing = TableIdentifier::new("missing").unwrap();
        assert!(conn.table_exists(&events).await.unwrap());
        assert!(conn.table_exists(&qualified).await.unwrap());
        assert!(!conn.table_exists(&missing).await.unwrap());

        let err = vacuum_table(&conn, "missing").await.unwrap_err();
        assert!(matches!(
            err,
            MaintenanceError::Backend(BackendError::ObjectNotFound(_))
        ));
    }
}
