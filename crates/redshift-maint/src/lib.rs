//! redshift-maint - table maintenance for Amazon Redshift
//!
//! This library issues `VACUUM` and `ANALYZE` against a warehouse through a
//! narrow connection abstraction:
//!
//! - Capability-checked dispatch that fails fast instead of sending bad commands
//! - Redshift option rendering (`SORT ONLY`, `TO n PERCENT`, `PREDICATE COLUMNS`, ...)
//! - Opt-in helpers for host table-mapping types via [`Maintainable`]
//! - A PostgreSQL-protocol [`RedshiftConnection`] and a periodic scheduler

pub mod config;
pub mod connection;
pub mod error;
pub mod maintenance;
pub mod model;
pub mod redshift;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use connection::{MaintenanceConnection, SUPPORTS_MAINTENANCE_OPERATIONS};
pub use error::{BackendError, MaintenanceError, UnsupportedReason};
pub use error::{Error, Result};
pub use maintenance::{analyze_table, vacuum_table, MaintenanceDispatcher, MaintenanceOperation};
pub use model::Maintainable;
pub use redshift::RedshiftConnection;
