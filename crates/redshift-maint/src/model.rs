//! Maintenance helpers for host table-mapping types.
//!
//! A host type opts in by implementing [`Maintainable`]; it then gets
//! `vacuum_table` and `analyze_table` without any global registration.
//!
//! ```ignore
//! struct Orders {
//!     connection: Arc<RedshiftConnection>,
//! }
//!
//! impl Maintainable for Orders {
//!     type Connection = RedshiftConnection;
//!
//!     fn table_name(&self) -> &str {
//!         "sales.orders"
//!     }
//!
//!     fn connection(&self) -> &RedshiftConnection {
//!         &self.connection
//!     }
//! }
//!
//! Orders { connection }.vacuum_table().await?;
//! ```

use crate::connection::MaintenanceConnection;
use crate::error::MaintenanceError;
use crate::maintenance::{MaintenanceDispatcher, MaintenanceOperation};
use async_trait::async_trait;

/// A table-mapping type whose table can be vacuumed and analyzed.
#[async_trait]
pub trait Maintainable: Send + Sync {
    /// Connection type the mapping is bound to.
    type Connection: MaintenanceConnection + ?Sized;

    /// Name of the mapped table.
    fn table_name(&self) -> &str;

    /// Connection used for maintenance.
    fn connection(&self) -> &Self::Connection;

    /// Dispatcher used by the provided helpers.
    fn maintenance_dispatcher(&self) -> MaintenanceDispatcher {
        MaintenanceDispatcher::new()
    }

    /// `VACUUM` the mapped table.
    async fn vacuum_table(&self) -> Result<(), MaintenanceError> {
        self.maintenance_dispatcher()
            .execute(
                self.connection(),
                self.table_name(),
                MaintenanceOperation::Vacuum,
            )
            .await
    }

    /// `ANALYZE` the mapped table.
    async fn analyze_table(&self) -> Result<(), MaintenanceError> {
        self.maintenance_dispatcher()
            .execute(
                self.connection(),
                self.table_name(),
                MaintenanceOperation::Analyze,
            )
            .await
    }
}

/// Run both operations, VACUUM first, stopping at the first failure.
pub async fn vacuum_and_analyze<M>(mapping: &M) -> Result<(), MaintenanceError>
where
    M: Maintainable + ?Sized,
{
    mapping.vacuum_table().await?;
    mapping.analyze_table().await
}
