//! VACUUM and ANALYZE maintenance for Redshift tables.
//!
//! This module provides:
//! - **Commands**: operations, table identifiers and Redshift option rendering
//! - **Dispatcher**: capability-checked, single-shot command submission
//! - **Scheduler**: periodic maintenance over a configured table list

mod command;
mod dispatcher;
mod scheduler;

pub use command::{
    AnalyzeColumns, AnalyzeOptions, MaintenanceCommand, MaintenanceOperation, TableIdentifier,
    VacuumMode, VacuumOptions,
};
pub use dispatcher::{analyze_table, execute, vacuum_table, MaintenanceDispatcher};
pub use scheduler::{MaintenanceRunResult, MaintenanceScheduler, TaskInfo, TaskStatus};
