//! Background maintenance task scheduler.
//!
//! Manages periodic maintenance tasks over the configured tables:
//! - Vacuum: reclaim space and re-sort rows
//! - Analyze: refresh planner statistics
//!
//! Each run dispatches one command per table, in configuration order.
//! Failed tables are counted and reported, never retried within the run.

use super::command::{MaintenanceCommand, MaintenanceOperation, TableIdentifier};
use super::dispatcher::MaintenanceDispatcher;
use crate::config::MaintenanceConfig;
use crate::connection::MaintenanceConnection;
use crate::error::MaintenanceError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Status of a maintenance task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// Task is idle, waiting for next run
    Idle,
    /// Task is currently running
    Running,
    /// Every table was maintained
    Completed { duration: Duration },
    /// At least one table failed
    Failed { error: String },
    /// Task is disabled
    Disabled,
}

/// Information about a scheduled task.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    /// Task name
    pub name: String,
    /// Current status
    pub status: TaskStatus,
    /// Last run time
    pub last_run: Option<Instant>,
    /// Next scheduled run
    pub next_run: Option<Instant>,
    /// Total successful runs
    pub success_count: u64,
    /// Total failed runs
    pub failure_count: u64,
}

/// Outcome of one pass over the configured tables.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceRunResult {
    /// Tables whose command succeeded
    pub tables_processed: usize,
    /// Tables whose command failed
    pub tables_failed: usize,
    /// `(table, error)` for every failure
    pub failures: Vec<(String, String)>,
}

impl MaintenanceRunResult {
    /// Whether every table succeeded.
    pub fn is_success(&self) -> bool {
        self.tables_failed == 0
    }

    fn summary(&self) -> String {
        let tables: Vec<&str> = self.failures.iter().map(|(t, _)| t.as_str()).collect();
        format!(
            "{} of {} tables failed: {}",
            self.tables_failed,
            self.tables_processed + self.tables_failed,
            tables.join(", ")
        )
    }
}

/// Maintenance task scheduler.
pub struct MaintenanceScheduler {
    config: MaintenanceConfig,
    connection: Arc<dyn MaintenanceConnection>,
    dispatcher: MaintenanceDispatcher,
    shutdown_tx: broadcast::Sender<()>,
    tasks: RwLock<HashMap<String, TaskInfo>>,
    handles: RwLock<Vec<JoinHandle<()>>>,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler.
    ///
    /// The configuration is validated here: an enabled task with a zero
    /// interval or invalid command options is refused before anything runs.
    pub fn new(
        config: MaintenanceConfig,
        connection: Arc<dyn MaintenanceConnection>,
    ) -> crate::Result<Self> {
        config.validate()?;

        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            dispatcher: config.dispatcher(),
            config,
            connection,
            shutdown_tx,
            tasks: RwLock::new(HashMap::new()),
            handles: RwLock::new(Vec::new()),
        })
    }

    /// Start the maintenance scheduler.
    pub async fn start(self: Arc<Self>) {
        info!("Starting maintenance scheduler");

        if self.config.vacuum_enabled {
            self.register_task(task_name(MaintenanceOperation::Vacuum), TaskStatus::Idle);
            let handle = self.spawn_task(
                MaintenanceOperation::Vacuum,
                Duration::from_secs(self.config.vacuum_interval_seconds),
            );
            self.handles.write().push(handle);
        } else {
            self.register_task(task_name(MaintenanceOperation::Vacuum), TaskStatus::Disabled);
        }

        if self.config.analyze_enabled {
            self.register_task(task_name(MaintenanceOperation::Analyze), TaskStatus::Idle);
            let handle = self.spawn_task(
                MaintenanceOperation::Analyze,
                Duration::from_secs(self.config.analyze_interval_seconds),
            );
            self.handles.write().push(handle);
        } else {
            self.register_task(task_name(MaintenanceOperation::Analyze), TaskStatus::Disabled);
        }

        info!(
            vacuum = self.config.vacuum_enabled,
            analyze = self.config.analyze_enabled,
            tables = self.config.tables.len(),
            "Maintenance scheduler started"
        );
    }

    /// Stop the maintenance scheduler gracefully.
    pub async fn stop(&self) {
        info!("Stopping maintenance scheduler");

        let _ = self.shutdown_tx.send(());

        // Wait for all tasks to complete (with timeout)
        let handles: Vec<_> = std::mem::take(&mut *self.handles.write());
        for handle in handles {
            match tokio::time::timeout(Duration::from_secs(10), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_panic() => {
                    error!(error = %e, "Maintenance task panicked");
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Maintenance task did not finish cleanly");
                }
                Err(_) => {
                    warn!("Timed out waiting for maintenance task to stop");
                }
            }
        }

        info!("Maintenance scheduler stopped");
    }

    /// Register a task for tracking.
    fn register_task(&self, name: &str, status: TaskStatus) {
        let info = TaskInfo {
            name: name.to_string(),
            status,
            last_run: None,
            next_run: None,
            success_count: 0,
            failure_count: 0,
        };
        self.tasks.write().insert(name.to_string(), info);
    }

    /// Update task status.
    fn update_task_status(&self, name: &str, status: TaskStatus) {
        if let Some(task) = self.tasks.write().get_mut(name) {
            match &status {
                TaskStatus::Completed { .. } => {
                    task.success_count += 1;
                    task.last_run = Some(Instant::now());
                }
                TaskStatus::Failed { .. } => {
                    task.failure_count += 1;
                    task.last_run = Some(Instant::now());
                }
                _ => {}
            }
            task.status = status;
        }
    }

    fn set_next_run(&self, name: &str, next_run: Instant) {
        if let Some(task) = self.tasks.write().get_mut(name) {
            task.next_run = Some(next_run);
        }
    }

    /// Get status of all tasks.
    pub fn get_task_statuses(&self) -> HashMap<String, TaskInfo> {
        self.tasks.read().clone()
    }

    /// Get status of a specific task.
    pub fn get_task_status(&self, name: &str) -> Option<TaskInfo> {
        self.tasks.read().get(name).cloned()
    }

    /// Spawn the interval loop for one operation.
    fn spawn_task(
        self: &Arc<Self>,
        operation: MaintenanceOperation,
        interval: Duration,
    ) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let name = task_name(operation);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            // Skip the first immediate tick
            interval_timer.tick().await;
            scheduler.set_next_run(name, Instant::now() + interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        scheduler.run_task(operation).await;
                        scheduler.set_next_run(name, Instant::now() + interval);
                    }
                    _ = shutdown_rx.recv() => {
                        debug!(task = name, "Maintenance task received shutdown signal");
                        break;
                    }
                }
            }
        })
    }

    /// Run one scheduled pass and record its status.
    async fn run_task(&self, operation: MaintenanceOperation) {
        let name = task_name(operation);
        self.update_task_status(name, TaskStatus::Running);
        let start = Instant::now();

        debug!(task = name, "Starting maintenance task");

        let result = self.run_operation(operation).await;
        let duration = start.elapsed();

        if result.is_success() {
            info!(
                task = name,
                tables_processed = result.tables_processed,
                duration_ms = duration.as_millis(),
                "Maintenance task completed"
            );
            self.update_task_status(name, TaskStatus::Completed { duration });
        } else {
            error!(
                task = name,
                tables_processed = result.tables_processed,
                tables_failed = result.tables_failed,
                "Maintenance task failed"
            );
            self.update_task_status(
                name,
                TaskStatus::Failed {
                    error: result.summary(),
                },
            );
        }
    }

    /// Dispatch `operation` once for every configured table.
    async fn run_operation(&self, operation: MaintenanceOperation) -> MaintenanceRunResult {
        let mut result = MaintenanceRunResult::default();

        for table in &self.config.tables {
            match self.maintain_table(table, operation).await {
                Ok(()) => result.tables_processed += 1,
                Err(e) => {
                    warn!(
                        table = %table,
                        operation = %operation,
                        error = %e,
                        "Table maintenance failed"
                    );
                    result.tables_failed += 1;
                    result.failures.push((table.clone(), e.to_string()));
                }
            }
        }

        result
    }

    async fn maintain_table(
        &self,
        table: &str,
        operation: MaintenanceOperation,
    ) -> Result<(), MaintenanceError> {
        let table = TableIdentifier::new(table)?;
        let command = match operation {
            MaintenanceOperation::Vacuum => {
                MaintenanceCommand::vacuum(table, self.config.vacuum_options())
            }
            MaintenanceOperation::Analyze => {
                MaintenanceCommand::analyze(table, self.config.analyze_options())
            }
        };
        self.dispatcher.run(self.connection.as_ref(), &command).await
    }

    /// Trigger a vacuum pass manually (for testing or on-demand).
    pub async fn trigger_vacuum(&self) -> MaintenanceRunResult {
        self.run_operation(MaintenanceOperation::Vacuum).await
    }

    /// Trigger an analyze pass manually.
    pub async fn trigger_analyze(&self) -> MaintenanceRunResult {
        self.run_operation(MaintenanceOperation::Analyze).await
    }
}

fn task_name(operation: MaintenanceOperation) -> &'static str {
    match operation {
        MaintenanceOperation::Vacuum => "vacuum",
        MaintenanceOperation::Analyze => "analyze",
    }
}
