//! Configuration structures for redshift-maint.
//!
//! Configuration is loaded from TOML files by the host application.

use crate::maintenance::{
    AnalyzeColumns, AnalyzeOptions, MaintenanceDispatcher, VacuumMode, VacuumOptions,
};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Warehouse connection configuration
    pub connection: ConnectionConfig,

    /// Maintenance configuration
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Redshift connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Cluster endpoint host
    pub host: String,

    /// Cluster port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name
    pub database: String,

    /// Database user
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: Option<String>,

    /// Application name reported to the cluster
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Server-side statement timeout in seconds (unset keeps the cluster default)
    #[serde(default)]
    pub statement_timeout_seconds: Option<u64>,
}

/// Maintenance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaintenanceConfig {
    /// Check the catalog for the table before sending a command
    #[serde(default)]
    pub verify_table_exists: bool,

    /// Tables maintained by the scheduler
    #[serde(default)]
    pub tables: Vec<String>,

    /// Enable scheduled VACUUM
    #[serde(default = "default_enabled")]
    pub vacuum_enabled: bool,

    /// VACUUM interval in seconds
    #[serde(default = "default_vacuum_interval")]
    pub vacuum_interval_seconds: u64,

    /// VACUUM variant
    #[serde(default)]
    pub vacuum_mode: VacuumMode,

    /// Sort threshold (`TO n PERCENT`)
    #[serde(default)]
    pub vacuum_threshold_percent: Option<u8>,

    /// Run VACUUM with `BOOST`
    #[serde(default)]
    pub vacuum_boost: bool,

    /// Enable scheduled ANALYZE
    #[serde(default = "default_enabled")]
    pub analyze_enabled: bool,

    /// ANALYZE interval in seconds
    #[serde(default = "default_analyze_interval")]
    pub analyze_interval_seconds: u64,

    /// Columns to analyze
    #[serde(default)]
    pub analyze_columns: AnalyzeColumns,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            verify_table_exists: false,
            tables: Vec::new(),
            vacuum_enabled: default_enabled(),
            vacuum_interval_seconds: default_vacuum_interval(),
            vacuum_mode: VacuumMode::default(),
            vacuum_threshold_percent: None,
            vacuum_boost: false,
            analyze_enabled: default_enabled(),
            analyze_interval_seconds: default_analyze_interval(),
            analyze_columns: AnalyzeColumns::default(),
        }
    }
}

impl MaintenanceConfig {
    /// VACUUM options described by this configuration.
    pub fn vacuum_options(&self) -> VacuumOptions {
        VacuumOptions {
            mode: self.vacuum_mode,
            threshold_percent: self.vacuum_threshold_percent,
            boost: self.vacuum_boost,
        }
    }

    /// ANALYZE options described by this configuration.
    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            columns: self.analyze_columns.clone(),
        }
    }

    /// Check options and intervals of the enabled tasks.
    pub fn validate(&self) -> crate::Result<()> {
        self.vacuum_options().validate()?;
        self.analyze_options().validate()?;

        if self.vacuum_enabled && self.vacuum_interval_seconds == 0 {
            return Err(crate::Error::Config(
                "Vacuum interval must be greater than zero".into(),
            ));
        }

        if self.analyze_enabled && self.analyze_interval_seconds == 0 {
            return Err(crate::Error::Config(
                "Analyze interval must be greater than zero".into(),
            ));
        }

        if let Some(blank) = self.tables.iter().position(|t| t.trim().is_empty()) {
            return Err(crate::Error::Config(format!(
                "Maintenance table #{} is blank",
                blank + 1
            )));
        }

        if self.tables.is_empty() && (self.vacuum_enabled || self.analyze_enabled) {
            tracing::warn!("Scheduled maintenance is enabled but no tables are configured");
        }

        Ok(())
    }

    /// Dispatcher honouring `verify_table_exists`.
    pub fn dispatcher(&self) -> MaintenanceDispatcher {
        MaintenanceDispatcher::new().with_table_verification(self.verify_table_exists)
    }
}

/// Monitoring configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Directive for an `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Plain text format
    Text,
}

// Default value functions
fn default_port() -> u16 {
    5439
}
fn default_application_name() -> String {
    "redshift-maint".to_string()
}
fn default_connect_timeout_seconds() -> u64 {
    30
}
fn default_enabled() -> bool {
    true
}
fn default_vacuum_interval() -> u64 {
    86400 // daily
}
fn default_analyze_interval() -> u64 {
    3600
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.connection.host.is_empty() {
            return Err(crate::Error::Config("Connection host is required".into()));
        }

        if self.connection.port == 0 {
            return Err(crate::Error::Config("Connection port must be non-zero".into()));
        }

        if self.connection.database.is_empty() {
            return Err(crate::Error::Config("Database name is required".into()));
        }

        if self.connection.user.is_empty() {
            return Err(crate::Error::Config("Database user is required".into()));
        }

        self.maintenance.validate()
    }
}
