//! Maintenance commands and their Redshift rendering.
//!
//! ```text
//! VACUUM [ FULL | SORT ONLY | DELETE ONLY | REINDEX | RECLUSTER ] table [ TO n PERCENT ] [ BOOST ]
//! ANALYZE table [ ( column [, ...] ) ] [ PREDICATE COLUMNS | ALL COLUMNS ]
//! ```
//!
//! With default options a command renders as exactly `VACUUM <table>` or
//! `ANALYZE <table>`.

use crate::error::{MaintenanceError, UnsupportedReason};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of maintenance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceOperation {
    /// Reclaim space and re-sort rows
    Vacuum,
    /// Refresh planner statistics
    Analyze,
}

impl MaintenanceOperation {
    /// SQL keyword for the operation.
    pub fn keyword(&self) -> &'static str {
        match self {
            MaintenanceOperation::Vacuum => "VACUUM",
            MaintenanceOperation::Analyze => "ANALYZE",
        }
    }
}

impl fmt::Display for MaintenanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A non-blank table name, optionally schema-qualified.
///
/// The text is sent to the warehouse verbatim. For catalog lookups the
/// name is also resolved the way the engine does: dots inside double quotes
/// do not separate parts, quoted parts keep their case (with `""` unescaped)
/// and unquoted parts fold to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    raw: String,
    schema: Option<String>,
    table: String,
}

impl TableIdentifier {
    /// Validate a table identifier.
    ///
    /// Empty and whitespace-only names are refused with
    /// [`MaintenanceError::Unsupported`].
    pub fn new(name: impl Into<String>) -> Result<Self, MaintenanceError> {
        let raw = name.into();
        if raw.trim().is_empty() {
            return Err(MaintenanceError::unsupported(UnsupportedReason::BlankTableIdentifier));
        }

        let mut parts = split_identifier(&raw);
        let table = parts.pop().unwrap_or_default();
        // `database.schema.table` keeps only the schema
        let schema = parts.pop();

        Ok(Self { raw, schema, table })
    }

    /// The identifier as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolved schema name, if the identifier is qualified.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Resolved table name, without any schema qualifier.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Split on dots outside double quotes, resolving each part.
fn split_identifier(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = raw.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            '.' if !in_quotes => {
                parts.push(resolve_part(std::mem::take(&mut current), quoted));
                quoted = false;
            }
            c => current.push(c),
        }
    }
    parts.push(resolve_part(current, quoted));

    parts
}

fn resolve_part(part: String, quoted: bool) -> String {
    if quoted {
        part
    } else {
        part.trim().to_lowercase()
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for TableIdentifier {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// VACUUM variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VacuumMode {
    /// Plain `VACUUM` (Redshift performs a full vacuum)
    #[default]
    Default,
    /// `VACUUM FULL`
    Full,
    /// `VACUUM SORT ONLY`
    SortOnly,
    /// `VACUUM DELETE ONLY`
    DeleteOnly,
    /// `VACUUM REINDEX` (interleaved sort keys)
    Reindex,
    /// `VACUUM RECLUSTER`
    Recluster,
}

impl VacuumMode {
    fn clause(&self) -> Option<&'static str> {
        match self {
            VacuumMode::Default => None,
            VacuumMode::Full => Some("FULL"),
            VacuumMode::SortOnly => Some("SORT ONLY"),
            VacuumMode::DeleteOnly => Some("DELETE ONLY"),
            VacuumMode::Reindex => Some("REINDEX"),
            VacuumMode::Recluster => Some("RECLUSTER"),
        }
    }
}

/// Options for a VACUUM command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VacuumOptions {
    /// Vacuum variant
    pub mode: VacuumMode,
    /// Stop sorting once the table is this percent sorted (`TO n PERCENT`)
    pub threshold_percent: Option<u8>,
    /// Run with additional resources (`BOOST`)
    pub boost: bool,
}

impl VacuumOptions {
    /// Check option combinations Redshift rejects.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(percent) = self.threshold_percent {
            if percent == 0 || percent > 100 {
                return Err(crate::Error::Config(format!(
                    "vacuum threshold must be between 1 and 100 percent, got {}",
                    percent
                )));
            }
            if self.mode == VacuumMode::Reindex {
                return Err(crate::Error::Config(
                    "vacuum threshold is not valid with REINDEX".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Column selection for ANALYZE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzeColumns {
    /// Server default (`analyze_threshold_percent`, all columns)
    #[default]
    Default,
    /// `PREDICATE COLUMNS`
    Predicate,
    /// `ALL COLUMNS`
    All,
    /// An explicit column list
    Listed(Vec<String>),
}

/// Options for an ANALYZE command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Which columns to analyze
    pub columns: AnalyzeColumns,
}

impl AnalyzeOptions {
    /// Check that a listed selection names columns and has no blank entries.
    pub fn validate(&self) -> crate::Result<()> {
        match &self.columns {
            AnalyzeColumns::Listed(columns)
                if columns.is_empty() || columns.iter().any(|c| c.trim().is_empty()) =>
            {
                Err(crate::Error::Config(
                    "analyze column list must name columns and contain no blank entries".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandKind {
    Vacuum(VacuumOptions),
    Analyze(AnalyzeOptions),
}

/// A maintenance operation bound to a table, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceCommand {
    table: TableIdentifier,
    kind: CommandKind,
}

impl MaintenanceCommand {
    /// Command with default options for `operation`.
    pub fn new(operation: MaintenanceOperation, table: TableIdentifier) -> Self {
        let kind = match operation {
            MaintenanceOperation::Vacuum => CommandKind::Vacuum(VacuumOptions::default()),
            MaintenanceOperation::Analyze => CommandKind::Analyze(AnalyzeOptions::default()),
        };
        Self { table, kind }
    }

    /// VACUUM with the given options.
    pub fn vacuum(table: TableIdentifier, options: VacuumOptions) -> Self {
        Self {
            table,
            kind: CommandKind::Vacuum(options),
        }
    }

    /// ANALYZE with the given options.
    pub fn analyze(table: TableIdentifier, options: AnalyzeOptions) -> Self {
        Self {
            table,
            kind: CommandKind::Analyze(options),
        }
    }

    /// Target table.
    pub fn table(&self) -> &TableIdentifier {
        &self.table
    }

    /// Operation kind.
    pub fn operation(&self) -> MaintenanceOperation {
        match self.kind {
            CommandKind::Vacuum(_) => MaintenanceOperation::Vacuum,
            CommandKind::Analyze(_) => MaintenanceOperation::Analyze,
        }
    }

    /// Render the command text.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from(self.operation().keyword());

        match &self.kind {
            CommandKind::Vacuum(options) => {
                if let Some(clause) = options.mode.clause() {
                    sql.push(' ');
                    sql.push_str(clause);
                }
                sql.push(' ');
                sql.push_str(self.table.as_str());
                if let Some(percent) = options.threshold_percent {
                    sql.push_str(&format!(" TO {} PERCENT", percent));
                }
                if options.boost {
                    sql.push_str(" BOOST");
                }
            }
            CommandKind::Analyze(options) => {
                sql.push(' ');
                sql.push_str(self.table.as_str());
                match &options.columns {
                    AnalyzeColumns::Default => {}
                    AnalyzeColumns::Predicate => sql.push_str(" PREDICATE COLUMNS"),
                    AnalyzeColumns::All => sql.push_str(" ALL COLUMNS"),
                    AnalyzeColumns::Listed(columns) => {
                        sql.push_str(&format!(" ({})", columns.join(", ")));
                    }
                }
            }
        }

        sql
    }
}

impl fmt::Display for MaintenanceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
