//! Statement batches that report each outcome instead of aborting.

use crate::db::DatabaseClient;
use crate::error::ReportError;
use std::fmt;
use tracing::{debug, warn};

/// A labelled SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: String,
    pub sql: String,
}

impl Statement {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

/// What happened to one statement.
#[derive(Debug)]
pub enum StatementOutcome {
    Success { rows: u64 },
    Skipped { reason: String },
    Failed { error: ReportError },
}

/// A statement label together with its outcome.
#[derive(Debug)]
pub struct StatementReport {
    pub label: String,
    pub outcome: StatementOutcome,
}

impl StatementReport {
    pub fn new(label: impl Into<String>, outcome: StatementOutcome) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }

    pub fn failed(label: impl Into<String>, error: ReportError) -> Self {
        Self::new(label, StatementOutcome::Failed { error })
    }

    pub fn skipped(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            label,
            StatementOutcome::Skipped {
                reason: reason.into(),
            },
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StatementOutcome::Failed { .. })
    }
}

impl fmt::Display for StatementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StatementOutcome::Success { .. } => write!(f, "{}: Success", self.label),
            StatementOutcome::Skipped { reason } => write!(f, "{}: Skipped - {reason}", self.label),
            StatementOutcome::Failed { error } => {
                write!(f, "{}: Failed - {}", self.label, error.message())
            }
        }
    }
}

/// Outcomes of every statement a bootstrap step ran, in order.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub statements: Vec<StatementReport>,
}

impl BootstrapReport {
    pub fn single(report: StatementReport) -> Self {
        Self {
            statements: vec![report],
        }
    }

    pub fn push(&mut self, report: StatementReport) {
        self.statements.push(report);
    }

    pub fn extend(&mut self, other: BootstrapReport) {
        self.statements.extend(other.statements);
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementReport> {
        self.statements.iter().filter(|s| s.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn success_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s.outcome, StatementOutcome::Success { .. }))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    /// Sum of affected rows over successful statements.
    pub fn rows_affected(&self) -> u64 {
        self.statements
            .iter()
            .map(|s| match s.outcome {
                StatementOutcome::Success { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Runs every statement in order. A failing statement is recorded and the
/// batch continues with the next one.
pub async fn run_batch(
    client: &dyn DatabaseClient,
    statements: impl IntoIterator<Item = Statement>,
) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    for statement in statements {
        debug!("{}: {}", statement.label, statement.sql);

        let outcome = match client.execute_statement(&statement.sql).await {
            Ok(rows) => StatementOutcome::Success { rows },
            Err(error) => {
                warn!("{} failed: {}", statement.label, error);
                StatementOutcome::Failed { error }
            }
        };
        report.push(StatementReport::new(statement.label, outcome));
    }

    report
}
