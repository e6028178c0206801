//! Report rendering.
//!
//! A report is a titled query. The [`ReportRenderer`] runs it on a fresh
//! connection, materializes the result into a [`ResultSet`] and writes it as
//! an aligned text table. Query failures are written to the same sink as an
//! `Error:`/`Query:` pair and never propagate.

pub mod catalog;
mod storefront;
pub mod table;

pub use catalog::{ReportCatalog, ReportSpec};
pub use table::{ColumnDescriptor, ResultSet};

use crate::db::Connector;
use crate::error::{ReportError, Result};
use std::io::Write;
use tracing::{debug, warn};

/// Result of rendering one report.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered { rows: usize, columns: usize },
    Failed(ReportError),
}

impl RenderOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Renders reports to a writer using connections from a [`Connector`].
pub struct ReportRenderer<'a, W: Write> {
    connector: &'a dyn Connector,
    out: W,
}

impl<'a, W: Write> ReportRenderer<'a, W> {
    pub fn new(connector: &'a dyn Connector, out: W) -> Self {
        Self { connector, out }
    }

    /// Runs `query` and prints its result under `title`.
    ///
    /// Returns `Err` only when writing to the output fails; every database
    /// error is printed and reported as [`RenderOutcome::Failed`].
    pub async fn render(&mut self, query: &str, title: &str) -> Result<RenderOutcome> {
        let client = match self.connector.connect().await {
            Ok(client) => client,
            Err(e) => return self.print_failure(query, e),
        };

        let result = client.execute_query(query).await;
        if let Err(e) = client.close().await {
            warn!("Failed to close connection: {e}");
        }

        match result {
            Ok(result) => {
                let set = ResultSet::from_query_result(&result);
                for line in set.render_lines(title) {
                    writeln!(self.out, "{line}")?;
                }
                debug!(
                    "Rendered '{title}': {} rows, {} columns",
                    set.row_count(),
                    set.column_count()
                );
                Ok(RenderOutcome::Rendered {
                    rows: set.row_count(),
                    columns: set.column_count(),
                })
            }
            Err(e) => self.print_failure(query, e),
        }
    }

    /// Renders a catalog entry.
    pub async fn render_spec(&mut self, report: &ReportSpec) -> Result<RenderOutcome> {
        self.render(&report.query, &report.title).await
    }

    /// Writes a blank line, used between reports.
    pub fn blank_line(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_failure(&mut self, query: &str, error: ReportError) -> Result<RenderOutcome> {
        warn!("Report query failed: {error}");
        writeln!(self.out, "Error: {}", error.message())?;
        writeln!(self.out, "Query: {query}")?;
        Ok(RenderOutcome::Failed(error))
    }
}
