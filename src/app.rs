//! Batch orchestration.
//!
//! Bootstraps the database once, then renders every catalog entry in order.
//! Each unit of work reports its own failure; only output errors end the run.

use crate::bootstrap::{BootstrapPlan, BootstrapReport, Bootstrapper};
use crate::db::Connector;
use crate::error::Result;
use crate::report::{RenderOutcome, ReportCatalog, ReportRenderer};
use std::io::Write;
use tracing::info;

/// Which bootstrap steps run before the reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub bootstrap: bool,
    pub seed: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            bootstrap: true,
            seed: true,
        }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub bootstrap: BootstrapReport,
    pub reports_rendered: usize,
    pub reports_failed: usize,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.bootstrap.is_clean() && self.reports_failed == 0
    }
}

/// Bootstraps according to `options`, then renders each report to `out`.
pub async fn run<W: Write>(
    connector: &dyn Connector,
    plan: BootstrapPlan,
    catalog: &ReportCatalog,
    options: RunOptions,
    mut out: W,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    if options.bootstrap {
        writeln!(out, "Initializing database...")?;
        let bootstrapper = Bootstrapper::new(connector, plan);

        print_step(&mut out, &mut summary.bootstrap, bootstrapper.ensure_database().await)?;
        print_step(&mut out, &mut summary.bootstrap, bootstrapper.reset_schema().await)?;
        if options.seed {
            print_step(&mut out, &mut summary.bootstrap, bootstrapper.seed().await)?;
        }
        writeln!(out, "Database initialization complete.")?;
    }

    let mut renderer = ReportRenderer::new(connector, &mut out);
    for (i, report) in catalog.iter().enumerate() {
        if options.bootstrap || i > 0 {
            renderer.blank_line()?;
        }
        match renderer.render_spec(report).await? {
            RenderOutcome::Rendered { .. } => summary.reports_rendered += 1,
            RenderOutcome::Failed(_) => summary.reports_failed += 1,
        }
    }
    renderer.flush()?;

    info!(
        "Run finished: {} bootstrap statements ({} failed), {} reports rendered, {} failed",
        summary.bootstrap.len(),
        summary.bootstrap.failure_count(),
        summary.reports_rendered,
        summary.reports_failed
    );

    Ok(summary)
}

fn print_step<W: Write>(
    out: &mut W,
    total: &mut BootstrapReport,
    step: BootstrapReport,
) -> Result<()> {
    for statement in &step.statements {
        writeln!(out, "{statement}")?;
    }
    total.extend(step);
    Ok(())
}
