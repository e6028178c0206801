//! seedreport - bootstrap a storefront database and print analytical reports.

mod cli;

use cli::Cli;
use seedreport::app::{self, RunOptions};
use seedreport::bootstrap::BootstrapPlan;
use seedreport::config::{Config, ConnectionConfig};
use seedreport::db::ConfigConnector;
use seedreport::error::{ReportError, Result};
use seedreport::logging;
use seedreport::report::ReportCatalog;
use std::io::{self, Write};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Before parsing, so .env can supply SEEDREPORT_PASSWORD and RUST_LOG
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring .env file: {e}"),
    }

    if let Err(e) = run(&cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Catalog problems are reported before anything touches the database
    let catalog = resolve_catalog(cli, &config)?;

    if cli.list_reports {
        let mut stdout = io::stdout().lock();
        for line in catalog.listing() {
            writeln!(stdout, "{line}")?;
        }
        return Ok(());
    }

    let connection = resolve_connection(cli, &config)?.ok_or_else(|| {
        ReportError::config(
            "No database connection configured. Pass a connection string or use --help for usage information.",
        )
    })?;
    info!("Connection: {}", connection.display_string());

    let plan = BootstrapPlan::storefront(connection.database_name()?)?;
    let options = RunOptions {
        bootstrap: config.bootstrap.enabled && !cli.skip_bootstrap,
        seed: config.bootstrap.seed && !cli.no_seed,
    };

    let connector = ConfigConnector::new(connection);
    let summary = app::run(&connector, plan, &catalog, options, io::stdout().lock()).await?;

    if !summary.is_clean() {
        warn!(
            "{} bootstrap statements and {} reports failed",
            summary.bootstrap.failure_count(),
            summary.reports_failed
        );
    }

    Ok(())
}

/// Picks the report catalog: --query/--title pairs, then the config file's
/// `[[reports]]`, then the built-in storefront reports. --report narrows it.
fn resolve_catalog(cli: &Cli, config: &Config) -> Result<ReportCatalog> {
    let catalog = if cli.has_inline_reports() {
        ReportCatalog::from_parts(cli.queries.clone(), cli.titles.clone())?
    } else if !config.reports.is_empty() {
        ReportCatalog::new(config.reports.clone())?
    } else {
        ReportCatalog::storefront()
    };

    if cli.reports.is_empty() {
        Ok(catalog)
    } else {
        catalog.select(&cli.reports)
    }
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Precedence:
    // 1. CLI arguments (highest)
    // 2. Named connection from config
    // 3. Default connection from config
    // 4. Environment variables
    let mut connection = cli.to_connection_config()?;

    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(ReportError::config(format!(
                    "Connection '{name}' not found in config file"
                )));
            }
        }
    }

    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // Individual flags still refine a connection taken from the config file
    if cli.connection_string.is_none() {
        if let Some(conn) = connection.as_mut() {
            conn.merge(&cli.connection_overrides());
        }
    }

    if let Some(conn) = connection.as_mut() {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
