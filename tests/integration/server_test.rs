//! Bootstrap and render against real database servers.
//!
//! Skipped unless DATABASE_URL (PostgreSQL) or MYSQL_DATABASE_URL (MySQL) is set.
//! The database named in the URL is dropped and recreated table by table.

use super::count;
use seedreport::bootstrap::{BootstrapPlan, Bootstrapper};
use seedreport::config::ConnectionConfig;
use seedreport::db::ConfigConnector;
use seedreport::report::{RenderOutcome, ReportRenderer};

fn connector_from_env(var: &str) -> Option<ConfigConnector> {
    let url = std::env::var(var).ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    Some(ConfigConnector::new(config))
}

async fn bootstrap_twice_and_render(connector: ConfigConnector) {
    let database = connector.config().database_name().unwrap().to_string();
    let bootstrapper = Bootstrapper::new(&connector, BootstrapPlan::storefront(database).unwrap());

    let first = bootstrapper.run(true).await;
    assert!(first.is_clean(), "failures: {:?}", first.failures().collect::<Vec<_>>());
    let second = bootstrapper.run(true).await;
    assert!(second.is_clean(), "failures: {:?}", second.failures().collect::<Vec<_>>());

    assert_eq!(count(&connector, "customers").await, 10);
    assert_eq!(count(&connector, "orders").await, 10);

    let mut renderer = ReportRenderer::new(&connector, Vec::new());
    let outcome = renderer
        .render(
            "SELECT product_name, price FROM products WHERE price BETWEEN 10 AND 100 ORDER BY product_name",
            "Products priced between $10 and $100",
        )
        .await
        .unwrap();
    assert!(matches!(outcome, RenderOutcome::Rendered { rows: 6, columns: 2 }));

    let text = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(text.contains("| Blender      | 49.99 |"));
}

#[tokio::test]
async fn test_postgres_bootstrap_and_render() {
    let Some(connector) = connector_from_env("DATABASE_URL") else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    bootstrap_twice_and_render(connector).await;
}

#[tokio::test]
async fn test_mysql_bootstrap_and_render() {
    let Some(connector) = connector_from_env("MYSQL_DATABASE_URL") else {
        eprintln!("Skipping test: MYSQL_DATABASE_URL not set");
        return;
    };
    bootstrap_twice_and_render(connector).await;
}
