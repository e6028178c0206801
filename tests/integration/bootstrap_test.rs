//! Bootstrap integration tests against a temporary SQLite database.

use super::{count, query, sqlite_connector};
use seedreport::bootstrap::{BootstrapPlan, Bootstrapper, StatementOutcome};
use seedreport::db::Connector;
use tempfile::tempdir;

const TABLES: [&str; 7] = [
    "customers",
    "suppliers",
    "categories",
    "products",
    "orders",
    "orderdetails",
    "payments",
];

fn plan(connector: &seedreport::db::ConfigConnector) -> BootstrapPlan {
    let database = connector.config().database_name().unwrap().to_string();
    BootstrapPlan::storefront(database).unwrap()
}

/// Every row of every table, in key order, as display strings.
async fn snapshot(connector: &dyn Connector) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    for table in TABLES {
        let result = query(connector, &format!("SELECT * FROM {table} ORDER BY 1")).await;
        tables.push(
            result
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_display_string()).collect())
                .collect(),
        );
    }
    tables
}

#[tokio::test]
async fn test_full_bootstrap_populates_every_table() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let bootstrapper = Bootstrapper::new(&connector, plan(&connector));

    let report = bootstrapper.run(true).await;

    assert!(report.is_clean(), "failures: {:?}", report.failures().collect::<Vec<_>>());
    for table in TABLES {
        assert_eq!(count(&connector, table).await, 10, "{table}");
    }
}

#[tokio::test]
async fn test_bootstrap_twice_yields_identical_state() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let bootstrapper = Bootstrapper::new(&connector, plan(&connector));

    assert!(bootstrapper.run(true).await.is_clean());
    let first = snapshot(&connector).await;

    assert!(bootstrapper.run(true).await.is_clean());
    let second = snapshot(&connector).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reseeding_without_reset() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let bootstrapper = Bootstrapper::new(&connector, plan(&connector));
    assert!(bootstrapper.run(true).await.is_clean());

    let report = bootstrapper.seed().await;
    assert!(report.is_clean());

    // Natural keys are unique, so the duplicate-safe insert skips every row
    assert_eq!(count(&connector, "customers").await, 10);
    assert_eq!(count(&connector, "suppliers").await, 10);
    assert_eq!(count(&connector, "categories").await, 10);
    assert_eq!(count(&connector, "products").await, 10);

    // Surrogate-keyed tables have nothing to conflict on and grow
    assert_eq!(count(&connector, "orders").await, 20);
    assert_eq!(count(&connector, "payments").await, 20);

    let customers = report
        .statements
        .iter()
        .find(|s| s.label == "Data Insertion (customers)")
        .unwrap();
    assert!(matches!(customers.outcome, StatementOutcome::Success { rows: 0 }));
}

#[tokio::test]
async fn test_reset_schema_on_existing_tables_is_clean() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let bootstrapper = Bootstrapper::new(&connector, plan(&connector));

    assert!(bootstrapper.reset_schema().await.is_clean());
    assert!(bootstrapper.seed().await.is_clean());
    assert!(bootstrapper.reset_schema().await.is_clean());

    for table in TABLES {
        assert_eq!(count(&connector, table).await, 0, "{table}");
    }
}

#[tokio::test]
async fn test_sqlite_database_step_is_skipped() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let bootstrapper = Bootstrapper::new(&connector, plan(&connector));

    let report = bootstrapper.ensure_database().await;

    assert_eq!(report.len(), 1);
    assert!(matches!(
        report.statements[0].outcome,
        StatementOutcome::Skipped { .. }
    ));
}
