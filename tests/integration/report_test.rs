//! Report rendering integration tests against a seeded SQLite database.

use super::sqlite_connector;
use pretty_assertions::assert_eq;
use seedreport::app::{self, RunOptions};
use seedreport::bootstrap::{BootstrapPlan, Bootstrapper};
use seedreport::db::ConfigConnector;
use seedreport::report::{RenderOutcome, ReportCatalog, ReportRenderer, ReportSpec};
use tempfile::{tempdir, TempDir};

async fn seeded(dir: &TempDir) -> ConfigConnector {
    let connector = sqlite_connector(dir);
    let database = connector.config().database_name().unwrap().to_string();
    let plan = BootstrapPlan::storefront(database).unwrap();
    assert!(Bootstrapper::new(&connector, plan).run(true).await.is_clean());
    connector
}

async fn render(connector: &ConfigConnector, query: &str, title: &str) -> (RenderOutcome, String) {
    let mut renderer = ReportRenderer::new(connector, Vec::new());
    let outcome = renderer.render(query, title).await.unwrap();
    (outcome, String::from_utf8(renderer.into_inner()).unwrap())
}

#[tokio::test]
async fn test_render_grouped_counts() {
    let dir = tempdir().unwrap();
    let connector = seeded(&dir).await;

    let (outcome, text) = render(
        &connector,
        "SELECT payment_method, COUNT(*) AS usage_count FROM payments \
         GROUP BY payment_method ORDER BY payment_method",
        "The most popular payment methods",
    )
    .await;

    assert!(matches!(outcome, RenderOutcome::Rendered { rows: 4, columns: 2 }));
    assert_eq!(
        text,
        "The most popular payment methods\n\
         +----------------+-------------+\n\
         | payment_method | usage_count |\n\
         +----------------+-------------+\n\
         | Cash           | 1           |\n\
         +----------------+-------------+\n\
         | Credit Card    | 5           |\n\
         +----------------+-------------+\n\
         | Debit Card     | 1           |\n\
         +----------------+-------------+\n\
         | PayPal         | 3           |\n\
         +----------------+-------------+\n"
    );
}

#[tokio::test]
async fn test_render_empty_result_keeps_header() {
    let dir = tempdir().unwrap();
    let connector = seeded(&dir).await;

    let (outcome, text) = render(&connector, "SELECT * FROM products WHERE 1=0", "Nothing").await;

    assert!(matches!(outcome, RenderOutcome::Rendered { rows: 0, columns: 6 }));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Nothing");
    assert_eq!(lines[1], lines[3]);
    assert_eq!(
        lines[2],
        "| product_id | product_name | category_id | price | stock_quantity | supplier_id |"
    );
}

#[tokio::test]
async fn test_render_null_total() {
    let dir = tempdir().unwrap();
    let connector = seeded(&dir).await;

    let (_, text) = render(
        &connector,
        "SELECT SUM(stock_quantity) AS total_stock FROM products WHERE 1=0",
        "Total stock",
    )
    .await;

    assert_eq!(
        text,
        "Total stock\n\
         +-------------+\n\
         | total_stock |\n\
         +-------------+\n\
         | NULL        |\n\
         +-------------+\n"
    );
}

#[tokio::test]
async fn test_render_missing_table_reports_error() {
    let dir = tempdir().unwrap();
    let connector = seeded(&dir).await;

    let (outcome, text) = render(&connector, "SELECT * FROM nonexistent_table", "Broken").await;

    assert!(outcome.is_failure());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Error: "));
    assert!(lines[0].contains("no such table"));
    assert_eq!(lines[1], "Query: SELECT * FROM nonexistent_table");
}

#[tokio::test]
async fn test_full_run_with_storefront_catalog() {
    let dir = tempdir().unwrap();
    let connector = sqlite_connector(&dir);
    let database = connector.config().database_name().unwrap().to_string();
    let plan = BootstrapPlan::storefront(database).unwrap();
    let catalog = ReportCatalog::storefront();
    let mut out = Vec::new();

    let summary = app::run(&connector, plan, &catalog, RunOptions::default(), &mut out)
        .await
        .unwrap();

    // Some built-in reports use MySQL-only functions; they fail individually
    assert!(summary.bootstrap.is_clean());
    assert_eq!(summary.reports_rendered + summary.reports_failed, 20);
    assert!(summary.reports_failed > 0);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Products and their category names\n"));
    assert!(text.contains("| Smartphone     | Electronics     |"));
    assert!(text.contains("| total_stock |\n"));
    assert!(text.contains("| 690         |\n"));
}

#[tokio::test]
async fn test_run_inline_catalog_without_bootstrap() {
    let dir = tempdir().unwrap();
    let connector = seeded(&dir).await;
    let catalog = ReportCatalog::new(vec![ReportSpec::new(
        "Category count",
        "SELECT COUNT(*) AS categories FROM categories",
    )])
    .unwrap();
    let plan = BootstrapPlan::storefront("unused").unwrap();
    let options = RunOptions {
        bootstrap: false,
        seed: false,
    };
    let mut out = Vec::new();

    let summary = app::run(&connector, plan, &catalog, options, &mut out)
        .await
        .unwrap();

    assert!(summary.is_clean());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Category count\n\
         +------------+\n\
         | categories |\n\
         +------------+\n\
         | 10         |\n\
         +------------+\n"
    );
}
