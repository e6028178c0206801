//! Integration tests for seedreport.

pub mod bootstrap_test;
pub mod report_test;
pub mod server_test;

use seedreport::config::ConnectionConfig;
use seedreport::db::{ConfigConnector, Connector, QueryResult};
use tempfile::TempDir;

/// A connector to a fresh SQLite file inside `dir`.
pub fn sqlite_connector(dir: &TempDir) -> ConfigConnector {
    let path = dir.path().join("store.db");
    let config = ConnectionConfig::from_connection_string(&format!("sqlite:{}", path.display()))
        .unwrap();
    ConfigConnector::new(config)
}

/// Runs a query on a fresh client and closes it again.
pub async fn query(connector: &dyn Connector, sql: &str) -> QueryResult {
    let client = connector.connect().await.unwrap();
    let result = client.execute_query(sql).await.unwrap();
    client.close().await.unwrap();
    result
}

/// Row count of a table.
pub async fn count(connector: &dyn Connector, table: &str) -> i64 {
    let result = query(connector, &format!("SELECT COUNT(*) AS n FROM {table}")).await;
    match &result.rows[0][0] {
        seedreport::db::Value::Int(n) => *n,
        other => panic!("unexpected count value: {other:?}"),
    }
}
