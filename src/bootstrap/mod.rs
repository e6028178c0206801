//! Idempotent schema and seed bootstrapping.
//!
//! The [`Bootstrapper`] brings a database to a known state in three steps:
//! make sure the database exists, drop and recreate every table, then insert
//! the reference rows with a duplicate-safe insert. Each step opens its own
//! client, runs its statements one at a time and reports every outcome; a
//! failing statement never stops the rest of the step.

pub mod batch;
pub mod schema;
pub mod seed;
pub mod storefront;

pub use batch::{run_batch, BootstrapReport, Statement, StatementOutcome, StatementReport};
pub use schema::{ColumnSpec, ColumnType, ForeignKeySpec, SchemaDefinition, TableSpec};
pub use seed::{SeedDataset, SeedTable, SeedValue};

use crate::config::validate_identifier;
use crate::db::{Connector, DatabaseClient};
use crate::error::Result;
use tracing::{info, warn};

const DATABASE_CREATION: &str = "Database Creation";

/// Everything the bootstrapper needs to know about the target.
#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    database: String,
    schema: SchemaDefinition,
    seed: SeedDataset,
}

impl BootstrapPlan {
    /// Builds a plan after checking that the seed data fits the schema.
    ///
    /// `database` is the server-side database name, or the file path for SQLite.
    pub fn new(
        database: impl Into<String>,
        schema: SchemaDefinition,
        seed: SeedDataset,
    ) -> Result<Self> {
        seed.validate_against(&schema)?;
        Ok(Self {
            database: database.into(),
            schema,
            seed,
        })
    }

    /// The built-in storefront schema and rows for `database`.
    pub fn storefront(database: impl Into<String>) -> Result<Self> {
        Self::new(database, storefront::schema()?, storefront::seed())
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn seed(&self) -> &SeedDataset {
        &self.seed
    }
}

/// Applies a [`BootstrapPlan`] through connections from a [`Connector`].
pub struct Bootstrapper<'a> {
    connector: &'a dyn Connector,
    plan: BootstrapPlan,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(connector: &'a dyn Connector, plan: BootstrapPlan) -> Self {
        Self { connector, plan }
    }

    pub fn plan(&self) -> &BootstrapPlan {
        &self.plan
    }

    /// Creates the target database when it is absent.
    ///
    /// Runs on a server-level connection since the database may not exist yet.
    pub async fn ensure_database(&self) -> BootstrapReport {
        let client = match self.connector.connect_server().await {
            Ok(client) => client,
            Err(e) => return connection_failure(DATABASE_CREATION, e),
        };

        let database = self.plan.database();
        let report = match client.database_exists(database).await {
            Ok(true) => BootstrapReport::single(StatementReport::skipped(
                DATABASE_CREATION,
                format!("database '{database}' already exists"),
            )),
            Ok(false) => match client.backend().create_database_sql(database) {
                Some(sql) => match validate_identifier(database) {
                    Ok(()) => {
                        run_batch(&*client, [Statement::new(DATABASE_CREATION, sql)]).await
                    }
                    Err(e) => BootstrapReport::single(StatementReport::failed(DATABASE_CREATION, e)),
                },
                None => BootstrapReport::single(StatementReport::skipped(
                    DATABASE_CREATION,
                    format!("{} has no server-side databases", client.backend()),
                )),
            },
            Err(e) => BootstrapReport::single(StatementReport::failed(DATABASE_CREATION, e)),
        };

        release(client).await;
        report
    }

    /// Drops every known table children-first, then creates them parents-first.
    pub async fn reset_schema(&self) -> BootstrapReport {
        let client = match self.connector.connect().await {
            Ok(client) => client,
            Err(e) => return connection_failure("Schema Reset", e),
        };

        let backend = client.backend();
        let schema = self.plan.schema();
        let drops = schema.drop_order().map(|table| {
            Statement::new(format!("Drop Table ({})", table.name), table.drop_sql())
        });
        let creates = schema.creation_order().map(|table| {
            Statement::new(
                format!("Table Creation ({})", table.name),
                table.create_sql(backend),
            )
        });

        let report = run_batch(&*client, drops.chain(creates)).await;
        release(client).await;
        report
    }

    /// Inserts the reference rows, one multi-row statement per table.
    pub async fn seed(&self) -> BootstrapReport {
        let client = match self.connector.connect().await {
            Ok(client) => client,
            Err(e) => return connection_failure("Data Insertion", e),
        };

        let backend = client.backend();
        let inserts = self
            .plan
            .seed()
            .tables()
            .iter()
            .filter(|table| !table.rows.is_empty())
            .map(|table| {
                Statement::new(
                    format!("Data Insertion ({})", table.table),
                    table.insert_sql(backend),
                )
            });

        let report = run_batch(&*client, inserts).await;
        release(client).await;
        report
    }

    /// Runs `ensure_database`, `reset_schema` and, if `seed` is set, `seed`.
    pub async fn run(&self, seed: bool) -> BootstrapReport {
        let mut report = self.ensure_database().await;
        report.extend(self.reset_schema().await);
        if seed {
            report.extend(self.seed().await);
        }

        info!(
            "Bootstrap of {} finished: {} succeeded, {} failed",
            self.plan.database(),
            report.success_count(),
            report.failure_count()
        );
        report
    }
}

fn connection_failure(label: &str, error: crate::error::ReportError) -> BootstrapReport {
    warn!("{label} skipped, no connection: {error}");
    BootstrapReport::single(StatementReport::failed(label, error))
}

async fn release(client: Box<dyn DatabaseClient>) {
    if let Err(e) = client.close().await {
        warn!("Failed to close connection: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseBackend, MockConnector, MockDatabaseClient};
    use pretty_assertions::assert_eq;

    fn plan() -> BootstrapPlan {
        BootstrapPlan::storefront("final_db").unwrap()
    }

    fn labels(report: &BootstrapReport) -> Vec<String> {
        report.statements.iter().map(|s| s.label.clone()).collect()
    }

    #[tokio::test]
    async fn test_ensure_database_creates_when_missing() {
        let client = MockDatabaseClient::new(DatabaseBackend::Mysql);
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.ensure_database().await;

        assert!(report.is_clean());
        assert_eq!(
            client.executed(),
            vec!["CREATE DATABASE IF NOT EXISTS final_db".to_string()]
        );
        assert!(client.databases().contains("final_db"));
        assert_eq!(client.open_and_closed(), (1, 1));
    }

    #[tokio::test]
    async fn test_ensure_database_skips_existing() {
        let client = MockDatabaseClient::new(DatabaseBackend::Postgres).with_database("final_db");
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.ensure_database().await;

        assert!(client.executed().is_empty());
        assert_eq!(
            report.statements[0].to_string(),
            "Database Creation: Skipped - database 'final_db' already exists"
        );
    }

    #[tokio::test]
    async fn test_reset_schema_drops_children_first_then_creates_parents_first() {
        let client = MockDatabaseClient::new(DatabaseBackend::Mysql);
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.reset_schema().await;

        assert_eq!(
            labels(&report),
            vec![
                "Drop Table (payments)",
                "Drop Table (orderdetails)",
                "Drop Table (orders)",
                "Drop Table (products)",
                "Drop Table (categories)",
                "Drop Table (suppliers)",
                "Drop Table (customers)",
                "Table Creation (customers)",
                "Table Creation (suppliers)",
                "Table Creation (categories)",
                "Table Creation (products)",
                "Table Creation (orders)",
                "Table Creation (orderdetails)",
                "Table Creation (payments)",
            ]
        );
        assert!(client.executed()[0].starts_with("DROP TABLE IF EXISTS payments"));
        assert!(client.executed()[7].starts_with("CREATE TABLE IF NOT EXISTS customers"));
    }

    #[tokio::test]
    async fn test_one_failing_statement_does_not_stop_the_rest() {
        let client = MockDatabaseClient::new(DatabaseBackend::Mysql)
            .fail_on("CREATE TABLE IF NOT EXISTS products");
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.reset_schema().await;

        assert_eq!(report.len(), 14);
        assert_eq!(report.failure_count(), 1);
        let failed: Vec<&str> = report.failures().map(|s| s.label.as_str()).collect();
        assert_eq!(failed, vec!["Table Creation (products)"]);
    }

    #[tokio::test]
    async fn test_seed_uses_backend_dialect() {
        let client = MockDatabaseClient::new(DatabaseBackend::Postgres);
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.seed().await;

        assert_eq!(report.len(), 7);
        let executed = client.executed();
        assert!(executed[0].starts_with("INSERT INTO customers (name, email"));
        assert!(executed.iter().all(|sql| sql.ends_with("ON CONFLICT DO NOTHING")));
    }

    #[tokio::test]
    async fn test_run_without_seed() {
        let client = MockDatabaseClient::new(DatabaseBackend::Sqlite);
        let connector = MockConnector::new(client.clone());
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.run(false).await;

        // 1 skipped database step plus 14 DDL statements
        assert_eq!(report.len(), 15);
        assert!(!client.executed().iter().any(|sql| sql.contains("INSERT")));
        assert_eq!(client.open_and_closed(), (2, 2));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_each_step() {
        let connector = MockConnector::unreachable();
        let bootstrapper = Bootstrapper::new(&connector, plan());

        let report = bootstrapper.run(true).await;

        assert_eq!(
            labels(&report),
            vec!["Database Creation", "Schema Reset", "Data Insertion"]
        );
        assert_eq!(report.failure_count(), 3);
    }

    #[tokio::test]
    async fn test_unsafe_database_name_is_never_interpolated() {
        let client = MockDatabaseClient::new(DatabaseBackend::Mysql);
        let connector = MockConnector::new(client.clone());
        let plan = BootstrapPlan::storefront("final_db; DROP DATABASE mysql").unwrap();

        let report = Bootstrapper::new(&connector, plan).ensure_database().await;

        assert_eq!(report.failure_count(), 1);
        assert!(client.executed().is_empty());
    }
}
