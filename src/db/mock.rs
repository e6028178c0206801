//! Mock database client for testing.
//!
//! Records every statement it receives and replays scripted results, so the
//! bootstrapper and renderer can be exercised without a database server.

use super::{ColumnInfo, Connector, DatabaseBackend, DatabaseClient, QueryResult, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    executed: Vec<String>,
    failing_fragments: Vec<String>,
    scripted_results: Vec<(String, QueryResult)>,
    databases: HashSet<String>,
    opened: usize,
    closed: usize,
}

/// A mock database client that returns predefined results.
///
/// Clones share state, so a test can keep one handle for inspection while
/// handing others out through a [`MockConnector`].
#[derive(Debug, Clone)]
pub struct MockDatabaseClient {
    backend: DatabaseBackend,
    state: Arc<Mutex<MockState>>,
}

impl MockDatabaseClient {
    /// Creates a new mock client speaking the given dialect.
    pub fn new(backend: DatabaseBackend) -> Self {
        Self {
            backend,
            state: Arc::default(),
        }
    }

    /// Makes every statement containing `fragment` fail.
    pub fn fail_on(self, fragment: impl Into<String>) -> Self {
        self.state().failing_fragments.push(fragment.into());
        self
    }

    /// Returns `result` for queries containing `fragment`.
    pub fn with_result(self, fragment: impl Into<String>, result: QueryResult) -> Self {
        self.state().scripted_results.push((fragment.into(), result));
        self
    }

    /// Marks a database as already present on the server.
    pub fn with_database(self, name: impl Into<String>) -> Self {
        self.state().databases.insert(name.into());
        self
    }

    /// Every SQL text received so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    /// Names of databases that exist, including ones created through the mock.
    pub fn databases(&self) -> HashSet<String> {
        self.state().databases.clone()
    }

    /// Number of clients handed out by a connector and closed again.
    pub fn open_and_closed(&self) -> (usize, usize) {
        let state = self.state();
        (state.opened, state.closed)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, sql: &str) -> Result<()> {
        let mut state = self.state();
        state.executed.push(sql.to_string());
        if state
            .failing_fragments
            .iter()
            .any(|fragment| sql.contains(fragment.as_str()))
        {
            return Err(ReportError::statement(format!("mock failure for: {sql}")));
        }
        Ok(())
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new(DatabaseBackend::default())
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    async fn execute_statement(&self, sql: &str) -> Result<u64> {
        self.record(sql)?;

        let create_prefix = "CREATE DATABASE ";
        if let Some(rest) = sql.strip_prefix(create_prefix) {
            let name = rest.trim_start_matches("IF NOT EXISTS ").trim();
            self.state().databases.insert(name.to_string());
        }
        Ok(0)
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.record(sql)?;

        let scripted = self
            .state()
            .scripted_results
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone());

        // Unscripted queries yield a single echo row
        Ok(scripted.unwrap_or_else(|| {
            QueryResult::with_data(
                vec![ColumnInfo::new("result", "TEXT")],
                vec![vec![Value::String(format!("Mock result for: {sql}"))]],
            )
            .with_execution_time(Duration::from_millis(1))
        }))
    }

    async fn database_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().databases.contains(name))
    }

    async fn close(&self) -> Result<()> {
        self.state().closed += 1;
        Ok(())
    }
}

/// Connector that hands out clones of a shared mock client.
#[derive(Debug, Clone)]
pub struct MockConnector {
    client: MockDatabaseClient,
    refuse: bool,
}

impl MockConnector {
    pub fn new(client: MockDatabaseClient) -> Self {
        Self {
            client,
            refuse: false,
        }
    }

    /// A connector whose every connection attempt fails.
    pub fn unreachable() -> Self {
        Self {
            client: MockDatabaseClient::default(),
            refuse: true,
        }
    }

    fn hand_out(&self) -> Result<Box<dyn DatabaseClient>> {
        if self.refuse {
            return Err(ReportError::connection(
                "Cannot connect to localhost:3306. Check that the server is running.",
            ));
        }
        self.client.state().opened += 1;
        Ok(Box::new(self.client.clone()))
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        self.hand_out()
    }

    async fn connect_server(&self) -> Result<Box<dyn DatabaseClient>> {
        self.hand_out()
    }
}
