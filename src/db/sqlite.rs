//! SQLite database client implementation.
//!
//! The database is a single file, created on first connect, so there is no
//! separate server-level connection and `database_exists` is always true.

use crate::db::{column_info, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens (creating if missing) the database file named by `conn_str`.
    pub async fn connect(conn_str: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(conn_str)
            .map_err(|e| ReportError::config(format!("Invalid SQLite path: {e}")))?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| ReportError::connection(format!("Failed to open SQLite database: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn execute_statement(&self, sql: &str) -> Result<u64> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ReportError::connection(e.to_string()))?;

        let result = (&mut *conn)
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| ReportError::statement(format_query_error(e)))?;

        Ok(result.rows_affected())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ReportError::connection(e.to_string()))?;

        let start = Instant::now();
        let rows: Vec<SqliteRow> = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| ReportError::statement(format_query_error(e)))?;
        let execution_time = start.elapsed();

        let columns = match rows.first() {
            Some(first_row) => column_info(first_row.columns()),
            None => {
                let statement = (&mut *conn)
                    .prepare(sql)
                    .await
                    .map_err(|e| ReportError::statement(format_query_error(e)))?;
                column_info(statement.columns())
            }
        };

        debug!("Query returned {} rows in {:?}", rows.len(), execution_time);

        let rows: Vec<Row> = rows.iter().map(convert_row).collect();
        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn database_exists(&self, _name: &str) -> Result<bool> {
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single value, dispatching on its runtime storage class since
/// SQLite column declarations are only affinities.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Unsupported("UNKNOWN".to_string()),
    };

    let decoded = match storage_class.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).ok().map(Value::Int),
        "REAL" => row.try_get::<f64, _>(index).ok().map(Value::Float),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes),
        _ => row.try_get::<String, _>(index).ok().map(Value::String),
    };

    decoded.unwrap_or(Value::Unsupported(storage_class))
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
