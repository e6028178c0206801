//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use super::pool::{connect_with_retry, map_connection_error};
use crate::config::ConnectionConfig;
use crate::db::{column_info, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::debug;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Connects to the server described by `conn_str`, retrying transient failures.
    pub async fn connect(config: &ConnectionConfig, conn_str: &str) -> Result<Self> {
        let pool = connect_with_retry(conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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
        let rows: Vec<PgRow> = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| ReportError::statement(format_query_error(e)))?;
        let execution_time = start.elapsed();

        // Without a row to inspect, describe the prepared statement instead
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

    async fn database_exists(&self, name: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReportError::statement(format!("Failed to look up database {name}: {e}")))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Unsupported(type_name.to_string()),
    }

    let decoded = match type_name {
        "BOOL" => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        "INT2" => row.try_get::<i16, _>(index).ok().map(|v| Value::Int(v.into())),
        "INT4" => row.try_get::<i32, _>(index).ok().map(|v| Value::Int(v.into())),
        "INT8" => row.try_get::<i64, _>(index).ok().map(Value::Int),
        "FLOAT4" => row.try_get::<f32, _>(index).ok().map(|v| Value::Float(v.into())),
        "FLOAT8" => row.try_get::<f64, _>(index).ok().map(Value::Float),
        "NUMERIC" => row.try_get::<Decimal, _>(index).ok().map(Value::Decimal),
        "DATE" => row.try_get::<NaiveDate, _>(index).ok().map(Value::Date),
        "TIMESTAMP" => row.try_get::<NaiveDateTime, _>(index).ok().map(Value::DateTime),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .ok()
            .map(|v| Value::String(v.to_rfc3339())),
        "BYTEA" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes),
        // For all other types, try to get as string
        _ => row.try_get::<String, _>(index).ok().map(Value::String),
    };

    decoded.unwrap_or_else(|| Value::Unsupported(type_name.to_string()))
}

/// Formats a query error with hints if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
