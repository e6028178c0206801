//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB servers using sqlx.

use super::pool::{connect_with_retry, map_connection_error};
use crate::config::ConnectionConfig;
use crate::db::{column_info, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::debug;

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Connects to the server described by `conn_str`, retrying transient failures.
    pub async fn connect(config: &ConnectionConfig, conn_str: &str) -> Result<Self> {
        let pool = connect_with_retry(conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Mysql
    }

    async fn execute_statement(&self, sql: &str) -> Result<u64> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ReportError::connection(e.to_string()))?;

        // Text protocol: DDL such as CREATE DATABASE is not preparable everywhere
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
        let rows: Vec<MySqlRow> = sqlx::query(sql)
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

    async fn database_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ReportError::statement(format!("Failed to look up database {name}: {e}")))?;

        Ok(count > 0)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Unsupported(type_name.to_string()),
    }

    let decoded = match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        "TINYINT" => row.try_get::<i8, _>(index).ok().map(|v| Value::Int(v.into())),
        "SMALLINT" => row.try_get::<i16, _>(index).ok().map(|v| Value::Int(v.into())),
        "INT" | "MEDIUMINT" => row.try_get::<i32, _>(index).ok().map(|v| Value::Int(v.into())),
        "BIGINT" => row.try_get::<i64, _>(index).ok().map(Value::Int),
        "TINYINT UNSIGNED" => row.try_get::<u8, _>(index).ok().map(|v| Value::Int(v.into())),
        "SMALLINT UNSIGNED" | "YEAR" => {
            row.try_get::<u16, _>(index).ok().map(|v| Value::Int(v.into()))
        }
        "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => {
            row.try_get::<u32, _>(index).ok().map(|v| Value::Int(v.into()))
        }
        "BIGINT UNSIGNED" => row.try_get::<u64, _>(index).ok().map(Value::from),
        "FLOAT" => row.try_get::<f32, _>(index).ok().map(|v| Value::Float(v.into())),
        "DOUBLE" => row.try_get::<f64, _>(index).ok().map(Value::Float),
        "DECIMAL" => row.try_get::<Decimal, _>(index).ok().map(Value::Decimal),
        "DATE" => row.try_get::<NaiveDate, _>(index).ok().map(Value::Date),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .ok()
            .map(Value::DateTime),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .ok()
            .map(|v| Value::String(v.to_string())),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes)
        }
        _ => row.try_get::<String, _>(index).ok().map(Value::String),
    };

    decoded.unwrap_or_else(|| Value::Unsupported(type_name.to_string()))
}

/// Formats a query error the way the mysql command-line client does.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    match db_error.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
        Some(mysql_error) => match mysql_error.code() {
            Some(state) => format!(
                "ERROR {} ({state}): {}",
                mysql_error.number(),
                mysql_error.message()
            ),
            None => format!("ERROR {}: {}", mysql_error.number(), mysql_error.message()),
        },
        None => format!("ERROR: {}", db_error.message()),
    }
}
