//! Database abstraction layer for seedreport.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably by the
//! bootstrapper and the report renderer.

mod mock;
mod mysql;
mod pool;
mod postgres;
mod sqlite;
mod types;

pub use mock::{MockConnector, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Mysql,
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::Mysql),
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend (None for file-based backends).
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Mysql => Some(3306),
            Self::Postgres => Some(5432),
            Self::Sqlite => None,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Column definition for an auto-incrementing integer primary key.
    pub fn auto_increment_primary_key(&self) -> &'static str {
        match self {
            Self::Mysql => "INT AUTO_INCREMENT PRIMARY KEY",
            Self::Postgres => "SERIAL PRIMARY KEY",
            // AUTOINCREMENT is only accepted on exactly `INTEGER PRIMARY KEY`.
            Self::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    /// Wraps an `INSERT` target and body in this backend's ignore-on-conflict form.
    pub fn duplicate_safe_insert(&self, target: &str, body: &str) -> String {
        match self {
            Self::Mysql => format!("INSERT IGNORE INTO {target} {body}"),
            Self::Postgres => format!("INSERT INTO {target} {body} ON CONFLICT DO NOTHING"),
            Self::Sqlite => format!("INSERT OR IGNORE INTO {target} {body}"),
        }
    }

    /// SQL creating the named database, or None when the backend has no
    /// server-side databases.
    pub fn create_database_sql(&self, name: &str) -> Option<String> {
        match self {
            Self::Mysql => Some(format!("CREATE DATABASE IF NOT EXISTS {name}")),
            Self::Postgres => Some(format!("CREATE DATABASE {name}")),
            Self::Sqlite => None,
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates a database client bound to the configured database.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let conn_str = config.to_connection_string()?;
    open(config, &conn_str).await
}

/// Creates a client connected to the server without selecting the target
/// database, for creating it when it does not exist yet.
pub async fn connect_server(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let conn_str = config.to_server_connection_string()?;
    open(config, &conn_str).await
}

async fn open(config: &ConnectionConfig, conn_str: &str) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::Mysql => Ok(Box::new(MySqlClient::connect(config, conn_str).await?)),
        DatabaseBackend::Postgres => {
            Ok(Box::new(PostgresClient::connect(config, conn_str).await?))
        }
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::connect(conn_str).await?)),
    }
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with ReportError.
/// Each call acquires a pooled connection for its own duration and releases
/// it on every exit path.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// The backend this client talks to, used to pick SQL dialect.
    fn backend(&self) -> DatabaseBackend;

    /// Executes a statement that returns no result set, returning the
    /// number of affected rows.
    async fn execute_statement(&self, sql: &str) -> Result<u64>;

    /// Executes a SQL query and returns the results with column metadata.
    ///
    /// Column metadata is populated even when the query returns no rows.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Returns true if a database with the given name exists on the server.
    async fn database_exists(&self, name: &str) -> Result<bool>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// Source of database clients.
///
/// The bootstrapper and renderer receive a connector at construction time and
/// open a fresh client for every top-level operation.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a client bound to the target database.
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>>;

    /// Opens a client on the server without selecting the target database.
    async fn connect_server(&self) -> Result<Box<dyn DatabaseClient>>;
}

/// Connector backed by a resolved connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigConnector {
    config: ConnectionConfig,
}

impl ConfigConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for ConfigConnector {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        connect(&self.config).await
    }

    async fn connect_server(&self) -> Result<Box<dyn DatabaseClient>> {
        connect_server(&self.config).await
    }
}

/// Converts driver column metadata into backend-neutral column info.
pub(crate) fn column_info<C: sqlx::Column>(columns: &[C]) -> Vec<ColumnInfo> {
    use sqlx::TypeInfo;

    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}
