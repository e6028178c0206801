//! Table definitions and their DDL.
//!
//! A [`SchemaDefinition`] is an ordered list of tables in which every
//! foreign-key target is declared before the table that references it, so
//! creation walks the list forwards and teardown walks it backwards.

use crate::db::DatabaseBackend;
use crate::error::{ReportError, Result};
use std::collections::HashSet;

/// Column data types understood by every supported backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Varchar(u16),
    Decimal { precision: u8, scale: u8 },
    Date,
}

impl ColumnType {
    /// Type name as written in this backend's DDL.
    pub fn sql(&self, backend: DatabaseBackend) -> String {
        match (self, backend) {
            (Self::Int, DatabaseBackend::Sqlite) => "INTEGER".to_string(),
            (Self::Int, _) => "INT".to_string(),
            (Self::Varchar(len), _) => format!("VARCHAR({len})"),
            (Self::Decimal { precision, scale }, _) => format!("DECIMAL({precision}, {scale})"),
            (Self::Date, _) => "DATE".to_string(),
        }
    }
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    /// Auto-incrementing surrogate primary key.
    pub auto_increment: bool,
}

impl ColumnSpec {
    /// A nullable column without constraints.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            unique: false,
            auto_increment: false,
        }
    }

    /// An auto-incrementing integer primary key.
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            nullable: false,
            auto_increment: true,
            ..Self::new(name, ColumnType::Int)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn definition(&self, backend: DatabaseBackend) -> String {
        if self.auto_increment {
            return format!("{} {}", self.name, backend.auto_increment_primary_key());
        }

        let mut definition = format!("{} {}", self.name, self.column_type.sql(backend));
        if !self.nullable {
            definition.push_str(" NOT NULL");
        }
        if self.unique {
            definition.push_str(" UNIQUE");
        }
        definition
    }
}

/// A foreign key from a column of this table to a column of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// A table with its columns and outgoing foreign keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub foreign_keys: Vec<ForeignKeySpec>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key; the referenced column shares the local column's name.
    pub fn references(self, column: impl Into<String>, table: impl Into<String>) -> Self {
        let column = column.into();
        let references_column = column.clone();
        self.foreign_key(column, table, references_column)
    }

    pub fn foreign_key(
        mut self,
        column: impl Into<String>,
        table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeySpec {
            column: column.into(),
            references_table: table.into(),
            references_column: references_column.into(),
        });
        self
    }

    /// Returns true if the table declares a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this backend.
    pub fn create_sql(&self, backend: DatabaseBackend) -> String {
        let definitions = self
            .columns
            .iter()
            .map(|column| column.definition(backend))
            .chain(self.foreign_keys.iter().map(|fk| {
                format!(
                    "FOREIGN KEY ({}) REFERENCES {}({})",
                    fk.column, fk.references_table, fk.references_column
                )
            }))
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join(",\n");

        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", self.name, definitions)
    }

    /// `DROP TABLE IF EXISTS` statement; identical across backends.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

/// Tables in dependency order: parents before children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    tables: Vec<TableSpec>,
}

impl SchemaDefinition {
    /// Builds a schema, rejecting duplicate names and any foreign key whose
    /// target is unknown or declared later.
    pub fn new(tables: Vec<TableSpec>) -> Result<Self> {
        let mut declared: Vec<&TableSpec> = Vec::with_capacity(tables.len());

        for table in &tables {
            if table.columns.is_empty() {
                return Err(ReportError::config(format!(
                    "Table '{}' has no columns",
                    table.name
                )));
            }
            if declared.iter().any(|t| t.name == table.name) {
                return Err(ReportError::config(format!(
                    "Table '{}' is declared twice",
                    table.name
                )));
            }

            let mut seen = HashSet::new();
            if let Some(dup) = table.columns.iter().find(|c| !seen.insert(c.name.as_str())) {
                return Err(ReportError::config(format!(
                    "Column '{}.{}' is declared twice",
                    table.name, dup.name
                )));
            }

            for fk in &table.foreign_keys {
                if !table.has_column(&fk.column) {
                    return Err(ReportError::config(format!(
                        "Foreign key column '{}.{}' does not exist",
                        table.name, fk.column
                    )));
                }

                let target = if fk.references_table == table.name {
                    Some(table)
                } else {
                    declared.iter().copied().find(|t| t.name == fk.references_table)
                };
                let Some(target) = target else {
                    return Err(ReportError::config(format!(
                        "Table '{}' references '{}', which is not declared before it",
                        table.name, fk.references_table
                    )));
                };
                if !target.has_column(&fk.references_column) {
                    return Err(ReportError::config(format!(
                        "Foreign key target '{}.{}' does not exist",
                        fk.references_table, fk.references_column
                    )));
                }
            }

            declared.push(table);
        }

        Ok(Self { tables })
    }

    /// Tables parents-first, the order to create them in.
    pub fn creation_order(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.iter()
    }

    /// Tables children-first, the order to drop them in.
    pub fn drop_order(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.iter().rev()
    }

    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Position of a table in creation order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
