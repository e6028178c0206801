//! Reference rows and their duplicate-safe inserts.

use super::schema::SchemaDefinition;
use crate::db::DatabaseBackend;
use crate::error::{ReportError, Result};
use rust_decimal::Decimal;
use std::fmt;

/// A literal value in a seed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedValue {
    Null,
    Int(i64),
    Decimal(Decimal),
    /// Text, also used for ISO-8601 dates which every backend accepts as a
    /// quoted literal.
    Text(String),
}

impl SeedValue {
    /// Renders the value as a SQL literal, doubling embedded quotes.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Decimal(v) => v.to_string(),
            Self::Text(v) => format!("'{}'", v.replace('\'', "''")),
        }
    }
}

impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

impl From<i64> for SeedValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SeedValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<Decimal> for SeedValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for SeedValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SeedValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<SeedValue>> From<Option<T>> for SeedValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Rows destined for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTable {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SeedValue>>,
}

impl SeedTable {
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: Vec<SeedValue>) -> Self {
        self.rows.push(values);
        self
    }

    /// One multi-row insert that silently skips rows violating a uniqueness
    /// constraint.
    pub fn insert_sql(&self, backend: DatabaseBackend) -> String {
        let target = format!("{} ({})", self.table, self.columns.join(", "));
        let values = self
            .rows
            .iter()
            .map(|row| {
                let literals: Vec<String> = row.iter().map(SeedValue::to_sql_literal).collect();
                format!("    ({})", literals.join(", "))
            })
            .collect::<Vec<_>>()
            .join(",\n");

        backend.duplicate_safe_insert(&target, &format!("VALUES\n{values}"))
    }
}

/// Seed tables in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedDataset {
    tables: Vec<SeedTable>,
}

impl SeedDataset {
    pub fn new(tables: Vec<SeedTable>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[SeedTable] {
        &self.tables
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// Checks that every table and column exists in `schema`, every row has
    /// one value per column, and tables follow the schema's creation order.
    pub fn validate_against(&self, schema: &SchemaDefinition) -> Result<()> {
        let mut last_position = None;

        for seed in &self.tables {
            let (position, table) = schema
                .position(&seed.table)
                .zip(schema.table(&seed.table))
                .ok_or_else(|| {
                    ReportError::config(format!("Seed data targets unknown table '{}'", seed.table))
                })?;

            if last_position.is_some_and(|last| position <= last) {
                return Err(ReportError::config(format!(
                    "Seed data for '{}' is out of dependency order",
                    seed.table
                )));
            }
            last_position = Some(position);

            if seed.columns.is_empty() {
                return Err(ReportError::config(format!(
                    "Seed data for '{}' names no columns",
                    seed.table
                )));
            }
            if let Some(unknown) = seed.columns.iter().find(|c| !table.has_column(c)) {
                return Err(ReportError::config(format!(
                    "Seed data for '{}' names unknown column '{unknown}'",
                    seed.table
                )));
            }

            for (i, row) in seed.rows.iter().enumerate() {
                if row.len() != seed.columns.len() {
                    return Err(ReportError::config(format!(
                        "Seed row {} for '{}' has {} values, expected {}",
                        i + 1,
                        seed.table,
                        row.len(),
                        seed.columns.len()
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::schema::{ColumnSpec, ColumnType, TableSpec};
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaDefinition {
        SchemaDefinition::new(vec![
            TableSpec::new("categories")
                .column(ColumnSpec::primary_key("category_id"))
                .column(ColumnSpec::new("category_name", ColumnType::Varchar(100)).unique()),
            TableSpec::new("products")
                .column(ColumnSpec::primary_key("product_id"))
                .column(ColumnSpec::new("product_name", ColumnType::Varchar(100)))
                .column(ColumnSpec::new("category_id", ColumnType::Int))
                .references("category_id", "categories"),
        ])
        .unwrap()
    }

    fn categories() -> SeedTable {
        SeedTable::new("categories", ["category_name"])
            .row(vec!["Books".into()])
            .row(vec!["Toys".into()])
    }

    #[test]
    fn test_literals() {
        assert_eq!(SeedValue::Null.to_sql_literal(), "NULL");
        assert_eq!(SeedValue::from(42).to_sql_literal(), "42");
        assert_eq!(
            SeedValue::from(Decimal::new(69999, 2)).to_sql_literal(),
            "699.99"
        );
        assert_eq!(SeedValue::from("O'Brien").to_sql_literal(), "'O''Brien'");
        assert_eq!(SeedValue::from(None::<i64>), SeedValue::Null);
    }

    #[test]
    fn test_insert_sql_per_backend() {
        assert_eq!(
            categories().insert_sql(DatabaseBackend::Mysql),
            "INSERT IGNORE INTO categories (category_name) VALUES\n    ('Books'),\n    ('Toys')"
        );
        assert!(categories()
            .insert_sql(DatabaseBackend::Postgres)
            .ends_with("('Toys') ON CONFLICT DO NOTHING"));
        assert!(categories()
            .insert_sql(DatabaseBackend::Sqlite)
            .starts_with("INSERT OR IGNORE INTO categories"));
    }

    #[test]
    fn test_validate_accepts_ordered_dataset() {
        let dataset = SeedDataset::new(vec![
            categories(),
            SeedTable::new("products", ["product_name", "category_id"])
                .row(vec!["Laptop".into(), 1.into()]),
        ]);
        assert!(dataset.validate_against(&schema()).is_ok());
        assert_eq!(dataset.row_count(), 3);
    }

    #[test]
    fn test_validate_rejects_out_of_order() {
        let dataset = SeedDataset::new(vec![
            SeedTable::new("products", ["product_name"]).row(vec!["Laptop".into()]),
            categories(),
        ]);
        let err = dataset.validate_against(&schema()).unwrap_err();
        assert!(err.to_string().contains("out of dependency order"));
    }

    #[test]
    fn test_validate_rejects_unknown_table_and_column() {
        let unknown_table = SeedDataset::new(vec![SeedTable::new("widgets", ["name"])]);
        assert!(unknown_table
            .validate_against(&schema())
            .unwrap_err()
            .to_string()
            .contains("unknown table 'widgets'"));

        let unknown_column =
            SeedDataset::new(vec![SeedTable::new("categories", ["colour"]).row(vec!["red".into()])]);
        assert!(unknown_column
            .validate_against(&schema())
            .unwrap_err()
            .to_string()
            .contains("unknown column 'colour'"));
    }

    #[test]
    fn test_validate_rejects_arity_mismatch() {
        let dataset = SeedDataset::new(vec![
            SeedTable::new("categories", ["category_name"]).row(vec!["Books".into(), 1.into()])
        ]);
        let err = dataset.validate_against(&schema()).unwrap_err();
        assert!(err.to_string().contains("has 2 values, expected 1"));
    }
}
