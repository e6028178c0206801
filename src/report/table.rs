//! Aligned text tables for result sets of arbitrary shape.

use crate::db::QueryResult;

/// A column name and the width its cells are padded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub width: usize,
}

/// A fully materialized result set with every cell already stringified.
///
/// Widths are character counts, the widest of the header and every cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// Builds a result set from column names and stringified rows.
    ///
    /// Rows shorter than the header are padded with empty cells and longer
    /// rows are truncated, so every row has one cell per column.
    pub fn new(names: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(names.len(), String::new());
                row
            })
            .collect();

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let width = rows
                    .iter()
                    .map(|row| display_width(&row[i]))
                    .fold(display_width(&name), usize::max);
                ColumnDescriptor { name, width }
            })
            .collect();

        Self { columns, rows }
    }

    /// Stringifies a query result, rendering SQL NULL as `NULL`.
    pub fn from_query_result(result: &QueryResult) -> Self {
        let names = result.columns.iter().map(|c| c.name.clone()).collect();
        let rows = result
            .rows
            .iter()
            .map(|row| row.iter().map(|value| value.to_display_string()).collect())
            .collect();
        Self::new(names, rows)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Title, separator, header, separator, then each row followed by a separator.
    pub fn render_lines(&self, title: &str) -> Vec<String> {
        let separator = self.separator();
        let header: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();

        let mut lines = Vec::with_capacity(4 + self.rows.len() * 2);
        lines.push(title.to_string());
        lines.push(separator.clone());
        lines.push(self.format_row(&header));
        lines.push(separator.clone());
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            lines.push(self.format_row(&cells));
            lines.push(separator.clone());
        }
        lines
    }

    /// `+` followed by `width + 2` dashes and a `+` for every column.
    pub fn separator(&self) -> String {
        self.columns.iter().fold("+".to_string(), |mut line, column| {
            line.push_str(&"-".repeat(column.width + 2));
            line.push('+');
            line
        })
    }

    fn format_row(&self, cells: &[&str]) -> String {
        self.columns
            .iter()
            .zip(cells)
            .fold("|".to_string(), |mut line, (column, cell)| {
                line.push_str(&format!(" {:<width$} |", cell, width = column.width));
                line
            })
    }
}

/// Character count, not terminal display width.
fn display_width(s: &str) -> usize {
    s.chars().count()
}
