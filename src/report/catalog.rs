//! Ordered, validated lists of titled report queries.

use super::storefront::STOREFRONT_REPORTS;
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// One report: a title line and the query whose result it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    pub title: String,
    pub query: String,
}

impl ReportSpec {
    pub fn new(title: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            query: query.into(),
        }
    }
}

/// Reports in the order they are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCatalog {
    reports: Vec<ReportSpec>,
}

impl ReportCatalog {
    /// Validates a list of reports. The list must be non-empty and no title
    /// or query may be blank.
    pub fn new(reports: Vec<ReportSpec>) -> Result<Self> {
        if reports.is_empty() {
            return Err(ReportError::config("The report catalog is empty"));
        }

        for (i, report) in reports.iter().enumerate() {
            if report.title.trim().is_empty() {
                return Err(ReportError::config(format!("Report {} has no title", i + 1)));
            }
            if report.query.trim().is_empty() {
                return Err(ReportError::config(format!(
                    "Report {} ('{}') has no query",
                    i + 1,
                    report.title
                )));
            }
        }

        Ok(Self { reports })
    }

    /// Pairs queries with titles positionally.
    pub fn from_parts(queries: Vec<String>, titles: Vec<String>) -> Result<Self> {
        if queries.len() != titles.len() {
            return Err(ReportError::config(format!(
                "The number of queries ({}) and titles ({}) must match",
                queries.len(),
                titles.len()
            )));
        }

        Self::new(
            titles
                .into_iter()
                .zip(queries)
                .map(|(title, query)| ReportSpec { title, query })
                .collect(),
        )
    }

    /// The twenty built-in storefront reports.
    pub fn storefront() -> Self {
        Self {
            reports: STOREFRONT_REPORTS
                .iter()
                .map(|(title, query)| ReportSpec::new(*title, *query))
                .collect(),
        }
    }

    /// Keeps only the reports at the given 1-based positions, in the order given.
    pub fn select(&self, positions: &[usize]) -> Result<Self> {
        let reports = positions
            .iter()
            .map(|&n| {
                n.checked_sub(1)
                    .and_then(|i| self.reports.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        ReportError::config(format!(
                            "No report number {n}; choose between 1 and {}",
                            self.reports.len()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(reports)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportSpec> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Numbered titles, one per line, as shown by `--list-reports`.
    pub fn listing(&self) -> Vec<String> {
        self.reports
            .iter()
            .enumerate()
            .map(|(i, report)| format!("{:>2}. {}", i + 1, report.title))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ReportCatalog {
    type Item = &'a ReportSpec;
    type IntoIter = std::slice::Iter<'a, ReportSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}
