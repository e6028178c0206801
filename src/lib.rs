//! seedreport - idempotent schema bootstrapping and aligned text reports.
//!
//! This library exposes the core modules for use by the binary and the
//! integration tests.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod report;
