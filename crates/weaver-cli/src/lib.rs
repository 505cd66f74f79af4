//! Command line runner for the Note Weaver acceptance suite.
//!
//! The `note-weaver` binary loads feature files, runs them against the site
//! with the steps from `weaver-site` and writes a text, JSON or `JUnit`
//! report. This library holds its configuration, logging setup and command
//! handlers.

pub mod cli;
pub mod config;
pub mod logging;
mod output;

pub use output::ReportFormat;
