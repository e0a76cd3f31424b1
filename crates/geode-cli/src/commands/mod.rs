//! Subcommand implementations.

pub mod browse;
pub mod config;
pub mod list;
mod query;
