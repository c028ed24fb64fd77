//! CLI commands

pub mod config;
pub mod datasets;
pub mod eval;
