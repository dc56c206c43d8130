//! CLI subcommands.

pub mod common;
pub mod config;
pub mod deploy;
pub mod deployments;
pub mod migrate;
pub mod package;
