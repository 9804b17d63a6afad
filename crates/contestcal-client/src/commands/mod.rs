//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod contests;
pub mod daemon;
