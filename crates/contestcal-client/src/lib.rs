//! CLI, configuration, output rendering and the refresh daemon
//!
//! This crate provides the `contestcal` command-line interface.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod flow;
pub mod render;

pub use app::App;
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
