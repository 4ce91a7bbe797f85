//! Video annotator CLI library.
//!
//! This crate provides the CLI interface for annotating a video's time intervals.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ObjectsAction};
pub use config::Config;
