//! CLI subcommand implementations.

pub mod list;
pub mod objects;
pub mod remove;
pub mod save;
pub mod status;
pub mod util;
pub mod window;
