//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interval annotator for videos.
///
/// Saves predicate annotations over time intervals of a video, keeps track of the
/// objects in play, and exports the result for ELAN.
#[derive(Debug, Parser)]
#[command(name = "va", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The video being annotated. Its file stem names the session files.
    #[arg(long, global = true)]
    pub video: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the session files and what they contain.
    Status,

    /// Validate and save an annotation.
    Save {
        /// Start offset, `[[HH:]MM:]SS[.mmm]`.
        #[arg(long)]
        start: String,

        /// End offset, `[[HH:]MM:]SS[.mmm]`.
        #[arg(long)]
        end: String,

        /// The predicate, e.g. PUT.
        #[arg(long)]
        predicate: String,

        /// A predicate argument (repeatable).
        #[arg(long = "arg", value_name = "NAME=VALUE")]
        arguments: Vec<String>,

        /// A property (repeatable). Overrides the task's default.
        #[arg(long = "prop", value_name = "NAME=VALUE")]
        properties: Vec<String>,

        /// Tier to use when the task lets the annotator choose.
        #[arg(long)]
        tier: Option<String>,
    },

    /// Remove a saved annotation.
    Remove {
        /// Identifier of the annotation, e.g. a0007.
        id: String,
    },

    /// Manage the object pool.
    Objects {
        #[command(subcommand)]
        action: ObjectsAction,
    },

    /// List saved annotations.
    List {
        /// Only show annotations matching this term (case-insensitive).
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON lines in event-log format.
        #[arg(long)]
        json: bool,
    },

    /// Show the frames around an offset.
    Window {
        /// Center offset, `[[HH:]MM:]SS[.mmm]`.
        #[arg(long)]
        at: String,
    },
}

/// Object pool actions.
#[derive(Debug, Subcommand)]
pub enum ObjectsAction {
    /// Put objects in play.
    Add {
        object_type: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Return objects to the pool.
    Remove {
        object_type: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show available and in-play objects.
    List { object_type: Option<String> },
}
