//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nexus System - incident analysis with AI and local fallback.
#[derive(Parser, Debug, Clone)]
#[command(name = "nexus-system")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ~/.nexus/config.json).
    #[arg(short, long, env = "NEXUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze an event JSON document without storing it.
    Analyze {
        /// File to read, or `-` for stdin.
        input: String,
    },

    /// Store an event JSON document.
    Ingest {
        /// File to read, or `-` for stdin.
        input: String,
    },

    /// Store a synthetic demo event.
    Sample,

    /// Analyze a stored event and record the suggestion.
    Suggest {
        /// Event id.
        event_id: String,
    },

    /// List recent events.
    Events {
        /// Maximum number of events.
        #[arg(default_value_t = 20)]
        limit: usize,
    },

    /// List stored suggestions for an event.
    Suggestions {
        /// Event id.
        event_id: String,
    },

    /// Show database and remote AI readiness.
    Status,

    /// Liveness check.
    Health,
}
