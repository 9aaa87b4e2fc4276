//! Nexus System
//!
//! Incident analysis backend. It includes:
//! - Analysis router over a remote LLM with a local heuristic fallback
//! - SQLite storage for events and suggestions
//! - Command handlers and the CLI definition
//! - Data models and utilities

pub mod cli;
pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::response::*;
pub use models::settings::{AnalysisConfig, AppSettings};
pub use services::analysis::AnalysisRouter;
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
