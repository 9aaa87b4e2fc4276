//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod analysis;
pub mod suggest;

pub use analysis::{AnalysisError, AnalysisRouter, LocalHeuristicAnalyzer, RemoteAnalysisClient};
pub use suggest::SuggestionService;
