//! Incident Analysis
//!
//! Router over a remote LLM client with a local keyword heuristic as the
//! guaranteed fallback.

pub mod error;
pub mod heuristic;
pub mod prompt;
pub mod remote;
pub mod response;
pub mod router;

pub use error::AnalysisError;
pub use heuristic::{HeuristicRule, HeuristicVerdict, LocalHeuristicAnalyzer};
pub use prompt::{build_prompt, AnalysisPrompt, Preview};
pub use remote::{AttemptRecord, RemoteAnalysisClient, RemoteCompletion, RemoteFailure, RetryPolicy};
pub use response::{parse_completion, ParsedCompletion};
pub use router::AnalysisRouter;
