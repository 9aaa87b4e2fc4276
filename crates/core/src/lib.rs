//! Nexus Core
//!
//! Foundational domain and error types for the Nexus System workspace. This
//! crate has no dependencies on application-level code (database, LLM
//! providers, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `event` - The ingested `Event` consumed by analysis
//! - `analysis` - The `AnalysisResult` value object and provider tags

pub mod analysis;
pub mod error;
pub mod event;

pub use analysis::{AnalysisResult, LOCAL_HEURISTIC_PROVIDER};
pub use error::{CoreError, CoreResult};
pub use event::{find_correlation_id, Event};
