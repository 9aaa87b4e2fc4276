//! Integration Tests Module
//!
//! End-to-end tests for incident analysis: the router against scripted
//! providers, and the suggestion service against an in-memory database.

// Scripted LLM provider shared by the tests below
mod support;

// Router: fallback, retry exhaustion, model fallback, response parsing
mod analysis_router_test;

// Suggestion service and commands over SQLite
mod suggestion_service_test;
