//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod event;
pub mod response;
pub mod settings;

pub use event::*;
pub use response::*;
pub use settings::*;
