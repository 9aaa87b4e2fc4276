//! Commands
//!
//! Entry points called by the binary. Each wraps a service call in a
//! `CommandResponse` envelope.

pub mod events;
pub mod health;
pub mod suggest;

pub use events::*;
pub use health::*;
pub use suggest::*;
