//! Signal evaluation interfaces.

pub mod engine;
pub mod rules;

pub use engine::SignalEngine;
pub use rules::*;
