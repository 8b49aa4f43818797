//! Shared numeric helpers used by every indicator.

pub mod math;
