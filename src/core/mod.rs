//! Core application primitives (pipeline, HTTP surface)

pub mod http;
pub mod pipeline;

pub use http::*;
pub use pipeline::*;
