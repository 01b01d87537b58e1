//! Utility modules shared by every front-end stage:
//! - Error types
//! - Source location tracking

pub mod errors;
pub mod location;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, SourceMap, Span};
