//! Unified error types for the hyperstack library.
//!
//! This module provides a single error type shared by the stack readers,
//! the resource fork readers and the script grammar.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
