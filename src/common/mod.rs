//! Common types and utilities shared by the stack, resource and script readers.
//!
//! This module provides the byte views every block reader is built on, the
//! crate error type, geometry, Mac OS Roman text handling and the lazy cells
//! of the domain model.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod geometry;
pub mod lazy;
pub mod text;

// Re-exports for convenience
pub use binary::ByteRange;
pub use error::{Error, Result};
pub use geometry::{Point, Rectangle, Size};
pub use lazy::LazyField;
