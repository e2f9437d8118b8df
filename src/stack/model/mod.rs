//! The object model of a stack.
//!
//! Entities are assembled from the block readers through [`LazyField`]s: a
//! field is decoded when it is first read, and an error decoding it only
//! affects that field.
//!
//! [`LazyField`]: crate::common::lazy::LazyField

pub mod background;
pub mod card;
pub mod content;
pub mod layer;
pub mod part;
pub mod stack;

pub use background::Background;
pub use card::Card;
pub use content::{ContentRecord, FormattingAssociation, PartContent, Text};
pub use layer::Layer;
pub use part::{ButtonProperties, FieldProperties, Part, PartProperties};
pub use stack::Stack;
