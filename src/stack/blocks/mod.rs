//! Readers of the blocks of the data fork.
//!
//! Each reader is a view over the bytes of one block. Accessors compute their
//! offset from scratch on every call, so they can be read in any order. Block
//! kinds whose version 1 layout differs have one trait and two readers.

pub mod background;
pub mod card;
pub mod content;
pub mod font;
pub mod layer;
pub mod list;
pub mod page;
pub mod part;
pub mod stack;
pub mod style;

pub use background::{BackgroundBlock, BackgroundBlockReader, BackgroundBlockV1};
pub use card::{CardBlock, CardBlockReader, CardBlockV1};
pub use content::{ContentBlock, ContentBlockReader, ContentBlockV1, FormattingChange, LayerKind};
pub use font::{FontBlock, FontReference};
pub use layer::{LayerBlock, LayerBlockReader, LayerBlockV1};
pub use list::{ListBlock, ListBlockReader, ListBlockV1, PageReference};
pub use page::{CardReference, PageBlock, PageBlockReader, PageBlockV1, PageLayout};
pub use part::{PartBlock, PartKind, PartStyle, TextAlign};
pub use stack::{FreeLocation, Pattern, StackBlock, StackBlockReader, StackBlockV1, UserLevel, Version};
pub use style::{IndexedStyle, StyleBlock, TextFormatting, TextStyle};
