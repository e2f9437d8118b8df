//! Reader of the resource fork of a stack.
//!
//! Stacks keep their icons, fonts, pictures and AddColor declarations in a
//! classic Mac OS resource fork. [`ResourceFork`] reads the map,
//! [`ResourceRepository`] groups the resources by kind and decodes each one
//! on first access.

pub mod color;
pub mod font;
pub mod fork;
pub mod image;
pub mod picture;
pub mod repository;

pub use color::{AddColor, AddColorElement};
pub use font::{BitmapFont, FontAssociation, FontStyleProperties, Glyph, VectorFont};
pub use fork::{ResourceFork, ResourceReference, ResourceType};
pub use image::Image;
pub use picture::{Picture, PictureVersion};
pub use repository::{FamilyBitmapFont, FamilyVectorFont, FontFamily, Resource, ResourceRepository, ResourceSummary};
