//! Hyperstack - A Rust library for reading legacy HyperCard stacks
//!
//! This library decodes the data fork of a stack into a lazily built model of
//! cards, backgrounds and parts, reads the resources of its resource fork,
//! and parses the HyperTalk scripts attached to every object.
//!
//! # Features
//!
//! - **Stack reader**: Version 1 and version 2 stacks, private stacks with or
//!   without their password, checksum verification of the card directory
//! - **Lazy model**: Blocks are only located and decoded when a field is read
//! - **Resource fork**: Icons, bitmap fonts, pictures and AddColor data
//! - **Script grammar**: Handlers, statements and expressions of HyperTalk
//!
//! # Example - Reading the cards of a stack
//!
//! ```no_run
//! use hyperstack::stack::OpenOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("Home")?;
//! let stack = hyperstack::open_stack(data, &OpenOptions::default())?;
//!
//! for card in stack.cards.get()? {
//!     println!("Card {}: {}", card.layer.identifier, card.layer.name.get()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Parsing the script of a stack
//!
//! ```no_run
//! use hyperstack::stack::OpenOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stack = hyperstack::open_stack(std::fs::read("Home")?, &OpenOptions::default())?;
//! let script = hyperstack::parse_script(&stack.script.get()?)?;
//!
//! for handler in &script.handlers {
//!     println!("{:?} {}", handler.kind, handler.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Listing the icons of a resource fork
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fork = hyperstack::decode_resource_fork(std::fs::read("Home.rsrc")?)?;
//! for summary in fork.summaries() {
//!     println!("{summary:?}");
//! }
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;

/// Byte views, errors, geometry, text and lazy cells shared by the readers
pub mod common;

/// Resource fork reader
///
/// Icons, fonts, pictures and color declarations stored next to a stack.
pub mod resource;

/// HyperTalk tokenizer and grammar
pub mod script;

/// Data fork reader
///
/// The block directory of a stack and the card/background model built on it.
pub mod stack;

pub use common::{Error, Result};
pub use resource::ResourceRepository;
pub use script::{Script, parse_expression, parse_script};
pub use stack::{OpenOptions, Stack};

/// Open the data fork of a stack and build its model.
///
/// Only the header and the block directory are read here; cards and
/// backgrounds are decoded when first accessed.
pub fn open_stack(data: impl Into<Bytes>, options: &OpenOptions) -> Result<Stack> {
    let file = stack::ParsedFile::open(data, options)?;
    log::debug!("Opened a {:?} stack", file.version());
    Stack::open(file)
}

/// Read the resource map of a resource fork.
pub fn decode_resource_fork(data: impl Into<Bytes>) -> Result<ResourceRepository> {
    ResourceRepository::read(data)
}
