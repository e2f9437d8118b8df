//! Reader of the data fork of a stack.
//!
//! [`ParsedFile`] checks the header and reads the block directory, the
//! [`blocks`] readers decode single blocks, and [`model`] assembles them into
//! a [`Stack`].

pub mod blocks;
pub mod checksum;
pub mod consts;
pub mod decrypt;
pub mod file;
pub mod master;
pub mod model;
pub mod options;
pub mod search_hash;
pub mod version;

pub use consts::BlockKind;
pub use file::ParsedFile;
pub use model::{Background, Card, Layer, Part, PartContent, Stack};
pub use options::OpenOptions;
pub use search_hash::SearchHash;
pub use version::FileVersion;
