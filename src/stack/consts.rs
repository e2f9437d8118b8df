use std::fmt;

use crate::common::error::{Error, Result};

/// Kind name of the stack header block, always first in the file
pub const STACK_KIND: &[u8; 4] = b"STAK";

/// Offset of the stack format number in the stack block
pub const FORMAT_OFFSET: usize = 0x10;

/// Number of 32-bit words summed by the stack header checksum
pub const HEADER_CHECKSUM_WORDS: usize = 0x180;

/// Offset and length of the encrypted part of a private stack header
pub const ENCODED_HEADER_OFFSET: usize = 0x18;
pub const ENCODED_HEADER_LENGTH: usize = 0x32;

/// Card size used when the stack does not store one
pub const DEFAULT_CARD_WIDTH: i32 = 512;
pub const DEFAULT_CARD_HEIGHT: i32 = 342;

/// Offset of the first master directory entry
pub const MASTER_ENTRIES_OFFSET: usize = 0x20;

/// Offset of the first page reference in a list block
pub const PAGE_REFERENCES_OFFSET: usize = 0x30;

/// Size of a page reference in a list block
pub const PAGE_REFERENCE_SIZE: usize = 6;

/// Offset of the first card reference in a page block
pub const CARD_REFERENCES_OFFSET: usize = 0x18;

/// The kinds of block found in the data fork of a stack file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Stack,
    Master,
    List,
    Page,
    Card,
    Background,
    Bitmap,
    Style,
    Font,
    Free,
    Print,
    PageSetup,
    PrintFont,
    Tail,
}

impl BlockKind {
    /// The 4-byte name stored at offset 4 of the block.
    pub const fn tag(self) -> &'static [u8; 4] {
        match self {
            BlockKind::Stack => STACK_KIND,
            BlockKind::Master => b"MAST",
            BlockKind::List => b"LIST",
            BlockKind::Page => b"PAGE",
            BlockKind::Card => b"CARD",
            BlockKind::Background => b"BKGD",
            BlockKind::Bitmap => b"BMAP",
            BlockKind::Style => b"STBL",
            BlockKind::Font => b"FTBL",
            BlockKind::Free => b"FREE",
            BlockKind::Print => b"PRNT",
            BlockKind::PageSetup => b"PRST",
            BlockKind::PrintFont => b"PRFT",
            BlockKind::Tail => b"TAIL",
        }
    }

    /// The tag as a big-endian integer, the way it is compared in the file.
    #[inline]
    pub const fn tag_value(self) -> u32 {
        u32::from_be_bytes(*self.tag())
    }

    /// Recognize a 4-byte kind name.
    pub fn from_tag(tag: [u8; 4]) -> Result<Self> {
        const ALL: [BlockKind; 14] = [
            BlockKind::Stack,
            BlockKind::Master,
            BlockKind::List,
            BlockKind::Page,
            BlockKind::Card,
            BlockKind::Background,
            BlockKind::Bitmap,
            BlockKind::Style,
            BlockKind::Font,
            BlockKind::Free,
            BlockKind::Print,
            BlockKind::PageSetup,
            BlockKind::PrintFont,
            BlockKind::Tail,
        ];
        ALL.into_iter()
            .find(|kind| *kind.tag() == tag)
            .ok_or_else(|| Error::UnknownBlockKind(String::from_utf8_lossy(&tag).into_owned()))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.tag()))
    }
}
