//! The `PAGE` block: a slice of the card directory.
//!
//! A page does not know how many cards it lists nor how large its entries
//! are; both come from the list block, so a [`PageBlock`] is built with a
//! [`PageLayout`] taken from it.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::stack::checksum;
use crate::stack::consts::CARD_REFERENCES_OFFSET;
use crate::stack::search_hash::SearchHash;

/// Entry of a page describing one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReference {
    pub identifier: i32,
    pub marked: bool,
    /// Whether the fields of the card hold text
    pub has_text_content: bool,
    /// Whether the card is the first of its background
    pub is_start_of_background: bool,
    pub has_name: bool,
    pub search_hash: SearchHash,
}

/// Parameters of a page that are only stored in the list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub card_count: usize,
    pub card_reference_size: usize,
    pub hash_value_count: usize,
}

/// Accessors of a page block.
///
/// The card references start at the same offset in both layouts.
pub trait PageBlockReader {
    fn data(&self) -> &ByteRange;

    /// Card count and reference size, from the list block.
    fn layout(&self) -> &PageLayout;

    /// Identifier of the list block.
    fn list_identifier(&self) -> Result<i32>;

    fn checksum(&self) -> Result<u32>;

    fn identifier(&self) -> Result<i32> {
        self.data().read_i32(0x8)
    }

    /// The card references, in card order.
    fn card_references(&self) -> Result<Vec<CardReference>> {
        (0..self.layout().card_count).map(|i| self.card_reference(i)).collect()
    }

    /// Identifiers of the cards, without decoding flags and hashes.
    fn card_identifiers(&self) -> Result<Vec<i32>> {
        let size = self.layout().card_reference_size;
        (0..self.layout().card_count)
            .map(|i| self.data().read_i32(CARD_REFERENCES_OFFSET + i * size))
            .collect()
    }

    /// Compare the stored checksum with the one of the card identifiers.
    fn verify_checksum(&self) -> Result<()> {
        let computed = checksum::page_checksum(self.card_identifiers()?);
        checksum::verify("PAGE", self.checksum()?, computed)
    }

    fn card_reference(&self, index: usize) -> Result<CardReference> {
        let layout = self.layout();
        let data = self.data();
        let offset = CARD_REFERENCES_OFFSET + index * layout.card_reference_size;
        // The flags share their word with the start of the search hash
        let flags = offset + 4;
        Ok(CardReference {
            identifier: data.read_i32(offset)?,
            marked: data.read_flag16(flags, 12)?,
            has_text_content: data.read_flag16(flags, 13)?,
            is_start_of_background: data.read_flag16(flags, 14)?,
            has_name: data.read_flag16(flags, 15)?,
            search_hash: SearchHash::read(
                data,
                flags,
                layout.card_reference_size.saturating_sub(4),
                layout.hash_value_count,
            )?,
        })
    }
}

/// Page block of version 2 stacks.
#[derive(Debug, Clone)]
pub struct PageBlock {
    data: ByteRange,
    layout: PageLayout,
}

impl PageBlock {
    pub fn new(data: ByteRange, layout: PageLayout) -> Self {
        Self { data, layout }
    }
}

impl PageBlockReader for PageBlock {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn layout(&self) -> &PageLayout {
        &self.layout
    }

    fn list_identifier(&self) -> Result<i32> {
        self.data.read_i32(0x10)
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0x14)
    }
}

/// Page block of version 1 stacks.
#[derive(Debug, Clone)]
pub struct PageBlockV1 {
    data: ByteRange,
    layout: PageLayout,
}

impl PageBlockV1 {
    pub fn new(data: ByteRange, layout: PageLayout) -> Self {
        Self { data, layout }
    }
}

impl PageBlockReader for PageBlockV1 {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn layout(&self) -> &PageLayout {
        &self.layout
    }

    fn list_identifier(&self) -> Result<i32> {
        self.data.read_i32(0xC)
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0x10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;

    const LAYOUT: PageLayout = PageLayout {
        card_count: 2,
        card_reference_size: 12,
        hash_value_count: 3,
    };

    /// A version 2 page listing cards 8 and 15.
    fn page_bytes(checksum: u32) -> Vec<u8> {
        let mut data = vec![0u8; 0x30];
        data[0x8..0xC].copy_from_slice(&16i32.to_be_bytes()); // identifier
        data[0x10..0x14].copy_from_slice(&0x2Ai32.to_be_bytes()); // list id
        data[0x14..0x18].copy_from_slice(&checksum.to_be_bytes());
        // First reference: id 8, marked + start of background
        data[0x18..0x1C].copy_from_slice(&8i32.to_be_bytes());
        data[0x1C..0x1E].copy_from_slice(&0x5000u16.to_be_bytes());
        // Second reference: id 15, has name
        data[0x24..0x28].copy_from_slice(&15i32.to_be_bytes());
        data[0x28..0x2A].copy_from_slice(&0x8000u16.to_be_bytes());
        data
    }

    #[test]
    fn test_card_references() {
        let page = PageBlock::new(ByteRange::new(page_bytes(2)), LAYOUT);
        assert_eq!(page.identifier().unwrap(), 16);
        assert_eq!(page.list_identifier().unwrap(), 0x2A);

        let references = page.card_references().unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].identifier, 8);
        assert!(references[0].marked);
        assert!(references[0].is_start_of_background);
        assert!(!references[0].has_name);
        assert_eq!(references[0].search_hash.ints.len(), 2);
        assert_eq!(references[1].identifier, 15);
        assert!(references[1].has_name);
        assert!(!references[1].marked);
    }

    #[test]
    fn test_checksum() {
        let page = PageBlock::new(ByteRange::new(page_bytes(2)), LAYOUT);
        assert!(page.verify_checksum().is_ok());

        let page = PageBlock::new(ByteRange::new(page_bytes(5)), LAYOUT);
        let err = page.verify_checksum().unwrap_err();
        assert!(err.is_warning());
    }

    #[test]
    fn test_v1_offsets() {
        let mut data = page_bytes(0);
        data[0xC..0x10].copy_from_slice(&0x2Ai32.to_be_bytes());
        data[0x10..0x14].copy_from_slice(&2u32.to_be_bytes());
        let page = PageBlockV1::new(ByteRange::new(data), LAYOUT);
        assert_eq!(page.list_identifier().unwrap(), 0x2A);
        assert!(page.verify_checksum().is_ok());
    }

    #[test]
    fn test_too_many_cards() {
        let layout = PageLayout {
            card_count: 3,
            ..LAYOUT
        };
        let page = PageBlock::new(ByteRange::new(page_bytes(2)), layout);
        assert!(matches!(page.card_references(), Err(Error::OutOfRange { .. })));
    }
}
