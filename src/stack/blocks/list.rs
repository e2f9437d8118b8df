//! The `LIST` block: index of the pages of the card directory.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::stack::checksum;
use crate::stack::consts::{PAGE_REFERENCE_SIZE, PAGE_REFERENCES_OFFSET};

/// Entry of the list pointing to a `PAGE` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReference {
    /// Identifier of the page block
    pub identifier: i32,
    /// Number of cards listed in the page
    pub card_count: u16,
}

/// Accessors of the list block.
pub trait ListBlockReader {
    fn data(&self) -> &ByteRange;

    fn page_count(&self) -> Result<u32>;

    /// Size of a page block, always 0x800.
    fn page_size(&self) -> Result<u32>;

    /// Number of card references in all the pages.
    fn card_count(&self) -> Result<u32>;

    /// Size of a card reference in the pages.
    fn card_reference_size(&self) -> Result<u16>;

    /// Number of hash integers in a card reference.
    fn hash_count_in_card_reference(&self) -> Result<u16>;

    /// Parameter of the search hashes of the cards.
    fn hash_value_count(&self) -> Result<u16>;

    fn checksum(&self) -> Result<u32>;

    fn total_page_entry_count(&self) -> Result<u32>;

    fn identifier(&self) -> Result<i32> {
        self.data().read_i32(0x8)
    }

    /// Page references, in card order.
    ///
    /// The references start at the same offset in both layouts.
    fn page_references(&self) -> Result<Vec<PageReference>> {
        let count = self.page_count()? as usize;
        (0..count)
            .map(|i| {
                let offset = PAGE_REFERENCES_OFFSET + i * PAGE_REFERENCE_SIZE;
                Ok(PageReference {
                    identifier: self.data().read_i32(offset)?,
                    card_count: self.data().read_u16(offset + 4)?,
                })
            })
            .collect()
    }

    /// Compare the stored checksum with the one of the page references.
    fn verify_checksum(&self) -> Result<()> {
        let references = self.page_references()?;
        let computed = checksum::list_checksum(references.iter().map(|r| (r.identifier, r.card_count)));
        checksum::verify("LIST", self.checksum()?, computed)
    }
}

/// List block of version 2 stacks.
#[derive(Debug, Clone)]
pub struct ListBlock {
    data: ByteRange,
}

impl ListBlock {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }
}

impl ListBlockReader for ListBlock {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn page_count(&self) -> Result<u32> {
        self.data.read_u32(0x10)
    }

    fn page_size(&self) -> Result<u32> {
        self.data.read_u32(0x14)
    }

    fn card_count(&self) -> Result<u32> {
        self.data.read_u32(0x18)
    }

    fn card_reference_size(&self) -> Result<u16> {
        self.data.read_u16(0x1C)
    }

    fn hash_count_in_card_reference(&self) -> Result<u16> {
        self.data.read_u16(0x20)
    }

    fn hash_value_count(&self) -> Result<u16> {
        self.data.read_u16(0x22)
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0x24)
    }

    fn total_page_entry_count(&self) -> Result<u32> {
        self.data.read_u32(0x28)
    }
}

/// List block of version 1 stacks.
#[derive(Debug, Clone)]
pub struct ListBlockV1 {
    data: ByteRange,
}

impl ListBlockV1 {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }
}

impl ListBlockReader for ListBlockV1 {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn page_count(&self) -> Result<u32> {
        self.data.read_u32(0xC)
    }

    fn page_size(&self) -> Result<u32> {
        self.data.read_u32(0x10)
    }

    fn card_count(&self) -> Result<u32> {
        self.data.read_u32(0x14)
    }

    fn card_reference_size(&self) -> Result<u16> {
        self.data.read_u16(0x18)
    }

    fn hash_count_in_card_reference(&self) -> Result<u16> {
        self.data.read_u16(0x1C)
    }

    fn hash_value_count(&self) -> Result<u16> {
        self.data.read_u16(0x1E)
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0x20)
    }

    fn total_page_entry_count(&self) -> Result<u32> {
        self.data.read_u32(0x24)
    }
}
