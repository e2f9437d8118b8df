//! The `CARD` block.

use std::rc::Rc;

use crate::common::binary::ByteRange;
use crate::common::error::Result;

use super::layer::{LayerBlock, LayerBlockReader, LayerBlockV1};

/// Accessors of a card block.
pub trait CardBlockReader {
    /// The fields shared with backgrounds.
    fn layer(&self) -> &Rc<dyn LayerBlockReader>;

    /// Identifier of the page listing the card.
    fn page_identifier(&self) -> Result<i32>;

    fn background_identifier(&self) -> Result<i32>;

    fn identifier(&self) -> Result<i32> {
        self.layer().identifier()
    }
}

/// Card block of version 2 stacks.
#[derive(Debug, Clone)]
pub struct CardBlock {
    layer: Rc<dyn LayerBlockReader>,
}

impl CardBlock {
    pub const PART_OFFSET: usize = 0x36;

    pub fn new(data: ByteRange) -> Self {
        Self {
            layer: Rc::new(LayerBlock::new(data, Self::PART_OFFSET)),
        }
    }
}

impl CardBlockReader for CardBlock {
    fn layer(&self) -> &Rc<dyn LayerBlockReader> {
        &self.layer
    }

    fn page_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x20)
    }

    fn background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x24)
    }
}

/// Card block of version 1 stacks.
#[derive(Debug, Clone)]
pub struct CardBlockV1 {
    layer: Rc<dyn LayerBlockReader>,
}

impl CardBlockV1 {
    pub const PART_OFFSET: usize = 0x32;

    pub fn new(data: ByteRange) -> Self {
        Self {
            layer: Rc::new(LayerBlockV1::new(data, Self::PART_OFFSET)),
        }
    }
}

impl CardBlockReader for CardBlockV1 {
    fn layer(&self) -> &Rc<dyn LayerBlockReader> {
        &self.layer
    }

    fn page_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x1C)
    }

    fn background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::blocks::layer::tests::layer_bytes;

    #[test]
    fn test_card_v2() {
        let mut header = vec![0u8; CardBlock::PART_OFFSET];
        header[0x8..0xC].copy_from_slice(&0x2A00i32.to_be_bytes());
        header[0x20..0x24].copy_from_slice(&0x10i32.to_be_bytes());
        header[0x24..0x28].copy_from_slice(&0x3000i32.to_be_bytes());
        let card = CardBlock::new(ByteRange::new(layer_bytes(header, &[], &[], "First", "")));
        assert_eq!(card.identifier().unwrap(), 0x2A00);
        assert_eq!(card.page_identifier().unwrap(), 0x10);
        assert_eq!(card.background_identifier().unwrap(), 0x3000);
        assert_eq!(card.layer().name().unwrap(), "First");
        assert!(card.layer().parts().unwrap().is_empty());
    }

    #[test]
    fn test_card_v1() {
        let mut header = vec![0u8; CardBlockV1::PART_OFFSET];
        header[0x1C..0x20].copy_from_slice(&0x11i32.to_be_bytes());
        header[0x20..0x24].copy_from_slice(&0x3001i32.to_be_bytes());
        let card = CardBlockV1::new(ByteRange::new(layer_bytes(header, &[], &[], "", "")));
        assert_eq!(card.page_identifier().unwrap(), 0x11);
        assert_eq!(card.background_identifier().unwrap(), 0x3001);
    }
}
