//! The `BKGD` block.
//!
//! Backgrounds form a circular doubly-linked list starting at the first
//! background of the stack header.

use std::rc::Rc;

use crate::common::binary::ByteRange;
use crate::common::error::Result;

use super::layer::{LayerBlock, LayerBlockReader, LayerBlockV1};

/// Accessors of a background block.
pub trait BackgroundBlockReader {
    fn layer(&self) -> &Rc<dyn LayerBlockReader>;

    /// Number of cards using the background.
    fn card_count(&self) -> Result<u32>;

    fn next_background_identifier(&self) -> Result<i32>;

    fn previous_background_identifier(&self) -> Result<i32>;

    fn identifier(&self) -> Result<i32> {
        self.layer().identifier()
    }
}

/// Background block of version 2 stacks.
#[derive(Debug, Clone)]
pub struct BackgroundBlock {
    layer: Rc<dyn LayerBlockReader>,
}

impl BackgroundBlock {
    pub const PART_OFFSET: usize = 0x32;

    pub fn new(data: ByteRange) -> Self {
        Self {
            layer: Rc::new(LayerBlock::new(data, Self::PART_OFFSET)),
        }
    }
}

impl BackgroundBlockReader for BackgroundBlock {
    fn layer(&self) -> &Rc<dyn LayerBlockReader> {
        &self.layer
    }

    fn card_count(&self) -> Result<u32> {
        self.layer.data().read_u32(0x18)
    }

    fn next_background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x1C)
    }

    fn previous_background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x20)
    }
}

/// Background block of version 1 stacks.
#[derive(Debug, Clone)]
pub struct BackgroundBlockV1 {
    layer: Rc<dyn LayerBlockReader>,
}

impl BackgroundBlockV1 {
    pub const PART_OFFSET: usize = 0x2E;

    pub fn new(data: ByteRange) -> Self {
        Self {
            layer: Rc::new(LayerBlockV1::new(data, Self::PART_OFFSET)),
        }
    }
}

impl BackgroundBlockReader for BackgroundBlockV1 {
    fn layer(&self) -> &Rc<dyn LayerBlockReader> {
        &self.layer
    }

    fn card_count(&self) -> Result<u32> {
        self.layer.data().read_u32(0x14)
    }

    fn next_background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x18)
    }

    fn previous_background_identifier(&self) -> Result<i32> {
        self.layer.data().read_i32(0x1C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::blocks::layer::tests::{content_bytes, layer_bytes};

    #[test]
    fn test_background_v2() {
        let mut header = vec![0u8; BackgroundBlock::PART_OFFSET];
        header[0x8..0xC].copy_from_slice(&0x3000i32.to_be_bytes());
        header[0x18..0x1C].copy_from_slice(&4u32.to_be_bytes());
        header[0x1C..0x20].copy_from_slice(&0x3100i32.to_be_bytes());
        header[0x20..0x24].copy_from_slice(&0x3200i32.to_be_bytes());
        let data = layer_bytes(header, &[], &[content_bytes(1, "default")], "Main", "");
        let background = BackgroundBlock::new(ByteRange::new(data));
        assert_eq!(background.identifier().unwrap(), 0x3000);
        assert_eq!(background.card_count().unwrap(), 4);
        assert_eq!(background.next_background_identifier().unwrap(), 0x3100);
        assert_eq!(background.previous_background_identifier().unwrap(), 0x3200);
        assert_eq!(background.layer().name().unwrap(), "Main");
        let contents = background.layer().contents().unwrap();
        assert_eq!(contents[0].string().unwrap(), "default");
    }

    #[test]
    fn test_background_v1() {
        let mut header = vec![0u8; BackgroundBlockV1::PART_OFFSET];
        header[0x14..0x18].copy_from_slice(&2u32.to_be_bytes());
        header[0x18..0x1C].copy_from_slice(&0x10i32.to_be_bytes());
        header[0x1C..0x20].copy_from_slice(&0x10i32.to_be_bytes());
        let background = BackgroundBlockV1::new(ByteRange::new(layer_bytes(header, &[], &[], "", "")));
        assert_eq!(background.card_count().unwrap(), 2);
        assert_eq!(background.next_background_identifier().unwrap(), 0x10);
        assert_eq!(background.previous_background_identifier().unwrap(), 0x10);
    }
}
