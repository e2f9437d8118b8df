//! Backgrounds: layers shared by a run of cards.

use std::rc::Rc;

use crate::common::lazy::LazyField;
use crate::stack::blocks::{BackgroundBlockReader, IndexedStyle, LayerKind};
use crate::stack::file::ParsedFile;

use super::layer::Layer;

macro_rules! background_field {
    ($block:expr, $accessor:ident) => {{
        let block = Rc::clone(&$block);
        LazyField::new(move || block.with(|b| b.$accessor())?)
    }};
}

pub struct Background {
    pub layer: Layer,
    /// Number of cards using the background
    pub card_count: LazyField<u32>,
    pub next_background_identifier: LazyField<i32>,
    pub previous_background_identifier: LazyField<i32>,
}

impl Background {
    /// Build a background whose block is located on first access.
    pub fn load(file: &Rc<ParsedFile>, identifier: i32, styles: &Rc<LazyField<Vec<IndexedStyle>>>) -> Self {
        let block: Rc<LazyField<Rc<dyn BackgroundBlockReader>>> = {
            let file = Rc::clone(file);
            Rc::new(LazyField::new(move || file.background_block(identifier).map(Rc::from)))
        };
        Self::from_block(identifier, block, styles)
    }

    pub(crate) fn from_block(
        identifier: i32,
        block: Rc<LazyField<Rc<dyn BackgroundBlockReader>>>,
        styles: &Rc<LazyField<Vec<IndexedStyle>>>,
    ) -> Self {
        let layer_block = {
            let block = Rc::clone(&block);
            Rc::new(LazyField::new(move || block.with(|b| Rc::clone(b.layer()))))
        };
        Background {
            layer: Layer::new(identifier, LayerKind::Background, layer_block, styles),
            card_count: background_field!(block, card_count),
            next_background_identifier: background_field!(block, next_background_identifier),
            previous_background_identifier: background_field!(block, previous_background_identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::binary::ByteRange;
    use crate::stack::blocks::BackgroundBlock;
    use crate::stack::blocks::layer::tests::layer_bytes;

    #[test]
    fn test_background_fields() {
        let mut header = vec![0u8; BackgroundBlock::PART_OFFSET];
        header[0x8..0xC].copy_from_slice(&0x3000i32.to_be_bytes());
        header[0x18..0x1C].copy_from_slice(&3u32.to_be_bytes());
        header[0x1C..0x20].copy_from_slice(&0x3000i32.to_be_bytes());
        header[0x20..0x24].copy_from_slice(&0x3000i32.to_be_bytes());
        let reader: Rc<dyn BackgroundBlockReader> =
            Rc::new(BackgroundBlock::new(ByteRange::new(layer_bytes(header, &[], &[], "Only", ""))));

        let background = Background::from_block(
            0x3000,
            Rc::new(LazyField::ready(reader)),
            &Rc::new(LazyField::ready(Vec::new())),
        );
        assert_eq!(background.layer.name.get().unwrap(), "Only");
        assert_eq!(background.card_count.get().unwrap(), 3);
        assert_eq!(background.next_background_identifier.get().unwrap(), 0x3000);
    }
}
