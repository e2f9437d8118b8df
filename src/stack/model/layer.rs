//! Fields shared by cards and backgrounds.

use std::rc::Rc;

use crate::common::error::Result;
use crate::common::lazy::LazyField;
use crate::stack::blocks::{IndexedStyle, LayerBlockReader, LayerKind};

use super::content::ContentRecord;
use super::part::Part;

/// Build a lazy field reading one accessor of the layer block.
macro_rules! layer_field {
    ($block:expr, $accessor:ident) => {{
        let block = Rc::clone(&$block);
        LazyField::new(move || block.with(|b| b.$accessor())?)
    }};
}

/// A card or a background.
pub struct Layer {
    pub identifier: i32,
    pub kind: LayerKind,
    pub name: LazyField<String>,
    pub script: LazyField<String>,
    /// Identifier of the bitmap block of the picture, if any
    pub bitmap_identifier: LazyField<Option<i32>>,
    pub cant_delete: LazyField<bool>,
    pub show_picture: LazyField<bool>,
    pub dont_search: LazyField<bool>,
    pub next_available_part_identifier: LazyField<u16>,
    pub parts: Rc<LazyField<Vec<Rc<Part>>>>,
    /// Recomputed when `parts` is set
    pub part_count: Rc<LazyField<usize>>,
    /// Every content record of the layer, recomputed when the style table is set
    pub contents: Rc<LazyField<Vec<ContentRecord>>>,
}

impl Layer {
    /// Build a layer over a lazily located block.
    pub fn new(
        identifier: i32,
        kind: LayerKind,
        block: Rc<LazyField<Rc<dyn LayerBlockReader>>>,
        styles: &Rc<LazyField<Vec<IndexedStyle>>>,
    ) -> Self {
        let contents = {
            let block = Rc::clone(&block);
            let styles = Rc::clone(styles);
            Rc::new(LazyField::derived(move || {
                let records = block.with(|b| b.contents())??;
                styles.with(|styles| {
                    records
                        .iter()
                        .map(|record| ContentRecord::decode(record.as_ref(), styles))
                        .collect::<Result<Vec<_>>>()
                })?
            }))
        };
        LazyField::depends_on(&contents, &**styles);

        let parts = {
            let block = Rc::clone(&block);
            let contents = Rc::clone(&contents);
            Rc::new(LazyField::new(move || {
                let blocks = block.with(|b| b.parts())??;
                blocks
                    .into_iter()
                    .map(|part| Part::load(part, kind, Rc::clone(&contents)).map(Rc::new))
                    .collect::<Result<Vec<_>>>()
            }))
        };

        let part_count = {
            let parts = Rc::clone(&parts);
            Rc::new(LazyField::derived(move || parts.with(Vec::len)))
        };
        LazyField::depends_on(&part_count, &*parts);

        Layer {
            identifier,
            kind,
            name: layer_field!(block, name),
            script: layer_field!(block, script),
            bitmap_identifier: layer_field!(block, bitmap_identifier),
            cant_delete: layer_field!(block, cant_delete),
            show_picture: layer_field!(block, show_picture),
            dont_search: layer_field!(block, dont_search),
            next_available_part_identifier: layer_field!(block, next_available_identifier),
            parts,
            part_count,
            contents,
        }
    }

    /// The part with an identifier.
    pub fn part(&self, identifier: i32) -> Result<Option<Rc<Part>>> {
        self.parts
            .with(|parts| parts.iter().find(|p| p.identifier == identifier).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::binary::ByteRange;
    use crate::stack::blocks::layer::tests::{content_bytes, layer_bytes};
    use crate::stack::blocks::LayerBlock;
    use crate::stack::blocks::part::tests::part_bytes;

    fn sample_layer() -> Layer {
        let mut header = vec![0u8; 0x32];
        header[0x8..0xC].copy_from_slice(&0x3000i32.to_be_bytes());
        let data = layer_bytes(
            header,
            &[part_bytes(1, false, "Title", ""), part_bytes(2, true, "Go", "")],
            &[content_bytes(1, "Welcome")],
            "Main",
            "on openBackground\rend openBackground",
        );
        let block: Rc<dyn LayerBlockReader> = Rc::new(LayerBlock::new(ByteRange::new(data), 0x32));
        Layer::new(
            0x3000,
            LayerKind::Background,
            Rc::new(LazyField::ready(block)),
            &Rc::new(LazyField::ready(Vec::new())),
        )
    }

    #[test]
    fn test_layer_fields() {
        let layer = sample_layer();
        assert_eq!(layer.name.get().unwrap(), "Main");
        assert_eq!(layer.script.get().unwrap(), "on openBackground\rend openBackground");
        assert_eq!(layer.bitmap_identifier.get().unwrap(), None);
        assert!(layer.show_picture.get().unwrap());
        assert_eq!(layer.next_available_part_identifier.get().unwrap(), 100);
    }

    #[test]
    fn test_parts_and_contents() {
        let layer = sample_layer();
        assert_eq!(layer.part_count.get().unwrap(), 2);
        let title = layer.part(1).unwrap().unwrap();
        assert_eq!(title.content.get().unwrap().string(), "Welcome");
        assert!(layer.part(9).unwrap().is_none());
    }

    #[test]
    fn test_part_count_follows_parts() {
        let layer = sample_layer();
        assert_eq!(layer.part_count.get().unwrap(), 2);
        layer.parts.set(Vec::new()).unwrap();
        assert_eq!(layer.part_count.get().unwrap(), 0);
    }
}
