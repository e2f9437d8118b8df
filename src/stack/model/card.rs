//! Cards.

use std::rc::Rc;

use crate::common::error::{Error, Result};
use crate::common::lazy::LazyField;
use crate::stack::consts::BlockKind;
use crate::stack::blocks::{CardBlockReader, CardReference, IndexedStyle, LayerKind};
use crate::stack::file::ParsedFile;

use super::background::Background;
use super::content::{ContentRecord, PartContent};
use super::layer::Layer;

macro_rules! card_field {
    ($block:expr, $accessor:ident) => {{
        let block = Rc::clone(&$block);
        LazyField::new(move || block.with(|b| b.$accessor())?)
    }};
}

pub struct Card {
    pub layer: Layer,
    /// Entry of the card in its page
    pub reference: CardReference,
    pub page_identifier: LazyField<i32>,
    pub background_identifier: LazyField<i32>,
    pub background: LazyField<Rc<Background>>,
    /// Contents the card holds for the fields of its background
    pub background_part_contents: Rc<LazyField<Vec<ContentRecord>>>,
}

impl Card {
    /// Build a card from its page entry, its block is located on first access.
    pub fn load(
        file: &Rc<ParsedFile>,
        reference: CardReference,
        backgrounds: &Rc<LazyField<Vec<Rc<Background>>>>,
        styles: &Rc<LazyField<Vec<IndexedStyle>>>,
    ) -> Self {
        let identifier = reference.identifier;
        let block: Rc<LazyField<Rc<dyn CardBlockReader>>> = {
            let file = Rc::clone(file);
            Rc::new(LazyField::new(move || file.card_block(identifier).map(Rc::from)))
        };
        Self::from_block(reference, block, backgrounds, styles)
    }

    fn from_block(
        reference: CardReference,
        block: Rc<LazyField<Rc<dyn CardBlockReader>>>,
        backgrounds: &Rc<LazyField<Vec<Rc<Background>>>>,
        styles: &Rc<LazyField<Vec<IndexedStyle>>>,
    ) -> Self {
        let layer_block = {
            let block = Rc::clone(&block);
            Rc::new(LazyField::new(move || block.with(|b| Rc::clone(b.layer()))))
        };
        let layer = Layer::new(reference.identifier, LayerKind::Card, layer_block, styles);

        let background = {
            let block = Rc::clone(&block);
            let backgrounds = Rc::clone(backgrounds);
            LazyField::new(move || {
                let identifier = block.with(|b| b.background_identifier())??;
                backgrounds
                    .with(|list| list.iter().find(|b| b.layer.identifier == identifier).cloned())?
                    .ok_or_else(|| Error::MissingBlock {
                        kind: BlockKind::Background.to_string(),
                        identifier,
                    })
            })
        };

        let background_part_contents = {
            let contents = Rc::clone(&layer.contents);
            Rc::new(LazyField::derived(move || {
                contents.with(|records| {
                    records
                        .iter()
                        .filter(|r| r.layer_kind == LayerKind::Background)
                        .cloned()
                        .collect()
                })
            }))
        };
        LazyField::depends_on(&background_part_contents, &*layer.contents);

        Card {
            page_identifier: card_field!(block, page_identifier),
            background_identifier: card_field!(block, background_identifier),
            layer,
            reference,
            background,
            background_part_contents,
        }
    }

    /// The text a field of the background shows on this card.
    ///
    /// Fields with shared text show the same text on every card, the others
    /// show what the card stores for them.
    pub fn background_field_content(&self, part_identifier: i32) -> Result<PartContent> {
        let background = self.background.get()?;
        if let Some(part) = background.layer.part(part_identifier)?
            && let Some(field) = part.as_field()
            && field.shared_text.get()?
        {
            return part.content.get();
        }
        self.background_part_contents.with(|records| {
            records
                .iter()
                .find(|r| r.identifier == part_identifier)
                .map(|r| r.content.clone())
                .unwrap_or_default()
        })
    }
}
