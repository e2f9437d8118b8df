//! The root of the model of an opened stack.

use std::rc::Rc;

use crate::common::error::Result;
use crate::common::geometry::{Point, Rectangle, Size};
use crate::common::lazy::LazyField;
use crate::stack::blocks::{FontReference, IndexedStyle, Pattern, StackBlockReader, UserLevel, Version};
use crate::stack::file::ParsedFile;
use crate::stack::version::FileVersion;

use super::background::Background;
use super::card::Card;

macro_rules! header_field {
    ($header:expr, $accessor:ident) => {{
        let header = Rc::clone(&$header);
        LazyField::new(move || header.$accessor())
    }};
}

/// An opened stack.
///
/// Only the header is located when the stack is built. Cards, backgrounds and
/// the text tables are decoded when first read.
pub struct Stack {
    file: Rc<ParsedFile>,
    pub version: FileVersion,
    pub user_level: LazyField<UserLevel>,
    pub cant_abort: LazyField<bool>,
    pub cant_delete: LazyField<bool>,
    pub cant_modify: LazyField<bool>,
    pub cant_peek: LazyField<bool>,
    pub private_access: LazyField<bool>,
    pub password_hash: LazyField<Option<u32>>,
    pub version_at_creation: LazyField<Option<Version>>,
    pub version_at_last_compacting: LazyField<Option<Version>>,
    pub version_at_last_modification_since_last_compacting: LazyField<Option<Version>>,
    pub version_at_last_modification: LazyField<Option<Version>>,
    pub window_rectangle: LazyField<Rectangle>,
    pub screen_rectangle: LazyField<Rectangle>,
    pub scroll_point: LazyField<Point>,
    /// Size of the cards
    pub size: LazyField<Size>,
    pub patterns: LazyField<Vec<Pattern>>,
    pub script: LazyField<String>,
    /// Number of cards the directory declares
    pub declared_card_count: LazyField<u32>,
    pub styles: Rc<LazyField<Vec<IndexedStyle>>>,
    pub fonts: LazyField<Vec<FontReference>>,
    pub backgrounds: Rc<LazyField<Vec<Rc<Background>>>>,
    /// Cards in stack order
    pub cards: Rc<LazyField<Vec<Rc<Card>>>>,
    /// Recomputed when `cards` is set
    pub card_count: Rc<LazyField<usize>>,
}

impl Stack {
    /// Build the model of a parsed file.
    pub fn open(file: ParsedFile) -> Result<Self> {
        let file = Rc::new(file);
        let header: Rc<dyn StackBlockReader> = Rc::from(file.stack_block()?);

        let declared_card_count = {
            let file = Rc::clone(&file);
            LazyField::new(move || file.list_block()?.card_count())
        };

        let styles = {
            let file = Rc::clone(&file);
            Rc::new(LazyField::new(move || match file.style_block()? {
                Some(block) => block.styles(),
                None => Ok(Vec::new()),
            }))
        };

        let fonts = {
            let file = Rc::clone(&file);
            LazyField::new(move || match file.font_block()? {
                Some(block) => block.font_references(),
                None => Ok(Vec::new()),
            })
        };

        let backgrounds = {
            let file = Rc::clone(&file);
            let styles = Rc::clone(&styles);
            Rc::new(LazyField::new(move || {
                Ok(file
                    .background_identifiers()?
                    .into_iter()
                    .map(|identifier| Rc::new(Background::load(&file, identifier, &styles)))
                    .collect())
            }))
        };

        let cards = {
            let file = Rc::clone(&file);
            let styles = Rc::clone(&styles);
            let backgrounds = Rc::clone(&backgrounds);
            Rc::new(LazyField::new(move || {
                let references = file.card_references()?;
                log::debug!("Stack has {} cards", references.len());
                Ok(references
                    .into_iter()
                    .map(|reference| Rc::new(Card::load(&file, reference, &backgrounds, &styles)))
                    .collect())
            }))
        };

        let card_count = {
            let cards = Rc::clone(&cards);
            Rc::new(LazyField::derived(move || cards.with(Vec::len)))
        };
        LazyField::depends_on(&card_count, &*cards);

        Ok(Stack {
            version: file.version(),
            user_level: header_field!(header, user_level),
            cant_abort: header_field!(header, cant_abort),
            cant_delete: header_field!(header, cant_delete),
            cant_modify: header_field!(header, cant_modify),
            cant_peek: header_field!(header, cant_peek),
            private_access: header_field!(header, private_access),
            password_hash: header_field!(header, password_hash),
            version_at_creation: header_field!(header, version_at_creation),
            version_at_last_compacting: header_field!(header, version_at_last_compacting),
            version_at_last_modification_since_last_compacting: header_field!(
                header,
                version_at_last_modification_since_last_compacting
            ),
            version_at_last_modification: header_field!(header, version_at_last_modification),
            window_rectangle: header_field!(header, window_rectangle),
            screen_rectangle: header_field!(header, screen_rectangle),
            scroll_point: header_field!(header, scroll_point),
            size: header_field!(header, size),
            patterns: header_field!(header, patterns),
            script: header_field!(header, script),
            declared_card_count,
            styles,
            fonts,
            backgrounds,
            cards,
            card_count,
            file,
        })
    }

    /// The parsed file behind the model.
    #[inline]
    pub fn file(&self) -> &ParsedFile {
        &self.file
    }

    pub fn card(&self, identifier: i32) -> Result<Option<Rc<Card>>> {
        self.cards
            .with(|cards| cards.iter().find(|c| c.layer.identifier == identifier).cloned())
    }

    pub fn background(&self, identifier: i32) -> Result<Option<Rc<Background>>> {
        self.backgrounds
            .with(|backgrounds| backgrounds.iter().find(|b| b.layer.identifier == identifier).cloned())
    }

    /// Cards of a background, in stack order.
    pub fn cards_of_background(&self, identifier: i32) -> Result<Vec<Rc<Card>>> {
        let cards = self.cards.get()?;
        let mut found = Vec::new();
        for card in cards {
            if card.background_identifier.get()? == identifier {
                found.push(card);
            }
        }
        Ok(found)
    }

    /// Cards whose marked flag is set.
    pub fn marked_cards(&self) -> Result<Vec<Rc<Card>>> {
        self.cards
            .with(|cards| cards.iter().filter(|c| c.reference.marked).cloned().collect())
    }

    /// Cards that may contain a word, according to their search hashes.
    pub fn cards_maybe_containing(&self, word: &str) -> Result<Vec<Rc<Card>>> {
        self.cards.with(|cards| {
            cards
                .iter()
                .filter(|c| c.reference.search_hash.may_contain(word).unwrap_or(true))
                .cloned()
                .collect()
        })
    }

    /// Name of a font of the font table.
    pub fn font_name(&self, identifier: u16) -> Result<Option<String>> {
        self.fonts.with(|fonts| {
            fonts
                .iter()
                .find(|f| f.identifier == identifier)
                .map(|f| f.name.clone())
        })
    }
}
