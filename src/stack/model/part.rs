//! Buttons and fields.

use std::rc::Rc;

use crate::common::error::Result;
use crate::common::geometry::Rectangle;
use crate::common::lazy::LazyField;
use crate::stack::blocks::{LayerKind, PartBlock, PartKind, PartStyle, TextAlign, TextStyle};

use super::content::{ContentRecord, PartContent};

/// Build a lazy field reading one accessor of a part block.
macro_rules! part_field {
    ($block:expr, $accessor:ident) => {{
        let block = $block.clone();
        LazyField::new(move || block.$accessor())
    }};
}

/// Properties of buttons only.
pub struct ButtonProperties {
    pub enabled: LazyField<bool>,
    pub hilite: LazyField<bool>,
    pub auto_hilite: LazyField<bool>,
    pub shared_hilite: LazyField<bool>,
    pub show_name: LazyField<bool>,
    /// Radio group, 0 for none
    pub family: LazyField<u8>,
    pub icon_identifier: LazyField<i32>,
    /// Pop-up buttons only
    pub title_width: LazyField<u16>,
    /// Pop-up buttons only
    pub selected_item: LazyField<i32>,
}

/// Properties of fields only.
pub struct FieldProperties {
    pub lock_text: LazyField<bool>,
    pub auto_tab: LazyField<bool>,
    pub fixed_line_height: LazyField<bool>,
    pub shared_text: LazyField<bool>,
    pub dont_search: LazyField<bool>,
    pub dont_wrap: LazyField<bool>,
    pub multiple_lines: LazyField<bool>,
    pub wide_margins: LazyField<bool>,
    pub show_lines: LazyField<bool>,
    pub auto_select: LazyField<bool>,
    pub selected_line: LazyField<i32>,
    pub last_selected_line: LazyField<i32>,
    pub text_align: LazyField<TextAlign>,
    pub text_font_identifier: LazyField<i32>,
    pub text_font_size: LazyField<u16>,
    pub text_style: LazyField<TextStyle>,
    pub text_height: LazyField<u16>,
}

pub enum PartProperties {
    Button(ButtonProperties),
    Field(FieldProperties),
}

/// A button or a field of a layer.
pub struct Part {
    pub identifier: i32,
    pub layer_kind: LayerKind,
    pub name: LazyField<String>,
    pub style: LazyField<PartStyle>,
    pub rectangle: LazyField<Rectangle>,
    pub visible: LazyField<bool>,
    pub script: LazyField<String>,
    /// Text stored in the layer of the part
    pub content: LazyField<PartContent>,
    pub properties: PartProperties,
}

impl Part {
    /// Build a part from its record. Identifier and kind are read now, the
    /// other fields on first access.
    pub fn load(block: PartBlock, layer_kind: LayerKind, contents: Rc<LazyField<Vec<ContentRecord>>>) -> Result<Self> {
        let identifier = block.identifier()?;
        let properties = match block.kind()? {
            PartKind::Button => PartProperties::Button(ButtonProperties {
                enabled: part_field!(block, enabled),
                hilite: part_field!(block, hilite),
                auto_hilite: part_field!(block, auto_hilite),
                shared_hilite: part_field!(block, shared_hilite),
                show_name: part_field!(block, show_name),
                family: part_field!(block, family),
                icon_identifier: part_field!(block, icon_identifier),
                title_width: part_field!(block, title_width),
                selected_item: part_field!(block, selected_line),
            }),
            PartKind::Field => PartProperties::Field(FieldProperties {
                lock_text: part_field!(block, lock_text),
                auto_tab: part_field!(block, auto_tab),
                fixed_line_height: part_field!(block, fixed_line_height),
                shared_text: part_field!(block, shared_text),
                dont_search: part_field!(block, dont_search),
                dont_wrap: part_field!(block, dont_wrap),
                multiple_lines: part_field!(block, multiple_lines),
                wide_margins: part_field!(block, wide_margins),
                show_lines: part_field!(block, show_lines),
                auto_select: part_field!(block, auto_select),
                selected_line: part_field!(block, selected_line),
                last_selected_line: part_field!(block, last_selected_line),
                text_align: part_field!(block, text_align),
                text_font_identifier: part_field!(block, text_font_identifier),
                text_font_size: part_field!(block, text_font_size),
                text_style: part_field!(block, text_style),
                text_height: part_field!(block, text_height),
            }),
        };

        let content = LazyField::new(move || {
            contents.with(|records| {
                records
                    .iter()
                    .find(|r| r.identifier == identifier && r.layer_kind == layer_kind)
                    .map(|r| r.content.clone())
                    .unwrap_or_default()
            })
        });

        Ok(Part {
            identifier,
            layer_kind,
            name: part_field!(block, name),
            style: part_field!(block, style),
            rectangle: part_field!(block, rectangle),
            visible: part_field!(block, visible),
            script: part_field!(block, script),
            content,
            properties,
        })
    }

    pub fn kind(&self) -> PartKind {
        match self.properties {
            PartProperties::Button(_) => PartKind::Button,
            PartProperties::Field(_) => PartKind::Field,
        }
    }

    pub fn as_button(&self) -> Option<&ButtonProperties> {
        match &self.properties {
            PartProperties::Button(button) => Some(button),
            PartProperties::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldProperties> {
        match &self.properties {
            PartProperties::Field(field) => Some(field),
            PartProperties::Button(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::binary::ByteRange;
    use crate::stack::blocks::part::tests::part_bytes;

    fn records() -> Rc<LazyField<Vec<ContentRecord>>> {
        Rc::new(LazyField::ready(vec![
            ContentRecord {
                identifier: 2,
                layer_kind: LayerKind::Background,
                content: PartContent::Plain("background text".to_string()),
            },
            ContentRecord {
                identifier: 2,
                layer_kind: LayerKind::Card,
                content: PartContent::Plain("card text".to_string()),
            },
        ]))
    }

    #[test]
    fn test_load_button() {
        let block = PartBlock::new(ByteRange::new(part_bytes(1, true, "Next", "on mouseUp\rgo next\rend mouseUp")));
        let part = Part::load(block, LayerKind::Card, records()).unwrap();
        assert_eq!(part.kind(), PartKind::Button);
        assert_eq!(part.name.get().unwrap(), "Next");
        assert!(part.as_button().is_some_and(|b| b.hilite.get() == Ok(true)));
        assert!(part.as_field().is_none());
        assert_eq!(part.content.get().unwrap(), PartContent::default());
    }

    #[test]
    fn test_field_content_by_layer() {
        let block = PartBlock::new(ByteRange::new(part_bytes(2, false, "Title", "")));
        let part = Part::load(block.clone(), LayerKind::Card, records()).unwrap();
        assert_eq!(part.content.get().unwrap().string(), "card text");
        let part = Part::load(block, LayerKind::Background, records()).unwrap();
        assert_eq!(part.content.get().unwrap().string(), "background text");
        assert!(part.as_field().is_some_and(|f| f.lock_text.get() == Ok(true)));
    }

    #[test]
    fn test_fields_are_lazy() {
        let block = PartBlock::new(ByteRange::new(part_bytes(3, false, "Lazy", "")));
        let part = Part::load(block, LayerKind::Card, records()).unwrap();
        assert!(!part.name.is_ready());
        part.name.get().unwrap();
        assert!(part.name.is_ready());
        part.name.set("Renamed".to_string()).unwrap();
        assert_eq!(part.name.get().unwrap(), "Renamed");
    }
}
