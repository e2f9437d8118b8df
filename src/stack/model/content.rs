//! Text of the parts, with its formatting resolved against the style table.

use serde::{Deserialize, Serialize};

use crate::common::error::Result;
use crate::stack::blocks::{ContentBlockReader, IndexedStyle, LayerKind, TextFormatting};

/// A formatting that applies from a byte offset of the text onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingAssociation {
    pub offset: usize,
    pub formatting: TextFormatting,
}

/// A string with its formatting runs, sorted by offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub string: String,
    pub attributes: Vec<FormattingAssociation>,
}

/// Text of a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartContent {
    Plain(String),
    Formatted(Text),
}

impl PartContent {
    /// The raw string, formatting dropped.
    pub fn string(&self) -> &str {
        match self {
            PartContent::Plain(string) => string,
            PartContent::Formatted(text) => &text.string,
        }
    }
}

impl Default for PartContent {
    fn default() -> Self {
        PartContent::Plain(String::new())
    }
}

/// A decoded content record of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Identifier of the part
    pub identifier: i32,
    /// Layer of the part, a card may hold contents of background fields
    pub layer_kind: LayerKind,
    pub content: PartContent,
}

impl ContentRecord {
    /// Decode a content record, turning its style numbers into formattings.
    ///
    /// Style numbers missing from the table fall back to the field's own
    /// formatting.
    pub fn decode(block: &dyn ContentBlockReader, styles: &[IndexedStyle]) -> Result<Self> {
        let string = block.string()?;
        let content = match block.formatting_changes()? {
            None => PartContent::Plain(string),
            Some(changes) => {
                let attributes = changes
                    .iter()
                    .map(|change| {
                        let formatting = styles
                            .iter()
                            .find(|style| style.number == u32::from(change.style_identifier))
                            .map(|style| style.formatting)
                            .unwrap_or_else(|| {
                                log::warn!("Unknown text style {}", change.style_identifier);
                                TextFormatting::default()
                            });
                        FormattingAssociation {
                            offset: usize::from(change.offset),
                            formatting,
                        }
                    })
                    .collect();
                PartContent::Formatted(Text { string, attributes })
            },
        };
        Ok(ContentRecord {
            identifier: block.identifier()?,
            layer_kind: block.layer_kind()?,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::binary::ByteRange;
    use crate::stack::blocks::{ContentBlock, TextStyle};

    #[test]
    fn test_decode_formatted() {
        let mut data = 5i16.to_be_bytes().to_vec();
        data.extend_from_slice(&12u16.to_be_bytes()); // size
        data.extend_from_slice(&0x8006u16.to_be_bytes()); // one change
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&10u16.to_be_bytes());
        data.extend_from_slice(b"styled");

        let styles = [IndexedStyle {
            number: 10,
            run_count: 1,
            formatting: TextFormatting {
                font_family_identifier: None,
                size: Some(18),
                style: Some(TextStyle::UNDERLINE),
            },
        }];
        let record = ContentRecord::decode(&ContentBlock::new(ByteRange::new(data)), &styles).unwrap();
        assert_eq!(record.identifier, 5);
        assert_eq!(record.layer_kind, LayerKind::Background);
        assert_eq!(record.content.string(), "styled");
        match record.content {
            PartContent::Formatted(text) => {
                assert_eq!(text.attributes.len(), 1);
                assert_eq!(text.attributes[0].formatting.size, Some(18));
            },
            PartContent::Plain(_) => panic!("expected formatted text"),
        }
    }

    #[test]
    fn test_unknown_style_falls_back() {
        let mut data = (-1i16).to_be_bytes().to_vec();
        data.extend_from_slice(&7u16.to_be_bytes());
        data.extend_from_slice(&0x8006u16.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&99u16.to_be_bytes());
        data.push(b'x');
        let record = ContentRecord::decode(&ContentBlock::new(ByteRange::new(data)), &[]).unwrap();
        assert_eq!(
            record.content,
            PartContent::Formatted(Text {
                string: "x".to_string(),
                attributes: vec![FormattingAssociation {
                    offset: 0,
                    formatting: TextFormatting::default()
                }],
            })
        );
    }
}
