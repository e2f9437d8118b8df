//! Part contents stored in layer blocks.
//!
//! A content record belongs either to a part of the layer holding it, or,
//! when stored in a card, possibly to a field of the card's background. The
//! sign of the stored identifier tells which.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};

/// Marker of a formatted content in the length word at offset 4
const FORMATTED_MARKER: u16 = 0x8000;

/// The two kinds of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Card,
    Background,
}

/// A style change in a formatted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingChange {
    /// Byte offset of the change in the string
    pub offset: u16,
    /// Number of the style in the style table
    pub style_identifier: u16,
}

/// Accessors of a content record.
pub trait ContentBlockReader {
    fn data(&self) -> &ByteRange;

    /// The text, decoded from Mac OS Roman.
    fn string(&self) -> Result<String>;

    /// The style changes, `None` for plain text.
    fn formatting_changes(&self) -> Result<Option<Vec<FormattingChange>>>;

    /// Identifier of the part owning the content.
    fn identifier(&self) -> Result<i32> {
        self.data().read_i16(0).map(|v| i32::from(v).abs())
    }

    /// Negative identifiers are card parts, positive ones background parts.
    fn layer_kind(&self) -> Result<LayerKind> {
        let stored = self.data().read_i16(0)?;
        Ok(if stored < 0 {
            LayerKind::Card
        } else {
            LayerKind::Background
        })
    }
}

/// Content record of version 2 stacks, plain or formatted.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    data: ByteRange,
}

impl ContentBlock {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    fn is_plain(&self) -> Result<bool> {
        Ok(self.data.read_u8(4)? == 0)
    }

    /// Size of the formatting table, its length word included.
    fn formatting_length(&self) -> Result<usize> {
        Ok(usize::from(self.data.read_u16(4)? ^ FORMATTED_MARKER))
    }

    fn string_offset(&self) -> Result<usize> {
        if self.is_plain()? {
            Ok(5)
        } else {
            Ok(4 + self.formatting_length()?)
        }
    }
}

impl ContentBlockReader for ContentBlock {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn string(&self) -> Result<String> {
        let offset = self.string_offset()?;
        let length = self.data.len().checked_sub(offset).ok_or(Error::OutOfRange {
            offset,
            width: 0,
            length: self.data.len(),
        })?;
        let text = self.data.read_string(offset, Some(length))?;
        Ok(text.trim_end_matches('\0').to_string())
    }

    fn formatting_changes(&self) -> Result<Option<Vec<FormattingChange>>> {
        if self.is_plain()? {
            return Ok(None);
        }
        let formatting_length = self.formatting_length()?;
        let count = formatting_length.saturating_sub(2) / 4;
        let string_length = self.data.len().saturating_sub(self.string_offset()?);

        let mut changes: Vec<FormattingChange> = Vec::with_capacity(count);
        for i in 0..count {
            let offset = 6 + i * 4;
            let change = FormattingChange {
                offset: self.data.read_u16(offset)?,
                style_identifier: self.data.read_u16(offset + 2)?,
            };
            if usize::from(change.offset) > string_length {
                return Err(Error::CorruptedFile(format!(
                    "style change at {} past the end of a {string_length}-byte text",
                    change.offset
                )));
            }
            if changes.last().is_some_and(|last| last.offset >= change.offset) {
                return Err(Error::CorruptedFile(format!(
                    "style changes out of order at {}",
                    change.offset
                )));
            }
            changes.push(change);
        }
        Ok(Some(changes))
    }
}

/// Content record of version 1 stacks: identifier then a null-terminated
/// string, never formatted.
#[derive(Debug, Clone)]
pub struct ContentBlockV1 {
    data: ByteRange,
}

impl ContentBlockV1 {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }
}

impl ContentBlockReader for ContentBlockV1 {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn string(&self) -> Result<String> {
        let length = self.data.len().saturating_sub(3);
        self.data.read_string(2, Some(length))
    }

    fn formatting_changes(&self) -> Result<Option<Vec<FormattingChange>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_content(identifier: i16, text: &[u8]) -> Vec<u8> {
        let mut data = identifier.to_be_bytes().to_vec();
        data.extend_from_slice(&((text.len() + 1) as u16).to_be_bytes());
        data.push(0); // plain marker
        data.extend_from_slice(text);
        data
    }

    fn formatted_content(identifier: i16, changes: &[(u16, u16)], text: &[u8]) -> Vec<u8> {
        let formatting_length = 2 + changes.len() * 4;
        let mut data = identifier.to_be_bytes().to_vec();
        data.extend_from_slice(&((formatting_length + text.len()) as u16).to_be_bytes());
        data.extend_from_slice(&(formatting_length as u16 | FORMATTED_MARKER).to_be_bytes());
        for (offset, style) in changes {
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&style.to_be_bytes());
        }
        data.extend_from_slice(text);
        data
    }

    #[test]
    fn test_plain_content() {
        let block = ContentBlock::new(ByteRange::new(plain_content(-4, b"Hello\0")));
        assert_eq!(block.identifier().unwrap(), 4);
        assert_eq!(block.layer_kind().unwrap(), LayerKind::Card);
        assert_eq!(block.string().unwrap(), "Hello");
        assert_eq!(block.formatting_changes().unwrap(), None);
        // Reading twice gives the same text
        assert_eq!(block.string().unwrap(), block.string().unwrap());
    }

    #[test]
    fn test_formatted_content() {
        let data = formatted_content(7, &[(0, 10), (3, 11)], b"Bold text");
        let block = ContentBlock::new(ByteRange::new(data));
        assert_eq!(block.layer_kind().unwrap(), LayerKind::Background);
        assert_eq!(block.string().unwrap(), "Bold text");
        assert_eq!(
            block.formatting_changes().unwrap(),
            Some(vec![
                FormattingChange {
                    offset: 0,
                    style_identifier: 10
                },
                FormattingChange {
                    offset: 3,
                    style_identifier: 11
                },
            ])
        );
    }

    #[test]
    fn test_empty_formatting_agrees_with_plain() {
        let plain = ContentBlock::new(ByteRange::new(plain_content(1, b"same tail")));
        let formatted = ContentBlock::new(ByteRange::new(formatted_content(1, &[], b"same tail")));
        assert_eq!(plain.string().unwrap(), formatted.string().unwrap());
        assert_eq!(formatted.formatting_changes().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_bad_formatting_changes() {
        let data = formatted_content(1, &[(3, 10), (2, 11)], b"abcdef");
        let block = ContentBlock::new(ByteRange::new(data));
        assert!(matches!(block.formatting_changes(), Err(Error::CorruptedFile(_))));

        let data = formatted_content(1, &[(30, 10)], b"abcdef");
        let block = ContentBlock::new(ByteRange::new(data));
        assert!(matches!(block.formatting_changes(), Err(Error::CorruptedFile(_))));
        // The text stays readable
        assert_eq!(block.string().unwrap(), "abcdef");
    }

    #[test]
    fn test_v1_content() {
        let mut data = (-2i16).to_be_bytes().to_vec();
        data.extend_from_slice(b"Caf\x8E\0");
        let block = ContentBlockV1::new(ByteRange::new(data));
        assert_eq!(block.identifier().unwrap(), 2);
        assert_eq!(block.layer_kind().unwrap(), LayerKind::Card);
        assert_eq!(block.string().unwrap(), "Café");
        assert_eq!(block.formatting_changes().unwrap(), None);
    }
}
