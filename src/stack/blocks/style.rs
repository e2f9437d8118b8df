//! The `STBL` block: table of the text styles used by formatted contents.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;

const STYLES_OFFSET: usize = 0x18;
const STYLE_RECORD_SIZE: usize = 0x18;

bitflags! {
    /// QuickDraw text style, one bit per face.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TextStyle: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        /// Borders drawn in black, interiors in white
        const OUTLINE = 1 << 3;
        const SHADOW = 1 << 4;
        const CONDENSE = 1 << 5;
        const EXTEND = 1 << 6;
        /// HyperCard-specific face marking hyperlinks
        const GROUP = 1 << 7;
    }
}

impl fmt::Display for TextStyle {
    /// Short form, one letter per face, `p` for plain.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("p");
        }
        const LETTERS: [(TextStyle, char); 8] = [
            (TextStyle::BOLD, 'b'),
            (TextStyle::ITALIC, 'i'),
            (TextStyle::UNDERLINE, 'u'),
            (TextStyle::OUTLINE, 'o'),
            (TextStyle::SHADOW, 's'),
            (TextStyle::CONDENSE, 'c'),
            (TextStyle::EXTEND, 'e'),
            (TextStyle::GROUP, 'g'),
        ];
        for (style, letter) in LETTERS {
            if self.contains(style) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Drawing attributes of a run of text.
///
/// Absent values fall back to the ones of the field holding the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFormatting {
    pub font_family_identifier: Option<i32>,
    pub size: Option<i32>,
    pub style: Option<TextStyle>,
}

/// Entry of the style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedStyle {
    /// Number referenced by the contents
    pub number: u32,
    /// Number of runs using the style in the stack
    pub run_count: u16,
    pub formatting: TextFormatting,
}

/// Reader of the style block.
#[derive(Debug, Clone)]
pub struct StyleBlock {
    data: ByteRange,
}

impl StyleBlock {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    pub fn identifier(&self) -> Result<i32> {
        self.data.read_i32(0x8)
    }

    pub fn style_count(&self) -> Result<u32> {
        self.data.read_u32(0x10)
    }

    /// Number to give to the next new style.
    pub fn next_available_style_number(&self) -> Result<u32> {
        self.data.read_u32(0x14)
    }

    pub fn styles(&self) -> Result<Vec<IndexedStyle>> {
        let count = self.style_count()? as usize;
        (0..count)
            .map(|i| self.read_style(STYLES_OFFSET + i * STYLE_RECORD_SIZE))
            .collect()
    }

    fn read_style(&self, offset: usize) -> Result<IndexedStyle> {
        let absent_if_minus_one = |value: i16| (value != -1).then_some(value);
        let font = absent_if_minus_one(self.data.read_i16(offset + 0xC)?);
        let flags = absent_if_minus_one(self.data.read_i16(offset + 0xE)?);
        let size = absent_if_minus_one(self.data.read_i16(offset + 0x10)?);
        Ok(IndexedStyle {
            number: self.data.read_u32(offset)?,
            run_count: self.data.read_u16(offset + 0x6)?,
            formatting: TextFormatting {
                font_family_identifier: font.map(i32::from),
                size: size.map(i32::from),
                // The faces are in the high byte
                style: flags.map(|v| TextStyle::from_bits_retain((v as u16 >> 8) as u8)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 0x18 + 2 * 0x18];
        data[0x10..0x14].copy_from_slice(&2u32.to_be_bytes()); // count
        data[0x14..0x18].copy_from_slice(&12u32.to_be_bytes()); // next number
        // Style 10: Geneva (3), bold italic, 12
        let first = 0x18;
        data[first..first + 4].copy_from_slice(&10u32.to_be_bytes());
        data[first + 6..first + 8].copy_from_slice(&5u16.to_be_bytes());
        data[first + 0xC..first + 0xE].copy_from_slice(&3i16.to_be_bytes());
        data[first + 0xE..first + 0x10].copy_from_slice(&0x0300i16.to_be_bytes());
        data[first + 0x10..first + 0x12].copy_from_slice(&12i16.to_be_bytes());
        // Style 11: everything inherited
        let second = 0x30;
        data[second..second + 4].copy_from_slice(&11u32.to_be_bytes());
        data[second + 0xC..second + 0x12].copy_from_slice(&[0xFF; 6]);
        data
    }

    #[test]
    fn test_styles() {
        let block = StyleBlock::new(ByteRange::new(style_bytes()));
        assert_eq!(block.next_available_style_number().unwrap(), 12);
        let styles = block.styles().unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].number, 10);
        assert_eq!(styles[0].run_count, 5);
        assert_eq!(
            styles[0].formatting,
            TextFormatting {
                font_family_identifier: Some(3),
                size: Some(12),
                style: Some(TextStyle::BOLD | TextStyle::ITALIC),
            }
        );
        assert_eq!(styles[1].formatting, TextFormatting::default());
    }

    #[test]
    fn test_style_display() {
        assert_eq!(TextStyle::empty().to_string(), "p");
        assert_eq!((TextStyle::BOLD | TextStyle::GROUP).to_string(), "bg");
    }
}
