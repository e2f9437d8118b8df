//! The `FTBL` block: names of the fonts used in the stack.
//!
//! Font identifiers stored in parts and styles are only meaningful on the
//! machine that wrote the stack; the table gives their names so they can be
//! matched against the fonts of the resource forks.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;

const FONTS_OFFSET: usize = 0x18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontReference {
    pub identifier: u16,
    pub name: String,
}

/// Reader of the font table block.
#[derive(Debug, Clone)]
pub struct FontBlock {
    data: ByteRange,
}

impl FontBlock {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    pub fn identifier(&self) -> Result<i32> {
        self.data.read_i32(0x8)
    }

    pub fn font_count(&self) -> Result<u32> {
        self.data.read_u32(0x10)
    }

    /// The font entries: identifier then null-terminated name, 16-bit aligned.
    pub fn font_references(&self) -> Result<Vec<FontReference>> {
        let count = self.font_count()? as usize;
        let mut fonts = Vec::with_capacity(count);
        let mut offset = FONTS_OFFSET;
        for _ in 0..count {
            let identifier = self.data.read_u16(offset)?;
            let length = self.data.c_string_length(offset + 2)?;
            let name = self.data.read_c_string(offset + 2)?;
            fonts.push(FontReference { identifier, name });
            offset += 2 + length + 1;
            offset += offset & 1;
        }
        Ok(fonts)
    }

    /// Name of the font with the given identifier.
    pub fn font_name(&self, identifier: u16) -> Result<Option<String>> {
        Ok(self
            .font_references()?
            .into_iter()
            .find(|f| f.identifier == identifier)
            .map(|f| f.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_references() {
        let mut data = vec![0u8; 0x18];
        data[0x10..0x14].copy_from_slice(&2u32.to_be_bytes());
        // "Chicago": 2 + 8 bytes, already even
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(b"Chicago\0");
        // "Geneva": 2 + 7 bytes, padded to 10
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(b"Geneva\0\0");

        let block = FontBlock::new(ByteRange::new(data));
        let fonts = block.font_references().unwrap();
        assert_eq!(
            fonts,
            vec![
                FontReference {
                    identifier: 0,
                    name: "Chicago".to_string()
                },
                FontReference {
                    identifier: 3,
                    name: "Geneva".to_string()
                },
            ]
        );
        assert_eq!(block.font_name(3).unwrap().as_deref(), Some("Geneva"));
        assert_eq!(block.font_name(4).unwrap(), None);
    }

    #[test]
    fn test_truncated_table() {
        let mut data = vec![0u8; 0x18];
        data[0x10..0x14].copy_from_slice(&1u32.to_be_bytes());
        let block = FontBlock::new(ByteRange::new(data));
        assert!(block.font_references().is_err());
    }
}
