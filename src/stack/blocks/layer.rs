//! Fields shared by card and background blocks.
//!
//! Both layer kinds hold a part list followed by a content list, a name and
//! a script. Only the offset of the part list differs, and the way contents
//! are stored in version 1.

use std::fmt;

use crate::common::binary::ByteRange;
use crate::common::error::Result;

use super::content::{ContentBlock, ContentBlockReader, ContentBlockV1};
use super::part::PartBlock;

/// Accessors of the layer fields common to cards and backgrounds.
///
/// The counters of the part and content lists sit right before the part
/// list, at the end of the header of the block.
pub trait LayerBlockReader: fmt::Debug {
    fn data(&self) -> &ByteRange;

    /// Offset of the part list, which is also the length of the header.
    fn part_offset(&self) -> usize;

    /// Offset of the word holding the layer flags.
    fn flags_offset(&self) -> usize;

    /// Identifier of the bitmap block of the picture, if any.
    fn bitmap_identifier(&self) -> Result<Option<i32>>;

    /// The content records, in card or background order.
    fn contents(&self) -> Result<Vec<Box<dyn ContentBlockReader>>>;

    fn identifier(&self) -> Result<i32> {
        self.data().read_i32(0x8)
    }

    fn cant_delete(&self) -> Result<bool> {
        self.data().read_flag16(self.flags_offset(), 14)
    }

    fn show_picture(&self) -> Result<bool> {
        self.data().read_flag16(self.flags_offset(), 13).map(|hidden| !hidden)
    }

    fn dont_search(&self) -> Result<bool> {
        self.data().read_flag16(self.flags_offset(), 11)
    }

    fn part_count(&self) -> Result<u16> {
        self.data().read_u16(self.part_offset() - 0xE)
    }

    /// Identifier to give to the next new part.
    fn next_available_identifier(&self) -> Result<u16> {
        self.data().read_u16(self.part_offset() - 0xC)
    }

    /// Size in bytes of the part list.
    fn part_size(&self) -> Result<u32> {
        self.data().read_u32(self.part_offset() - 0xA)
    }

    fn content_count(&self) -> Result<u16> {
        self.data().read_u16(self.part_offset() - 0x6)
    }

    /// Size in bytes of the content list.
    fn content_size(&self) -> Result<u32> {
        self.data().read_u32(self.part_offset() - 0x4)
    }

    /// The part records, each starting with its size.
    fn parts(&self) -> Result<Vec<PartBlock>> {
        let data = self.data();
        let count = usize::from(self.part_count()?);
        let mut parts = Vec::with_capacity(count);
        let mut offset = self.part_offset();
        for _ in 0..count {
            let size = usize::from(data.read_u16(offset)?);
            parts.push(PartBlock::new(data.slice(offset, size)?));
            // A zero size would loop on the same record
            offset += size.max(2);
        }
        Ok(parts)
    }

    fn contents_offset(&self) -> Result<usize> {
        Ok(self.part_offset() + self.part_size()? as usize)
    }

    fn name_offset(&self) -> Result<usize> {
        Ok(self.contents_offset()? + self.content_size()? as usize)
    }

    fn name(&self) -> Result<String> {
        self.data().read_c_string(self.name_offset()?)
    }

    /// Script, right after the name.
    fn script(&self) -> Result<String> {
        let data = self.data();
        let name_offset = self.name_offset()?;
        let script_offset = name_offset + data.c_string_length(name_offset)? + 1;
        if script_offset >= data.len() {
            return Ok(String::new());
        }
        data.read_c_string(script_offset)
    }
}

/// Layer fields of version 2 stacks.
#[derive(Debug, Clone)]
pub struct LayerBlock {
    data: ByteRange,
    part_offset: usize,
}

impl LayerBlock {
    pub fn new(data: ByteRange, part_offset: usize) -> Self {
        Self { data, part_offset }
    }
}

impl LayerBlockReader for LayerBlock {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn part_offset(&self) -> usize {
        self.part_offset
    }

    fn flags_offset(&self) -> usize {
        0x14
    }

    fn bitmap_identifier(&self) -> Result<Option<i32>> {
        let value = self.data.read_i32(0x10)?;
        Ok((value != 0).then_some(value))
    }

    /// Each record gives its size after the identifier; records are 16-bit
    /// aligned.
    fn contents(&self) -> Result<Vec<Box<dyn ContentBlockReader>>> {
        let count = usize::from(self.content_count()?);
        let mut contents: Vec<Box<dyn ContentBlockReader>> = Vec::with_capacity(count);
        let mut offset = self.contents_offset()?;
        for _ in 0..count {
            let size = usize::from(self.data.read_u16(offset + 2)?);
            contents.push(Box::new(ContentBlock::new(self.data.slice(offset, size + 4)?)));
            offset += size + 4;
            offset += offset & 1;
        }
        Ok(contents)
    }
}

/// Layer fields of version 1 stacks.
#[derive(Debug, Clone)]
pub struct LayerBlockV1 {
    data: ByteRange,
    part_offset: usize,
}

impl LayerBlockV1 {
    pub fn new(data: ByteRange, part_offset: usize) -> Self {
        Self { data, part_offset }
    }
}

impl LayerBlockReader for LayerBlockV1 {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn part_offset(&self) -> usize {
        self.part_offset
    }

    fn flags_offset(&self) -> usize {
        0x10
    }

    fn bitmap_identifier(&self) -> Result<Option<i32>> {
        let value = self.data.read_i32(0xC)?;
        Ok((value != 0).then_some(value))
    }

    /// Records are an identifier followed by a null-terminated string.
    fn contents(&self) -> Result<Vec<Box<dyn ContentBlockReader>>> {
        let count = usize::from(self.content_count()?);
        let mut contents: Vec<Box<dyn ContentBlockReader>> = Vec::with_capacity(count);
        let mut offset = self.contents_offset()?;
        for _ in 0..count {
            let length = 2 + self.data.c_string_length(offset + 2)? + 1;
            contents.push(Box::new(ContentBlockV1::new(self.data.slice(offset, length)?)));
            offset += length;
        }
        Ok(contents)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::stack::blocks::content::LayerKind;
    use crate::stack::blocks::part::PartKind;
    use crate::stack::blocks::part::tests::part_bytes;

    /// Append the part list, the counters before it, the contents, the name
    /// and the script to a layer header ending at `part_offset`.
    pub(crate) fn layer_bytes(
        header: Vec<u8>,
        parts: &[Vec<u8>],
        contents: &[Vec<u8>],
        name: &str,
        script: &str,
    ) -> Vec<u8> {
        let mut data = header;
        let part_offset = data.len();
        let part_size: usize = parts.iter().map(Vec::len).sum();
        let content_size: usize = contents.iter().map(|c| c.len() + (c.len() & 1)).sum();

        let counters = part_offset - 0xE;
        data[counters..counters + 2].copy_from_slice(&(parts.len() as u16).to_be_bytes());
        data[counters + 2..counters + 4].copy_from_slice(&100u16.to_be_bytes());
        data[counters + 4..counters + 8].copy_from_slice(&(part_size as u32).to_be_bytes());
        data[counters + 8..counters + 10].copy_from_slice(&(contents.len() as u16).to_be_bytes());
        data[counters + 10..counters + 14].copy_from_slice(&(content_size as u32).to_be_bytes());

        for part in parts {
            data.extend_from_slice(part);
        }
        for content in contents {
            data.extend_from_slice(content);
            if content.len() & 1 == 1 {
                data.push(0);
            }
        }
        data.extend_from_slice(name.as_bytes());
        data.push(0);
        data.extend_from_slice(script.as_bytes());
        data.push(0);
        let length = data.len() as u32;
        data[0..4].copy_from_slice(&length.to_be_bytes());
        data
    }

    /// A version 2 content record holding plain text.
    pub(crate) fn content_bytes(identifier: i16, text: &str) -> Vec<u8> {
        let mut data = identifier.to_be_bytes().to_vec();
        data.extend_from_slice(&((text.len() + 1) as u16).to_be_bytes());
        data.push(0);
        data.extend_from_slice(text.as_bytes());
        data
    }

    fn sample_layer() -> LayerBlock {
        let mut header = vec![0u8; 0x36];
        header[0x8..0xC].copy_from_slice(&0x2000i32.to_be_bytes());
        header[0x10..0x14].copy_from_slice(&0x77i32.to_be_bytes()); // bitmap
        header[0x14..0x16].copy_from_slice(&0x2800u16.to_be_bytes()); // !showPict, dontSearch
        let data = layer_bytes(
            header,
            &[part_bytes(1, true, "Go", ""), part_bytes(2, false, "Notes", "")],
            &[content_bytes(-2, "abc"), content_bytes(3, "shared")],
            "Home",
            "on openCard\rend openCard",
        );
        LayerBlock::new(ByteRange::new(data), 0x36)
    }

    #[test]
    fn test_header_fields() {
        let layer = sample_layer();
        assert_eq!(layer.identifier().unwrap(), 0x2000);
        assert_eq!(layer.bitmap_identifier().unwrap(), Some(0x77));
        assert!(!layer.show_picture().unwrap());
        assert!(layer.dont_search().unwrap());
        assert!(!layer.cant_delete().unwrap());
        assert_eq!(layer.part_count().unwrap(), 2);
        assert_eq!(layer.next_available_identifier().unwrap(), 100);
        assert_eq!(layer.content_count().unwrap(), 2);
    }

    #[test]
    fn test_parts_and_contents() {
        let layer = sample_layer();
        let parts = layer.parts().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].kind().unwrap(), PartKind::Button);
        assert_eq!(parts[1].name().unwrap(), "Notes");

        let contents = layer.contents().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].identifier().unwrap(), 2);
        assert_eq!(contents[0].layer_kind().unwrap(), LayerKind::Card);
        assert_eq!(contents[0].string().unwrap(), "abc");
        assert_eq!(contents[1].layer_kind().unwrap(), LayerKind::Background);
        assert_eq!(contents[1].string().unwrap(), "shared");
    }

    #[test]
    fn test_name_and_script() {
        let layer = sample_layer();
        assert_eq!(layer.name().unwrap(), "Home");
        assert_eq!(layer.script().unwrap(), "on openCard\rend openCard");
    }

    #[test]
    fn test_v1_contents() {
        let mut header = vec![0u8; 0x32];
        header[0xC..0x10].copy_from_slice(&0i32.to_be_bytes());
        let mut content = (-1i16).to_be_bytes().to_vec();
        content.extend_from_slice(b"old text\0");
        // V1 records are not padded
        let mut data = header;
        let part_offset = data.len();
        let counters = part_offset - 0xE;
        data[counters + 8..counters + 10].copy_from_slice(&1u16.to_be_bytes());
        data[counters + 10..counters + 14].copy_from_slice(&(content.len() as u32).to_be_bytes());
        data.extend_from_slice(&content);
        data.extend_from_slice(b"Old\0\0");

        let layer = LayerBlockV1::new(ByteRange::new(data), 0x32);
        assert_eq!(layer.bitmap_identifier().unwrap(), None);
        let contents = layer.contents().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].identifier().unwrap(), 1);
        assert_eq!(contents[0].string().unwrap(), "old text");
        assert_eq!(layer.name().unwrap(), "Old");
        assert_eq!(layer.script().unwrap(), "");
    }
}
