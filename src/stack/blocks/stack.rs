//! The `STAK` block: stack-wide header.
//!
//! The part of the header between 0x18 and 0x4A is encrypted in private
//! stacks. Readers are given the decoded bytes and read the affected fields
//! from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};
use crate::common::geometry::{Point, Rectangle, Size};
use crate::stack::consts::{
    DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH, ENCODED_HEADER_LENGTH, ENCODED_HEADER_OFFSET,
    FORMAT_OFFSET, HEADER_CHECKSUM_WORDS,
};

/// Number of 8×8 patterns of the paint palette
pub const PATTERN_COUNT: usize = 40;

const PATTERNS_OFFSET: usize = 0x2C0;
const FREE_LOCATIONS_OFFSET: usize = 0x400;
const SCRIPT_OFFSET: usize = 0x600;
const FLAGS_OFFSET: usize = 0x4C;

/// User level of the stack, from browsing to scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserLevel {
    Browse = 1,
    Type = 2,
    Paint = 3,
    Authoring = 4,
    Script = 5,
}

impl UserLevel {
    /// Decode the stored level, 0 also meaning scripting.
    pub fn from_raw(value: u16) -> Result<Self> {
        match value {
            1 => Ok(UserLevel::Browse),
            2 => Ok(UserLevel::Type),
            3 => Ok(UserLevel::Paint),
            4 => Ok(UserLevel::Authoring),
            0 | 5 => Ok(UserLevel::Script),
            other => Err(Error::CorruptedFile(format!("invalid user level {other}"))),
        }
    }
}

/// A HyperCard release number, stored as a Mac OS `NumVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub bug: u8,
    pub stage: ReleaseStage,
    pub release: u8,
}

/// Development stage of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseStage {
    Development,
    Alpha,
    Beta,
    Final,
}

impl Version {
    /// Decode a `NumVersion`, 0 meaning no version.
    pub fn from_code(code: u32) -> Option<Self> {
        if code == 0 {
            return None;
        }
        let [major, minor_bug, stage, release] = code.to_be_bytes();
        let stage = match stage {
            0x20 => ReleaseStage::Development,
            0x40 => ReleaseStage::Alpha,
            0x60 => ReleaseStage::Beta,
            _ => ReleaseStage::Final,
        };
        Some(Version {
            major: (major >> 4) * 10 + (major & 0xF),
            minor: minor_bug >> 4,
            bug: minor_bug & 0xF,
            stage,
            release,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.bug != 0 {
            write!(f, ".{}", self.bug)?;
        }
        match self.stage {
            ReleaseStage::Development => write!(f, "d{}", self.release),
            ReleaseStage::Alpha => write!(f, "a{}", self.release),
            ReleaseStage::Beta => write!(f, "b{}", self.release),
            ReleaseStage::Final => Ok(()),
        }
    }
}

/// A free area of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeLocation {
    pub offset: u32,
    pub size: u32,
}

/// An 8×8 one-bit paint pattern, one byte per row.
pub type Pattern = [u8; 8];

/// Accessors of the stack block.
///
/// Fields at the same place in both layouts have default implementations;
/// fields that moved or do not exist in version 1 are given by each layout.
pub trait StackBlockReader {
    /// The block bytes.
    fn data(&self) -> &ByteRange;

    /// The decrypted header, for private stacks.
    fn decoded_header(&self) -> Option<&ByteRange>;

    /// Checksum stored in the block.
    fn checksum(&self) -> Result<u32>;

    /// Rectangle of the card window.
    fn window_rectangle(&self) -> Result<Rectangle>;

    /// Screen rectangle the window rectangle refers to.
    fn screen_rectangle(&self) -> Result<Rectangle>;

    fn scroll_point(&self) -> Result<Point>;

    /// Size of the cards.
    fn size(&self) -> Result<Size>;

    /// Identifier of the `FTBL` block, if any.
    fn font_block_identifier(&self) -> Result<Option<i32>>;

    /// Identifier of the `STBL` block, if any.
    fn style_block_identifier(&self) -> Result<Option<i32>>;

    /// Read a u32 of the header, from the decoded bytes if encrypted.
    fn header_u32(&self, offset: usize) -> Result<u32> {
        match self.decoded_header() {
            Some(decoded) if is_encoded(offset, 4) => decoded.read_u32(offset - ENCODED_HEADER_OFFSET),
            _ => self.data().read_u32(offset),
        }
    }

    /// Read a u16 of the header, from the decoded bytes if encrypted.
    fn header_u16(&self, offset: usize) -> Result<u16> {
        match self.decoded_header() {
            Some(decoded) if is_encoded(offset, 2) => decoded.read_u16(offset - ENCODED_HEADER_OFFSET),
            _ => self.data().read_u16(offset),
        }
    }

    /// Stack format number, 1 to 8 for version 1 and 9 or 10 for version 2.
    fn format(&self) -> Result<u32> {
        self.data().read_u32(FORMAT_OFFSET)
    }

    /// Size of the data fork.
    fn total_size(&self) -> Result<u32> {
        self.data().read_u32(0x14)
    }

    fn stack_size(&self) -> Result<u32> {
        self.header_u32(0x18)
    }

    fn background_count(&self) -> Result<u32> {
        self.header_u32(0x24)
    }

    fn first_background_identifier(&self) -> Result<i32> {
        self.header_u32(0x28).map(|v| v as i32)
    }

    fn card_count(&self) -> Result<u32> {
        self.header_u32(0x2C)
    }

    fn first_card_identifier(&self) -> Result<i32> {
        self.header_u32(0x30).map(|v| v as i32)
    }

    /// Identifier of the `LIST` block.
    fn list_identifier(&self) -> Result<i32> {
        self.header_u32(0x34).map(|v| v as i32)
    }

    /// Number of free blocks.
    fn free_count(&self) -> Result<u32> {
        self.header_u32(0x38)
    }

    /// Total size of the free blocks.
    fn free_size(&self) -> Result<u32> {
        self.header_u32(0x3C)
    }

    fn print_block_identifier(&self) -> Result<i32> {
        self.header_u32(0x40).map(|v| v as i32)
    }

    /// Hash of the password, if the stack has one.
    fn password_hash(&self) -> Result<Option<u32>> {
        self.header_u32(0x44).map(|v| (v != 0).then_some(v))
    }

    fn user_level(&self) -> Result<UserLevel> {
        UserLevel::from_raw(self.header_u16(0x48)?)
    }

    fn cant_abort(&self) -> Result<bool> {
        self.data().read_flag16(FLAGS_OFFSET, 11)
    }

    fn cant_delete(&self) -> Result<bool> {
        self.data().read_flag16(FLAGS_OFFSET, 14)
    }

    fn cant_modify(&self) -> Result<bool> {
        self.data().read_flag16(FLAGS_OFFSET, 15)
    }

    fn cant_peek(&self) -> Result<bool> {
        self.data().read_flag16(FLAGS_OFFSET, 10)
    }

    /// Whether the header is encrypted and a password is asked on open.
    fn private_access(&self) -> Result<bool> {
        self.data().read_flag16(FLAGS_OFFSET, 13)
    }

    fn version_at_creation(&self) -> Result<Option<Version>> {
        self.data().read_u32(0x60).map(Version::from_code)
    }

    fn version_at_last_compacting(&self) -> Result<Option<Version>> {
        self.data().read_u32(0x64).map(Version::from_code)
    }

    fn version_at_last_modification_since_last_compacting(&self) -> Result<Option<Version>> {
        self.data().read_u32(0x68).map(Version::from_code)
    }

    fn version_at_last_modification(&self) -> Result<Option<Version>> {
        self.data().read_u32(0x6C).map(Version::from_code)
    }

    fn marked_card_count(&self) -> Result<u32> {
        self.data().read_u32(0x74)
    }

    /// The 40 patterns of the paint palette.
    fn patterns(&self) -> Result<Vec<Pattern>> {
        (0..PATTERN_COUNT)
            .map(|i| {
                let bytes = self.data().read_bytes(PATTERNS_OFFSET + i * 8, 8)?;
                let mut pattern = [0u8; 8];
                pattern.copy_from_slice(bytes);
                Ok(pattern)
            })
            .collect()
    }

    /// The free areas of the file.
    fn free_locations(&self) -> Result<Vec<FreeLocation>> {
        let count = self.free_count()? as usize;
        (0..count)
            .map(|i| {
                let offset = FREE_LOCATIONS_OFFSET + i * 8;
                Ok(FreeLocation {
                    offset: self.data().read_u32(offset)?,
                    size: self.data().read_u32(offset + 4)?,
                })
            })
            .collect()
    }

    /// Script of the stack.
    fn script(&self) -> Result<String> {
        if self.data().len() <= SCRIPT_OFFSET {
            return Ok(String::new());
        }
        self.data().read_c_string(SCRIPT_OFFSET)
    }

    /// Whether the first 0x180 words of the header sum to zero.
    ///
    /// The sum is made over the decrypted header.
    fn is_checksum_valid(&self) -> Result<bool> {
        let data = self.data();
        let mut sum = 0u32;
        for i in 0..HEADER_CHECKSUM_WORDS {
            sum = sum.wrapping_add(data.read_u32(i * 4)?);
        }
        if let Some(decoded) = self.decoded_header() {
            for i in 0..0xC {
                sum = sum.wrapping_add(decoded.read_u32(i * 4)?);
                sum = sum.wrapping_sub(data.read_u32(ENCODED_HEADER_OFFSET + i * 4)?);
            }
            // The last word is half encoded
            let last = (u32::from(decoded.read_u16(0x30)?) << 16) | u32::from(data.read_u16(0x4A)?);
            sum = sum.wrapping_add(last);
            sum = sum.wrapping_sub(data.read_u32(0x48)?);
        }
        Ok(sum == 0)
    }
}

#[inline]
fn is_encoded(offset: usize, width: usize) -> bool {
    offset >= ENCODED_HEADER_OFFSET && offset + width <= ENCODED_HEADER_OFFSET + ENCODED_HEADER_LENGTH
}

fn optional_identifier(value: u32) -> Option<i32> {
    (value != 0).then_some(value as i32)
}

/// Stack block of version 2 stacks.
#[derive(Debug, Clone)]
pub struct StackBlock {
    data: ByteRange,
    decoded_header: Option<ByteRange>,
}

impl StackBlock {
    pub fn new(data: ByteRange, decoded_header: Option<ByteRange>) -> Self {
        Self {
            data,
            decoded_header,
        }
    }
}

impl StackBlockReader for StackBlock {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn decoded_header(&self) -> Option<&ByteRange> {
        self.decoded_header.as_ref()
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0x70)
    }

    fn window_rectangle(&self) -> Result<Rectangle> {
        self.data.read_rectangle(0x78)
    }

    fn screen_rectangle(&self) -> Result<Rectangle> {
        self.data.read_rectangle(0x80)
    }

    fn scroll_point(&self) -> Result<Point> {
        let y = self.data.read_i16(0x88)?;
        let x = self.data.read_i16(0x8A)?;
        Ok(Point::new(i32::from(x), i32::from(y)))
    }

    fn size(&self) -> Result<Size> {
        let width = self.data.read_u16(0x1BA)?;
        let height = self.data.read_u16(0x1B8)?;
        Ok(Size::new(
            if width == 0 { DEFAULT_CARD_WIDTH } else { i32::from(width) },
            if height == 0 { DEFAULT_CARD_HEIGHT } else { i32::from(height) },
        ))
    }

    fn font_block_identifier(&self) -> Result<Option<i32>> {
        self.data.read_u32(0x1B0).map(optional_identifier)
    }

    fn style_block_identifier(&self) -> Result<Option<i32>> {
        self.data.read_u32(0x1B4).map(optional_identifier)
    }
}

/// Stack block of version 1 stacks: no window geometry, no text style
/// tables, and the checksum earlier in the header.
#[derive(Debug, Clone)]
pub struct StackBlockV1 {
    data: ByteRange,
    decoded_header: Option<ByteRange>,
}

impl StackBlockV1 {
    pub fn new(data: ByteRange, decoded_header: Option<ByteRange>) -> Self {
        Self {
            data,
            decoded_header,
        }
    }
}

impl StackBlockReader for StackBlockV1 {
    fn data(&self) -> &ByteRange {
        &self.data
    }

    fn decoded_header(&self) -> Option<&ByteRange> {
        self.decoded_header.as_ref()
    }

    fn checksum(&self) -> Result<u32> {
        self.data.read_u32(0xC)
    }

    fn window_rectangle(&self) -> Result<Rectangle> {
        Ok(Rectangle::default())
    }

    fn screen_rectangle(&self) -> Result<Rectangle> {
        Ok(Rectangle::default())
    }

    fn scroll_point(&self) -> Result<Point> {
        Ok(Point::default())
    }

    fn size(&self) -> Result<Size> {
        Ok(Size::new(DEFAULT_CARD_WIDTH, DEFAULT_CARD_HEIGHT))
    }

    fn font_block_identifier(&self) -> Result<Option<i32>> {
        Ok(None)
    }

    fn style_block_identifier(&self) -> Result<Option<i32>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 0x600-byte version 2 stack block with a few fields set.
    fn stack_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 0x600];
        data[0..4].copy_from_slice(&0x600u32.to_be_bytes()); // block length
        data[4..8].copy_from_slice(b"STAK");
        data[0x10..0x14].copy_from_slice(&10u32.to_be_bytes()); // format
        data[0x2C..0x30].copy_from_slice(&3u32.to_be_bytes()); // card count
        data[0x34..0x38].copy_from_slice(&0x1234u32.to_be_bytes()); // list id
        data[0x48..0x4A].copy_from_slice(&2u16.to_be_bytes()); // user level
        data[0x4C..0x4E].copy_from_slice(&0x4800u16.to_be_bytes()); // cantDelete, cantAbort
        data[0x60..0x64].copy_from_slice(&0x0241_8000u32.to_be_bytes()); // 2.4.1 final
        data[0x1B0..0x1B4].copy_from_slice(&7u32.to_be_bytes()); // FTBL id
        data[0x2C0] = 0xAA; // first row of first pattern
        data
    }

    fn fix_checksum(data: &mut [u8], checksum_offset: usize) {
        let range = ByteRange::new(data.to_vec());
        let sum = (0..HEADER_CHECKSUM_WORDS)
            .map(|i| range.read_u32(i * 4).unwrap())
            .fold(0u32, u32::wrapping_add);
        data[checksum_offset..checksum_offset + 4].copy_from_slice(&0u32.wrapping_sub(sum).to_be_bytes());
    }

    #[test]
    fn test_read_fields() {
        let block = StackBlock::new(ByteRange::new(stack_bytes()), None);
        assert_eq!(block.format().unwrap(), 10);
        assert_eq!(block.card_count().unwrap(), 3);
        assert_eq!(block.list_identifier().unwrap(), 0x1234);
        assert_eq!(block.user_level().unwrap(), UserLevel::Type);
        assert!(block.cant_delete().unwrap());
        assert!(block.cant_abort().unwrap());
        assert!(!block.private_access().unwrap());
        assert_eq!(block.password_hash().unwrap(), None);
        assert_eq!(block.font_block_identifier().unwrap(), Some(7));
        assert_eq!(block.style_block_identifier().unwrap(), None);
        assert_eq!(block.size().unwrap(), Size::new(512, 342));
        assert_eq!(block.patterns().unwrap()[0], [0xAA, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(block.script().unwrap(), "");
    }

    #[test]
    fn test_versions() {
        let block = StackBlock::new(ByteRange::new(stack_bytes()), None);
        let version = block.version_at_creation().unwrap().unwrap();
        assert_eq!(version.to_string(), "2.4.1");
        assert_eq!(block.version_at_last_compacting().unwrap(), None);
        assert_eq!(
            Version::from_code(0x0110_6003).map(|v| v.to_string()),
            Some("1.1b3".to_string())
        );
    }

    #[test]
    fn test_v1_layout() {
        let block = StackBlockV1::new(ByteRange::new(stack_bytes()), None);
        assert_eq!(block.font_block_identifier().unwrap(), None);
        assert_eq!(block.window_rectangle().unwrap(), Rectangle::default());
        assert_eq!(block.card_count().unwrap(), 3);
    }

    #[test]
    fn test_checksum() {
        let mut data = stack_bytes();
        fix_checksum(&mut data, 0x70);
        let block = StackBlock::new(ByteRange::new(data.clone()), None);
        assert!(block.is_checksum_valid().unwrap());

        data[0x2D] ^= 1;
        let block = StackBlock::new(ByteRange::new(data), None);
        assert!(!block.is_checksum_valid().unwrap());
    }

    #[test]
    fn test_decoded_header_fields() {
        let mut decoded = vec![0u8; 0x32];
        decoded[0x14..0x18].copy_from_slice(&9u32.to_be_bytes()); // card count at 0x2C
        decoded[0x30..0x32].copy_from_slice(&4u16.to_be_bytes()); // user level at 0x48
        let block = StackBlock::new(ByteRange::new(stack_bytes()), Some(ByteRange::new(decoded)));
        assert_eq!(block.card_count().unwrap(), 9);
        assert_eq!(block.user_level().unwrap(), UserLevel::Authoring);
        // Outside the encrypted range, the plain bytes are used
        assert_eq!(block.format().unwrap(), 10);
    }

    #[test]
    fn test_script() {
        let mut data = stack_bytes();
        data.extend_from_slice(b"on openStack\rend openStack\0");
        let block = StackBlock::new(ByteRange::new(data), None);
        assert_eq!(block.script().unwrap(), "on openStack\rend openStack");
    }
}
