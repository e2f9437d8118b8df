//! An opened data fork: version, decrypted header and block directory.
//!
//! [`ParsedFile`] is the context handed to every block reader. It is built
//! once per file and locates blocks through the master directory.

use bytes::Bytes;

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};

use super::blocks::{
    BackgroundBlock, BackgroundBlockReader, BackgroundBlockV1, CardBlock, CardBlockReader, CardBlockV1,
    CardReference, FontBlock, ListBlock, ListBlockReader, ListBlockV1, PageBlock, PageBlockReader, PageBlockV1,
    PageLayout, StackBlock, StackBlockReader, StackBlockV1, StyleBlock,
};
use super::consts::{BlockKind, FORMAT_OFFSET, STACK_KIND};
use super::decrypt;
use super::master::{MasterBlockReader, MasterRecord};
use super::options::OpenOptions;
use super::version::FileVersion;

/// Mask of the master block length, the high bits may hold flags
const MASTER_LENGTH_MASK: u32 = 0x0FFF_FFFF;

/// Bit of the stack flags telling the header is encrypted
const PRIVATE_ACCESS_FLAG_OFFSET: usize = 0x4C;
const PRIVATE_ACCESS_BIT: u8 = 13;

/// The common header of every block.
#[derive(Debug, Clone, Copy)]
struct BlockHeader {
    length: usize,
    tag: [u8; 4],
    identifier: i32,
}

/// The data fork of a stack file, ready to be read block by block.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    data: ByteRange,
    version: FileVersion,
    decoded_header: Option<ByteRange>,
    master_records: Vec<MasterRecord>,
    verify_checksums: bool,
}

impl ParsedFile {
    /// Check the file is a stack, decrypt its header if needed, verify the
    /// header checksum and read the block directory.
    pub fn open(data: impl Into<Bytes>, options: &OpenOptions) -> Result<Self> {
        let data = ByteRange::new(data);
        if data.read_bytes(4, 4).ok() != Some(STACK_KIND.as_slice()) {
            return Err(Error::NotAStack);
        }
        let version = FileVersion::from_format(data.read_u32(FORMAT_OFFSET)?)?;
        log::debug!("Opening a {version:?} stack of {} bytes", data.len());

        let stack_length = data.read_u32(0)? as usize;
        let stack = data
            .slice(0, stack_length)
            .map_err(|_| Error::CorruptedFile(format!("stack block of {stack_length} bytes past the end")))?;

        let decoded_header = Self::decode_header(&stack, options)?;
        let file = ParsedFile {
            master_records: Self::read_master_records(&data, stack_length)?,
            data,
            version,
            decoded_header,
            verify_checksums: options.verify_checksums,
        };

        if options.verify_checksums && !file.stack_block()?.is_checksum_valid()? {
            return Err(Error::CorruptedFile("bad stack header checksum".to_string()));
        }
        Ok(file)
    }

    /// Decrypt the header of a private stack.
    ///
    /// A given password is always checked; without one, the key is searched
    /// when the hack is enabled.
    fn decode_header(stack: &ByteRange, options: &OpenOptions) -> Result<Option<ByteRange>> {
        if !stack.read_flag16(PRIVATE_ACCESS_FLAG_OFFSET, PRIVATE_ACCESS_BIT)? {
            return Ok(None);
        }
        let decoded = match (&options.password, options.hack_encryption) {
            (Some(password), _) => decrypt::decrypt_with_password(stack, password)?,
            (None, true) => decrypt::hack_header(stack)?.ok_or(Error::MissingPassword)?,
            (None, false) => return Err(Error::MissingPassword),
        };
        Ok(Some(ByteRange::new(decoded)))
    }

    fn read_master_records(data: &ByteRange, stack_length: usize) -> Result<Vec<MasterRecord>> {
        let master_length = (data.read_u32(stack_length)? & MASTER_LENGTH_MASK) as usize;
        let master = data
            .slice(stack_length, master_length)
            .map_err(|_| Error::CorruptedFile("master block past the end".to_string()))?;
        let records = MasterBlockReader::new(master).read_records()?;
        log::debug!("Master block lists {} blocks", records.len());
        Ok(records)
    }

    #[inline]
    pub fn version(&self) -> FileVersion {
        self.version
    }

    /// The whole data fork.
    #[inline]
    pub fn data(&self) -> &ByteRange {
        &self.data
    }

    #[inline]
    pub fn master_records(&self) -> &[MasterRecord] {
        &self.master_records
    }

    #[inline]
    pub fn verifies_checksums(&self) -> bool {
        self.verify_checksums
    }

    /// Length, tag and identifier of the block a directory record points to.
    ///
    /// Records pointing outside the file, or too close to its end for a block
    /// header, are skipped with a warning.
    fn record_header(&self, record: &MasterRecord) -> Option<BlockHeader> {
        if record.offset == 0 {
            return None;
        }
        match self.read_block_header(record.offset) {
            Ok(header) => Some(header),
            Err(error) => {
                log::warn!("Skipping directory record at {:#x}: {error}", record.offset);
                None
            },
        }
    }

    fn read_block_header(&self, offset: usize) -> Result<BlockHeader> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.data.read_bytes(offset + 4, 4)?);
        Ok(BlockHeader {
            length: self.data.read_u32(offset)? as usize,
            tag,
            identifier: self.data.read_i32(offset + 8)?,
        })
    }

    /// The bytes of the block of a kind with an identifier.
    pub fn find_block(&self, kind: BlockKind, identifier: i32) -> Result<ByteRange> {
        let last_byte = (identifier & 0xFF) as u8;
        for record in &self.master_records {
            if record.identifier_last_byte != last_byte {
                continue;
            }
            let Some(header) = self.record_header(record) else {
                continue;
            };
            if header.tag == *kind.tag() && header.identifier == identifier {
                return self.data.slice(record.offset, header.length);
            }
        }
        Err(Error::MissingBlock {
            kind: kind.to_string(),
            identifier,
        })
    }

    /// The bytes of every block of a kind, in directory order.
    ///
    /// A block running past the end of the file is left out with a warning.
    pub fn blocks_of_kind(&self, kind: BlockKind) -> Result<Vec<ByteRange>> {
        let mut blocks = Vec::new();
        for record in &self.master_records {
            let Some(header) = self.record_header(record) else {
                continue;
            };
            if header.tag != *kind.tag() {
                continue;
            }
            match self.data.slice(record.offset, header.length) {
                Ok(block) => blocks.push(block),
                Err(error) => log::warn!("Skipping {kind} block {}: {error}", header.identifier),
            }
        }
        Ok(blocks)
    }

    /// Kind and identifier of every block of the directory.
    ///
    /// Blocks of unknown kinds are skipped with a warning.
    pub fn block_inventory(&self) -> Result<Vec<(BlockKind, i32)>> {
        let mut inventory = Vec::with_capacity(self.master_records.len());
        for record in &self.master_records {
            let Some(header) = self.record_header(record) else {
                continue;
            };
            match BlockKind::from_tag(header.tag) {
                Ok(kind) => inventory.push((kind, header.identifier)),
                Err(error) => log::warn!("Skipping block at {:#x}: {error}", record.offset),
            }
        }
        Ok(inventory)
    }

    pub fn stack_block(&self) -> Result<Box<dyn StackBlockReader>> {
        let length = self.data.read_u32(0)? as usize;
        let data = self.data.slice(0, length)?;
        let decoded = self.decoded_header.clone();
        Ok(match self.version {
            FileVersion::V2 => Box::new(StackBlock::new(data, decoded)),
            FileVersion::V1 => Box::new(StackBlockV1::new(data, decoded)),
        })
    }

    pub fn list_block(&self) -> Result<Box<dyn ListBlockReader>> {
        let identifier = self.stack_block()?.list_identifier()?;
        let data = self.find_block(BlockKind::List, identifier)?;
        Ok(match self.version {
            FileVersion::V2 => Box::new(ListBlock::new(data)),
            FileVersion::V1 => Box::new(ListBlockV1::new(data)),
        })
    }

    /// The pages of the card directory, in card order.
    pub fn page_blocks(&self) -> Result<Vec<Box<dyn PageBlockReader>>> {
        let list = self.list_block()?;
        if self.verify_checksums {
            warn_on_integrity(list.verify_checksum())?;
        }
        let card_reference_size = usize::from(list.card_reference_size()?);
        let hash_value_count = usize::from(list.hash_value_count()?);

        let mut pages = Vec::new();
        for reference in list.page_references()? {
            let layout = PageLayout {
                card_count: usize::from(reference.card_count),
                card_reference_size,
                hash_value_count,
            };
            let data = self.find_block(BlockKind::Page, reference.identifier)?;
            let page: Box<dyn PageBlockReader> = match self.version {
                FileVersion::V2 => Box::new(PageBlock::new(data, layout)),
                FileVersion::V1 => Box::new(PageBlockV1::new(data, layout)),
            };
            if self.verify_checksums {
                warn_on_integrity(page.verify_checksum())?;
            }
            pages.push(page);
        }
        Ok(pages)
    }

    /// References of every card of the stack, in card order.
    pub fn card_references(&self) -> Result<Vec<CardReference>> {
        let mut references = Vec::new();
        for page in self.page_blocks()? {
            references.extend(page.card_references()?);
        }
        Ok(references)
    }

    pub fn card_block(&self, identifier: i32) -> Result<Box<dyn CardBlockReader>> {
        let data = self.find_block(BlockKind::Card, identifier)?;
        Ok(match self.version {
            FileVersion::V2 => Box::new(CardBlock::new(data)),
            FileVersion::V1 => Box::new(CardBlockV1::new(data)),
        })
    }

    pub fn background_block(&self, identifier: i32) -> Result<Box<dyn BackgroundBlockReader>> {
        let data = self.find_block(BlockKind::Background, identifier)?;
        Ok(match self.version {
            FileVersion::V2 => Box::new(BackgroundBlock::new(data)),
            FileVersion::V1 => Box::new(BackgroundBlockV1::new(data)),
        })
    }

    /// Identifiers of the backgrounds, following the `next` links from the
    /// first background until it comes back.
    pub fn background_identifiers(&self) -> Result<Vec<i32>> {
        let stack = self.stack_block()?;
        let first = stack.first_background_identifier()?;
        let count = stack.background_count()? as usize;

        let mut identifiers = vec![first];
        let mut current = self.background_block(first)?.next_background_identifier()?;
        while current != first {
            // A broken link must not loop forever
            if identifiers.len() > count || identifiers.contains(&current) {
                return Err(Error::CorruptedFile(format!(
                    "background list does not loop back to {first}"
                )));
            }
            identifiers.push(current);
            current = self.background_block(current)?.next_background_identifier()?;
        }
        Ok(identifiers)
    }

    /// The style table, absent in version 1 stacks.
    pub fn style_block(&self) -> Result<Option<StyleBlock>> {
        match self.stack_block()?.style_block_identifier()? {
            Some(identifier) => Ok(Some(StyleBlock::new(self.find_block(BlockKind::Style, identifier)?))),
            None => Ok(None),
        }
    }

    /// The font table, absent in version 1 stacks.
    pub fn font_block(&self) -> Result<Option<FontBlock>> {
        match self.stack_block()?.font_block_identifier()? {
            Some(identifier) => Ok(Some(FontBlock::new(self.find_block(BlockKind::Font, identifier)?))),
            None => Ok(None),
        }
    }
}

/// Log an integrity warning and go on, other errors are returned.
fn warn_on_integrity(result: Result<()>) -> Result<()> {
    match result {
        Err(error) if error.is_warning() => {
            log::warn!("{error}");
            Ok(())
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest stack: a header, a master block and nothing else.
    fn minimal_stack(format: u32) -> Vec<u8> {
        let mut data = vec![0u8; 0x600];
        data[0..4].copy_from_slice(&0x600u32.to_be_bytes());
        data[4..8].copy_from_slice(b"STAK");
        data[0x10..0x14].copy_from_slice(&format.to_be_bytes());
        let sum = (0..0x180)
            .map(|i| u32::from_be_bytes(data[i * 4..i * 4 + 4].try_into().unwrap()))
            .fold(0u32, u32::wrapping_add);
        data[0x70..0x74].copy_from_slice(&0u32.wrapping_sub(sum).to_be_bytes());

        let mut master = vec![0u8; 0x40];
        master[0..4].copy_from_slice(&0x40u32.to_be_bytes());
        master[4..8].copy_from_slice(b"MAST");
        data.extend_from_slice(&master);
        data
    }

    #[test]
    fn test_open_minimal() {
        let file = ParsedFile::open(minimal_stack(10), &OpenOptions::default());
        assert!(file.is_ok_and(|f| f.version() == FileVersion::V2 && f.master_records().is_empty()));
    }

    #[test]
    fn test_not_a_stack() {
        let mut data = minimal_stack(10);
        data[4..8].copy_from_slice(b"JUNK");
        assert!(matches!(ParsedFile::open(data, &OpenOptions::default()), Err(Error::NotAStack)));
        assert!(matches!(ParsedFile::open(vec![0u8; 3], &OpenOptions::default()), Err(Error::NotAStack)));
    }

    #[test]
    fn test_unsupported_version() {
        let data = minimal_stack(42);
        assert!(matches!(
            ParsedFile::open(data, &OpenOptions::default()),
            Err(Error::UnsupportedVersion(42))
        ));
    }

    #[test]
    fn test_bad_header_checksum() {
        let mut data = minimal_stack(10);
        data[0x2C] = 1;
        assert!(matches!(
            ParsedFile::open(data.clone(), &OpenOptions::default()),
            Err(Error::CorruptedFile(_))
        ));
        let options = OpenOptions::new().with_checksum_verification(false);
        assert!(ParsedFile::open(data, &options).is_ok());
    }

    #[test]
    fn test_private_stack_needs_password() {
        let mut data = minimal_stack(10);
        data[0x4C..0x4E].copy_from_slice(&0x2000u16.to_be_bytes());
        let options = OpenOptions::new().with_encryption_hack(false);
        assert!(matches!(ParsedFile::open(data, &options), Err(Error::MissingPassword)));
    }

    #[test]
    fn test_missing_block() {
        let file = ParsedFile::open(minimal_stack(10), &OpenOptions::default()).unwrap();
        assert_eq!(
            file.find_block(BlockKind::Card, 0x2000).unwrap_err(),
            Error::MissingBlock {
                kind: "CARD".to_string(),
                identifier: 0x2000
            }
        );
    }

    #[test]
    fn test_truncated_record_does_not_hide_other_blocks() {
        let mut data = minimal_stack(10);
        let mut card = vec![0u8; 0x20];
        card[0..4].copy_from_slice(&0x20u32.to_be_bytes());
        card[4..8].copy_from_slice(b"CARD");
        card[8..12].copy_from_slice(&0x105i32.to_be_bytes());
        data.extend_from_slice(&card);
        // Length and kind only, the identifier is past the end
        data.extend_from_slice(&0x20u32.to_be_bytes());
        data.extend_from_slice(b"CARD");

        data[0x620..0x624].copy_from_slice(&((0x660u32 / 32) << 8 | 0x05).to_be_bytes());
        data[0x624..0x628].copy_from_slice(&((0x640u32 / 32) << 8 | 0x05).to_be_bytes());

        let file = ParsedFile::open(data, &OpenOptions::default()).unwrap();
        assert_eq!(file.master_records().len(), 2);
        assert_eq!(file.find_block(BlockKind::Card, 0x105).unwrap().len(), 0x20);
        assert_eq!(file.blocks_of_kind(BlockKind::Card).unwrap().len(), 1);
        assert_eq!(file.block_inventory().unwrap(), vec![(BlockKind::Card, 0x105)]);
    }
}
