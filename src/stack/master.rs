//! The master block: directory of every block of the data fork.

use crate::common::binary::ByteRange;
use crate::common::error::Result;

use super::consts::MASTER_ENTRIES_OFFSET;

/// One directory entry of the master block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterRecord {
    /// Low byte of the identifier of the block
    pub identifier_last_byte: u8,
    /// Offset of the block in the file
    pub offset: usize,
}

impl MasterRecord {
    /// Decode a raw entry, zero entries are unused slots.
    #[inline]
    pub fn from_entry(entry: u32) -> Option<Self> {
        if entry == 0 {
            return None;
        }
        Some(MasterRecord {
            identifier_last_byte: (entry & 0xFF) as u8,
            offset: (entry >> 8) as usize * 32,
        })
    }
}

/// Reader of the `MAST` block.
#[derive(Debug, Clone)]
pub struct MasterBlockReader {
    data: ByteRange,
}

impl MasterBlockReader {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    /// All used directory entries, in file order.
    pub fn read_records(&self) -> Result<Vec<MasterRecord>> {
        let mut records = Vec::new();
        let mut offset = MASTER_ENTRIES_OFFSET;
        while offset + 4 <= self.data.len() {
            if let Some(record) = MasterRecord::from_entry(self.data.read_u32(offset)?) {
                records.push(record);
            }
            offset += 4;
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entry() {
        assert_eq!(MasterRecord::from_entry(0), None);
        assert_eq!(
            MasterRecord::from_entry(0x0000_1203),
            Some(MasterRecord {
                identifier_last_byte: 0x03,
                offset: 0x12 * 32
            })
        );
    }

    #[test]
    fn test_read_records() {
        let mut data = vec![0u8; 0x20];
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0x05]); // offset 32, id ..05
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // unused slot
        data.extend_from_slice(&[0x00, 0x00, 0x10, 0xFF]); // offset 512, id ..FF
        let reader = MasterBlockReader::new(ByteRange::new(data));
        let records = reader.read_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 32);
        assert_eq!(records[0].identifier_last_byte, 5);
        assert_eq!(records[1].offset, 512);
    }
}
