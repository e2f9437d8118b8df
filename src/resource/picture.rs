//! `PICT` resources, kept as raw QuickDraw picture data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::common::geometry::Rectangle;

const FRAME_OFFSET: usize = 0x2;
const VERSION_OFFSET: usize = 0xA;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictureVersion {
    V1,
    V2,
    Unknown,
}

/// A QuickDraw picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    /// Bounds of the picture at its natural size
    pub frame: Rectangle,
    pub version: PictureVersion,
    /// The whole resource, header included
    pub data: Bytes,
}

impl Picture {
    pub fn read(data: &ByteRange) -> Result<Self> {
        let frame = data.read_rectangle(FRAME_OFFSET)?;
        // Version 1 opcodes are one byte, version 2 ones are words
        let version = match (data.read_u8(VERSION_OFFSET), data.read_u16(VERSION_OFFSET)) {
            (Ok(0x11), _) if data.read_u8(VERSION_OFFSET + 1) == Ok(0x01) => PictureVersion::V1,
            (_, Ok(0x0011)) if data.read_u16(VERSION_OFFSET + 2) == Ok(0x02FF) => PictureVersion::V2,
            _ => PictureVersion::Unknown,
        };
        Ok(Self {
            frame,
            version,
            data: Bytes::copy_from_slice(data.as_slice()),
        })
    }
}
