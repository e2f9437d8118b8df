//! The resource fork container: header, map and data section.
//!
//! A fork starts with a 16-byte header locating the data section and the map.
//! The map lists resource types, each with a list of references giving the
//! identifier, the name and the offset of the data of a resource. Every data
//! entry is a 32-bit length followed by the payload.

use std::fmt;

use serde::{Deserialize, Serialize};
use zerocopy::{BE, FromBytes, I16, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};

/// Length of the map header before the type list
const MAP_HEADER_LENGTH: usize = 0x1E;
const TYPE_ENTRY_LENGTH: usize = 8;
const REFERENCE_ENTRY_LENGTH: usize = 12;
const NAME_LIST_OFFSET: usize = 0x1A;
const TYPE_COUNT_OFFSET: usize = 0x1C;
/// Data offsets of references share their word with attribute flags
const DATA_OFFSET_MASK: u32 = 0x00FF_FFFF;

/// Raw fork header.
#[derive(Debug, Clone, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawForkHeader {
    data_offset: U32<BE>,
    map_offset: U32<BE>,
    data_length: U32<BE>,
    map_length: U32<BE>,
}

/// Raw entry of the type list of the map.
#[derive(Debug, Clone, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawTypeEntry {
    tag: [u8; 4],
    count_minus_one: U16<BE>,
    reference_list_offset: U16<BE>,
}

/// Raw entry of a reference list.
#[derive(Debug, Clone, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawReferenceEntry {
    identifier: I16<BE>,
    name_offset: I16<BE>,
    data_offset_with_flags: U32<BE>,
    _handle: U32<BE>,
}

/// Four-character type of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType(pub [u8; 4]);

impl ResourceType {
    pub const ICON: ResourceType = ResourceType(*b"ICON");
    pub const FONT_FAMILY: ResourceType = ResourceType(*b"FOND");
    pub const BITMAP_FONT: ResourceType = ResourceType(*b"NFNT");
    /// Older form of bitmap fonts, same layout
    pub const BITMAP_FONT_OLD: ResourceType = ResourceType(*b"FONT");
    pub const VECTOR_FONT: ResourceType = ResourceType(*b"sfnt");
    pub const PICTURE: ResourceType = ResourceType(*b"PICT");
    pub const CARD_COLOR: ResourceType = ResourceType(*b"HCcd");
    pub const BACKGROUND_COLOR: ResourceType = ResourceType(*b"HCbg");
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::common::text::decode_mac_roman(&self.0))
    }
}

/// A resource entry of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub resource_type: ResourceType,
    pub identifier: i16,
    /// Empty for unnamed resources
    pub name: String,
    /// Offset of the entry in the data section
    pub data_offset: u32,
}

/// Reader of a resource fork.
#[derive(Debug, Clone)]
pub struct ResourceFork {
    data: ByteRange,
    data_offset: usize,
    map: ByteRange,
}

impl ResourceFork {
    /// Check the header and locate the map.
    pub fn new(data: ByteRange) -> Result<Self> {
        let (header, _) = RawForkHeader::read_from_prefix(data.as_slice())
            .map_err(|_| Error::CorruptedFile("resource fork header too short".to_string()))?;
        let data_offset = header.data_offset.get() as usize;
        let map_offset = header.map_offset.get() as usize;
        let map_length = header.map_length.get() as usize;
        let map = data
            .slice(map_offset, map_length)
            .map_err(|_| Error::CorruptedFile(format!("resource map of {map_length} bytes past the end")))?;
        log::debug!(
            "Resource fork: data at {data_offset:#x} ({} bytes), map at {map_offset:#x}",
            header.data_length.get()
        );
        Ok(Self {
            data,
            data_offset,
            map,
        })
    }

    /// Every resource listed in the map, grouped by type.
    pub fn references(&self) -> Result<Vec<ResourceReference>> {
        let name_list_offset = usize::from(self.map.read_u16(NAME_LIST_OFFSET)?);
        // The stored count is minus one, an empty map stores -1
        let type_count = i32::from(self.map.read_i16(TYPE_COUNT_OFFSET)?) + 1;

        let mut references = Vec::new();
        for index in 0..type_count.max(0) as usize {
            let offset = MAP_HEADER_LENGTH + index * TYPE_ENTRY_LENGTH;
            let (entry, _) = RawTypeEntry::read_from_prefix(self.map.read_bytes(offset, TYPE_ENTRY_LENGTH)?)
                .map_err(|_| Error::CorruptedFile("resource type entry".to_string()))?;
            let resource_type = ResourceType(entry.tag);
            let count = usize::from(entry.count_minus_one.get()) + 1;
            // Reference list offsets start at the type count word
            let list_offset = TYPE_COUNT_OFFSET + usize::from(entry.reference_list_offset.get());

            for reference_index in 0..count {
                let offset = list_offset + reference_index * REFERENCE_ENTRY_LENGTH;
                let (raw, _) =
                    RawReferenceEntry::read_from_prefix(self.map.read_bytes(offset, REFERENCE_ENTRY_LENGTH)?)
                        .map_err(|_| Error::CorruptedFile("resource reference entry".to_string()))?;
                let name = match raw.name_offset.get() {
                    -1 => String::new(),
                    name_offset => self.read_name(name_list_offset, name_offset).unwrap_or_else(|error| {
                        let identifier = raw.identifier.get();
                        log::warn!("Resource {resource_type} {identifier} has no readable name: {error}");
                        String::new()
                    }),
                };
                references.push(ResourceReference {
                    resource_type,
                    identifier: raw.identifier.get(),
                    name,
                    data_offset: raw.data_offset_with_flags.get() & DATA_OFFSET_MASK,
                });
            }
        }
        Ok(references)
    }

    fn read_name(&self, name_list_offset: usize, name_offset: i16) -> Result<String> {
        let offset = name_list_offset
            + usize::try_from(name_offset)
                .map_err(|_| Error::CorruptedFile(format!("negative resource name offset {name_offset}")))?;
        let length = usize::from(self.map.read_u8(offset)?);
        self.map.read_string(offset + 1, Some(length))
    }

    /// The payload of a resource.
    pub fn resource_data(&self, reference: &ResourceReference) -> Result<ByteRange> {
        let offset = self.data_offset + reference.data_offset as usize;
        let length = self.data.read_u32(offset)? as usize;
        self.data.slice(offset + 4, length)
    }
}
