//! Byte range views over the shared file buffer.
//!
//! A [`ByteRange`] is a window over an immutable, reference-counted buffer.
//! Slicing never copies: every block view of a stack file aliases the same
//! allocation. All multi-byte reads are big-endian and bounds-checked.

use bytes::Bytes;
use zerocopy::{BE, FromBytes, I16, I32, U16, U32};

use super::error::{Error, Result};
use super::geometry::Rectangle;
use super::text::decode_mac_roman;

/// An offset and length window over a shared immutable buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteRange {
    data: Bytes,
}

impl ByteRange {
    /// Create a view over a whole buffer.
    #[inline]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Length of the window in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bytes of the window.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// A sub-window sharing the same buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstack::common::binary::ByteRange;
    /// let range = ByteRange::new(vec![1u8, 2, 3, 4, 5]);
    /// let sub = range.slice(1, 3).unwrap();
    /// assert_eq!(sub.as_slice(), &[2, 3, 4]);
    /// assert!(range.slice(4, 2).is_err());
    /// ```
    pub fn slice(&self, offset: usize, length: usize) -> Result<ByteRange> {
        self.check(offset, length)?;
        Ok(ByteRange {
            data: self.data.slice(offset..offset + length),
        })
    }

    /// Bytes from `offset` to the end of the window.
    pub fn slice_from(&self, offset: usize) -> Result<ByteRange> {
        if offset > self.len() {
            return Err(self.out_of_range(offset, 0));
        }
        Ok(ByteRange {
            data: self.data.slice(offset..),
        })
    }

    /// Borrow `width` bytes at `offset`.
    #[inline]
    pub fn read_bytes(&self, offset: usize, width: usize) -> Result<&[u8]> {
        self.check(offset, width)?;
        Ok(&self.data[offset..offset + width])
    }

    #[inline]
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    #[inline]
    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        self.read_u8(offset).map(|v| v as i8)
    }

    #[inline]
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let bytes = self.read_bytes(offset, 2)?;
        U16::<BE>::read_from_bytes(bytes)
            .map(|v| v.get())
            .map_err(|_| self.out_of_range(offset, 2))
    }

    #[inline]
    pub fn read_i16(&self, offset: usize) -> Result<i16> {
        let bytes = self.read_bytes(offset, 2)?;
        I16::<BE>::read_from_bytes(bytes)
            .map(|v| v.get())
            .map_err(|_| self.out_of_range(offset, 2))
    }

    #[inline]
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let bytes = self.read_bytes(offset, 4)?;
        U32::<BE>::read_from_bytes(bytes)
            .map(|v| v.get())
            .map_err(|_| self.out_of_range(offset, 4))
    }

    #[inline]
    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        let bytes = self.read_bytes(offset, 4)?;
        I32::<BE>::read_from_bytes(bytes)
            .map(|v| v.get())
            .map_err(|_| self.out_of_range(offset, 4))
    }

    /// Bit `bit` of the byte at `offset`, counting from the most significant bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstack::common::binary::ByteRange;
    /// let range = ByteRange::new(vec![0b1000_0010u8]);
    /// assert!(range.read_flag(0, 0).unwrap());
    /// assert!(range.read_flag(0, 6).unwrap());
    /// assert!(!range.read_flag(0, 7).unwrap());
    /// ```
    #[inline]
    pub fn read_flag(&self, offset: usize, bit: u8) -> Result<bool> {
        let byte = self.read_u8(offset)?;
        Ok((byte >> (7 - (bit & 7))) & 1 == 1)
    }

    /// Bit `bit` of the big-endian word at `offset`, counting from the least
    /// significant bit. Flag tables of the block layouts use this numbering.
    #[inline]
    pub fn read_flag16(&self, offset: usize, bit: u8) -> Result<bool> {
        let word = self.read_u16(offset)?;
        Ok((word >> (bit & 15)) & 1 == 1)
    }

    /// Read a Mac OS Roman string.
    ///
    /// With a length, reads exactly that many bytes. Without one, reads a
    /// Pascal string: a length byte followed by the characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use hyperstack::common::binary::ByteRange;
    /// let range = ByteRange::new(b"\x05HelloWorld".to_vec());
    /// assert_eq!(range.read_string(0, None).unwrap(), "Hello");
    /// assert_eq!(range.read_string(6, Some(5)).unwrap(), "World");
    /// ```
    pub fn read_string(&self, offset: usize, length: Option<usize>) -> Result<String> {
        let (start, length) = match length {
            Some(length) => (offset, length),
            None => (offset + 1, usize::from(self.read_u8(offset)?)),
        };
        self.read_bytes(start, length).map(decode_mac_roman)
    }

    /// Number of bytes before the null terminator starting at `offset`.
    ///
    /// A string running to the end of the window without terminator counts
    /// up to the end.
    pub fn c_string_length(&self, offset: usize) -> Result<usize> {
        if offset > self.len() {
            return Err(self.out_of_range(offset, 1));
        }
        let tail = &self.data[offset..];
        Ok(memchr::memchr(0, tail).unwrap_or(tail.len()))
    }

    /// Read a null-terminated Mac OS Roman string.
    pub fn read_c_string(&self, offset: usize) -> Result<String> {
        let length = self.c_string_length(offset)?;
        self.read_bytes(offset, length).map(decode_mac_roman)
    }

    /// Read four signed 16-bit values: top, left, bottom, right.
    pub fn read_rectangle(&self, offset: usize) -> Result<Rectangle> {
        Ok(Rectangle {
            top: self.read_i16(offset)?,
            left: self.read_i16(offset + 2)?,
            bottom: self.read_i16(offset + 4)?,
            right: self.read_i16(offset + 6)?,
        })
    }

    /// Read a 16-bit window coordinate.
    ///
    /// The two high bits tag the encoding: `10` is a positive value in the
    /// low 15 bits, `11` a negative value, anything else the raw value.
    pub fn read_coordinate(&self, offset: usize) -> Result<i32> {
        let value = self.read_u16(offset)?;
        Ok(match value >> 14 {
            0b10 => i32::from(value & 0x7FFF),
            0b11 => i32::from(value as i16),
            _ => i32::from(value),
        })
    }

    /// Read a rectangle made of four tagged coordinates.
    pub fn read_coordinate_rectangle(&self, offset: usize) -> Result<Rectangle> {
        let clamp = |v: i32| v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        Ok(Rectangle {
            top: clamp(self.read_coordinate(offset)?),
            left: clamp(self.read_coordinate(offset + 2)?),
            bottom: clamp(self.read_coordinate(offset + 4)?),
            right: clamp(self.read_coordinate(offset + 6)?),
        })
    }

    #[inline]
    fn check(&self, offset: usize, width: usize) -> Result<()> {
        match offset.checked_add(width) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(self.out_of_range(offset, width)),
        }
    }

    #[inline]
    fn out_of_range(&self, offset: usize, width: usize) -> Error {
        Error::OutOfRange {
            offset,
            width,
            length: self.len(),
        }
    }
}

impl From<Vec<u8>> for ByteRange {
    fn from(data: Vec<u8>) -> Self {
        ByteRange::new(data)
    }
}

impl From<Bytes> for ByteRange {
    fn from(data: Bytes) -> Self {
        ByteRange { data }
    }
}
