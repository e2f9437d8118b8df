//! One-bit images: icons and the strikes of bitmap fonts.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;

/// Side of an icon, in pixels
pub const ICON_SIZE: usize = 32;

/// A black and white image, rows packed MSB first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    /// Bytes per row, rows may end with padding bits
    pub row_bytes: usize,
    pub data: Bytes,
}

impl Image {
    /// Read an image of `height` rows of `row_bytes` bytes.
    pub fn read(data: &ByteRange, offset: usize, width: usize, height: usize, row_bytes: usize) -> Result<Self> {
        let data = data.slice(offset, row_bytes * height)?;
        Ok(Self {
            width,
            height,
            row_bytes,
            data: Bytes::copy_from_slice(data.as_slice()),
        })
    }

    /// Read an `ICON` resource: 32 rows of 4 bytes.
    pub fn read_icon(data: &ByteRange) -> Result<Self> {
        Self::read(data, 0, ICON_SIZE, ICON_SIZE, ICON_SIZE / 8)
    }

    /// Whether the pixel at column `x` of row `y` is black.
    ///
    /// Pixels outside the image are white.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.row_bytes + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Number of black pixels.
    pub fn black_pixel_count(&self) -> usize {
        (0..self.height)
            .map(|y| (0..self.width).filter(|&x| self.pixel(x, y)).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_pixels() {
        let mut bytes = vec![0u8; 128];
        bytes[0] = 0x80; // top-left corner
        bytes[127] = 0x01; // bottom-right corner
        let icon = Image::read_icon(&ByteRange::new(bytes)).unwrap();
        assert_eq!((icon.width, icon.height), (32, 32));
        assert!(icon.pixel(0, 0));
        assert!(icon.pixel(31, 31));
        assert!(!icon.pixel(1, 0));
        assert!(!icon.pixel(40, 0));
        assert_eq!(icon.black_pixel_count(), 2);
    }

    #[test]
    fn test_short_icon() {
        assert!(Image::read_icon(&ByteRange::new(vec![0u8; 100])).is_err());
    }
}
