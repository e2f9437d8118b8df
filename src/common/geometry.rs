//! Plain geometry values stored in stack blocks.

use serde::{Deserialize, Serialize};

/// A QuickDraw rectangle, stored as four signed 16-bit coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rectangle {
    /// Create a rectangle from its four coordinates.
    #[inline]
    pub const fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top)
    }

    /// Encode back to the 8 big-endian bytes of the file layout.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&self.top.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.left.to_be_bytes());
        bytes[4..6].copy_from_slice(&self.bottom.to_be_bytes());
        bytes[6..8].copy_from_slice(&self.right.to_be_bytes());
        bytes
    }
}

/// A point in window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_dimensions() {
        let rect = Rectangle::new(10, 20, 110, 220);
        assert_eq!(rect.width(), 200);
        assert_eq!(rect.height(), 100);
    }

    #[test]
    fn test_rectangle_bytes() {
        let rect = Rectangle::new(-1, 2, 0x100, 0x7FFF);
        assert_eq!(
            rect.to_be_bytes(),
            [0xFF, 0xFF, 0x00, 0x02, 0x01, 0x00, 0x7F, 0xFF]
        );
    }
}
