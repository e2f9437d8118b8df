//! Part records stored in layer blocks.
//!
//! Buttons and fields share one record layout. Several flag bits have a
//! meaning for buttons and another for fields.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::common::geometry::Rectangle;

use super::style::TextStyle;

const FLAGS_OFFSET: usize = 0x4;
const EXTENDED_FLAGS_OFFSET: usize = 0xE;
const NAME_OFFSET: usize = 0x1E;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    Button,
    Field,
}

/// Visual style of a part, buttons and fields mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartStyle {
    #[default]
    Transparent,
    Opaque,
    Rectangle,
    RoundRect,
    Shadow,
    CheckBox,
    Radio,
    Scrolling,
    Standard,
    Default,
    Oval,
    Popup,
}

impl PartStyle {
    /// Unknown values are read as transparent.
    pub fn from_raw(value: u8) -> Self {
        match value {
            1 => PartStyle::Opaque,
            2 => PartStyle::Rectangle,
            3 => PartStyle::RoundRect,
            4 => PartStyle::Shadow,
            5 => PartStyle::CheckBox,
            6 => PartStyle::Radio,
            7 => PartStyle::Scrolling,
            8 => PartStyle::Standard,
            9 => PartStyle::Default,
            10 => PartStyle::Oval,
            11 => PartStyle::Popup,
            _ => PartStyle::Transparent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Reader of a part record.
#[derive(Debug, Clone)]
pub struct PartBlock {
    data: ByteRange,
}

impl PartBlock {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    /// Size of the record, including this word.
    pub fn size(&self) -> Result<u16> {
        self.data.read_u16(0)
    }

    pub fn identifier(&self) -> Result<i32> {
        self.data.read_u16(0x2).map(i32::from)
    }

    pub fn kind(&self) -> Result<PartKind> {
        Ok(if self.data.read_flag16(FLAGS_OFFSET, 8)? {
            PartKind::Button
        } else {
            PartKind::Field
        })
    }

    /// Buttons only.
    pub fn enabled(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 0).map(|v| !v)
    }

    /// Fields only.
    pub fn lock_text(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 0)
    }

    /// Fields only.
    pub fn auto_tab(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 1)
    }

    pub fn fixed_line_height(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 2).map(|v| !v)
    }

    /// Fields only: the text is the same on every card.
    pub fn shared_text(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 3)
    }

    /// Fields only.
    pub fn dont_search(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 4)
    }

    /// Fields only.
    pub fn dont_wrap(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 5)
    }

    pub fn visible(&self) -> Result<bool> {
        self.data.read_flag16(FLAGS_OFFSET, 7).map(|v| !v)
    }

    pub fn rectangle(&self) -> Result<Rectangle> {
        self.data.read_rectangle(0x6)
    }

    /// Buttons only: radio group, 0 for none.
    pub fn family(&self) -> Result<u8> {
        self.data.read_u8(EXTENDED_FLAGS_OFFSET).map(|v| v & 0b1111)
    }

    /// Buttons only.
    pub fn shared_hilite(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 12).map(|v| !v)
    }

    /// Fields only.
    pub fn multiple_lines(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 12)
    }

    /// Buttons only.
    pub fn auto_hilite(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 13)
    }

    /// Fields only.
    pub fn wide_margins(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 13)
    }

    /// Buttons only.
    pub fn hilite(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 14)
    }

    /// Fields only.
    pub fn show_lines(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 14)
    }

    /// Buttons only.
    pub fn show_name(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 15)
    }

    /// Fields only.
    pub fn auto_select(&self) -> Result<bool> {
        self.data.read_flag16(EXTENDED_FLAGS_OFFSET, 15)
    }

    pub fn style(&self) -> Result<PartStyle> {
        self.data.read_u8(0xF).map(PartStyle::from_raw)
    }

    /// Fields only: line index of the end of the selection.
    pub fn last_selected_line(&self) -> Result<i32> {
        self.data.read_u16(0x10).map(|v| i32::from(v) - 1)
    }

    /// Pop-up buttons only.
    pub fn title_width(&self) -> Result<u16> {
        self.data.read_u16(0x10)
    }

    /// Fields and pop-up buttons: line index of the start of the selection.
    pub fn selected_line(&self) -> Result<i32> {
        self.data.read_u16(0x12).map(|v| i32::from(v) - 1)
    }

    /// Buttons only.
    pub fn icon_identifier(&self) -> Result<i32> {
        self.data.read_i16(0x12).map(i32::from)
    }

    pub fn text_align(&self) -> Result<TextAlign> {
        Ok(match self.data.read_i16(0x14)? {
            1 => TextAlign::Center,
            -1 => TextAlign::Right,
            _ => TextAlign::Left,
        })
    }

    /// Identifier of the text font. Negative stored values are `-id - 1`.
    pub fn text_font_identifier(&self) -> Result<i32> {
        let identifier = i32::from(self.data.read_i16(0x16)?);
        Ok(if identifier >= 0 { identifier } else { -identifier - 1 })
    }

    pub fn text_font_size(&self) -> Result<u16> {
        self.data.read_u16(0x18)
    }

    pub fn text_style(&self) -> Result<TextStyle> {
        self.data.read_u8(0x1A).map(TextStyle::from_bits_retain)
    }

    pub fn text_height(&self) -> Result<u16> {
        self.data.read_u16(0x1C)
    }

    pub fn name(&self) -> Result<String> {
        self.data.read_c_string(NAME_OFFSET)
    }

    /// Script, after the name and one more byte.
    pub fn script(&self) -> Result<String> {
        let end_of_name = NAME_OFFSET + self.data.c_string_length(NAME_OFFSET)?;
        if end_of_name + 2 > self.data.len() {
            return Ok(String::new());
        }
        self.data.read_c_string(end_of_name + 2)
    }
}
