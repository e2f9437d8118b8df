//! AddColor resources (`HCcd`, `HCbg`): color declarations of a card or a
//! background.

use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};
use crate::common::geometry::Rectangle;

/// An RGB color, components from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// One declaration of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AddColorElement {
    Button {
        identifier: u16,
        /// Thickness of the 3D border
        bevel: u16,
        color: AddColor,
        enabled: bool,
    },
    Field {
        identifier: u16,
        bevel: u16,
        color: AddColor,
        enabled: bool,
    },
    Rectangle {
        rectangle: Rectangle,
        bevel: u16,
        color: AddColor,
        enabled: bool,
    },
    /// A `PICT` resource drawn in a rectangle
    PictureResource {
        rectangle: Rectangle,
        /// White pixels are not drawn
        transparent: bool,
        name: String,
        enabled: bool,
    },
    /// A picture file next to the stack
    PictureFile {
        rectangle: Rectangle,
        transparent: bool,
        name: String,
        enabled: bool,
    },
}

impl AddColorElement {
    /// Disabled declarations are ignored when drawing.
    pub fn is_enabled(&self) -> bool {
        match self {
            AddColorElement::Button { enabled, .. }
            | AddColorElement::Field { enabled, .. }
            | AddColorElement::Rectangle { enabled, .. }
            | AddColorElement::PictureResource { enabled, .. }
            | AddColorElement::PictureFile { enabled, .. } => *enabled,
        }
    }
}

/// Read every declaration of a resource.
pub fn read_elements(data: &ByteRange) -> Result<Vec<AddColorElement>> {
    let mut elements = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        elements.push(read_element(data, &mut offset)?);
    }
    Ok(elements)
}

fn read_element(data: &ByteRange, offset: &mut usize) -> Result<AddColorElement> {
    let start = *offset;
    let tag = data.read_u8(start)?;
    // The high bit disables the element
    let enabled = tag & 0x80 == 0;
    let element = match tag & 0x7F {
        kind @ (1 | 2) => {
            let identifier = data.read_u16(start + 0x1)?;
            let bevel = data.read_u16(start + 0x3)?;
            let color = read_color(data, start + 0x5)?;
            *offset += 11;
            if kind == 1 {
                AddColorElement::Button {
                    identifier,
                    bevel,
                    color,
                    enabled,
                }
            } else {
                AddColorElement::Field {
                    identifier,
                    bevel,
                    color,
                    enabled,
                }
            }
        },
        3 => {
            let element = AddColorElement::Rectangle {
                rectangle: data.read_rectangle(start + 0x1)?,
                bevel: data.read_u16(start + 0x9)?,
                color: read_color(data, start + 0xB)?,
                enabled,
            };
            *offset += 17;
            element
        },
        kind @ (4 | 5) => {
            let rectangle = data.read_rectangle(start + 0x1)?;
            let transparent = data.read_u8(start + 0x9)? != 0;
            let length = usize::from(data.read_u8(start + 0xA)?);
            let name = data.read_string(start + 0xB, Some(length))?;
            *offset += 11 + length;
            if kind == 4 {
                AddColorElement::PictureResource {
                    rectangle,
                    transparent,
                    name,
                    enabled,
                }
            } else {
                AddColorElement::PictureFile {
                    rectangle,
                    transparent,
                    name,
                    enabled,
                }
            }
        },
        kind => {
            return Err(Error::CorruptedFile(format!(
                "unknown AddColor element type {kind} at offset {start}"
            )));
        },
    };
    Ok(element)
}

fn read_color(data: &ByteRange, offset: usize) -> Result<AddColor> {
    let component = |offset| data.read_u16(offset).map(|v| f64::from(v) / f64::from(u16::MAX));
    Ok(AddColor {
        red: component(offset)?,
        green: component(offset + 2)?,
        blue: component(offset + 4)?,
    })
}
