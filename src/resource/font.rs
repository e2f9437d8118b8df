//! Font resources: families (`FOND`), bitmap fonts (`NFNT`, `FONT`) and
//! vector fonts (`sfnt`).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::stack::blocks::TextStyle;

use super::image::Image;

const ASSOCIATION_TABLE_OFFSET: usize = 0x34;
const ASSOCIATION_LENGTH: usize = 6;
const BIT_IMAGE_OFFSET: usize = 0x1A;

/// Font of a family for a size and a style. Size 0 means a vector font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontAssociation {
    pub size: u16,
    pub style: TextStyle,
    pub resource_identifier: u16,
}

/// Extra width added to the glyphs of a 1-point font by each face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStyleProperties {
    pub plain_extra_width: f64,
    pub bold_extra_width: f64,
    pub italic_extra_width: f64,
    pub underline_extra_width: f64,
    pub outline_extra_width: f64,
    pub shadow_extra_width: f64,
    pub condensed_extra_width: f64,
    pub extended_extra_width: f64,
}

/// Reader of a `FOND` resource.
#[derive(Debug, Clone)]
pub struct FontFamilyReader {
    data: ByteRange,
}

impl FontFamilyReader {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    /// 4.12 fixed-point value.
    ///
    /// Negative values are stored either in two's complement or as a sign bit
    /// over the magnitude; the second bit tells them apart.
    fn read_fraction(&self, offset: usize) -> Result<f64> {
        let bits = self.data.read_u16(offset)?;
        let scale = f64::from(1u16 << 12);
        Ok(match bits >> 14 {
            0b11 => f64::from(bits as i16) / scale,
            0b10 => -f64::from(bits & 0x7FFF) / scale,
            _ => f64::from(bits) / scale,
        })
    }

    pub fn has_glyph_width_table(&self) -> Result<bool> {
        self.data.read_flag16(0, 1)
    }

    /// Whether faces widen glyphs by whole pixels instead of the style
    /// properties
    pub fn uses_integer_extra_width(&self) -> Result<bool> {
        self.data.read_flag16(0, 13)
    }

    pub fn is_fixed_width(&self) -> Result<bool> {
        self.data.read_flag16(0, 15)
    }

    /// Identifier of the family, used by font tables and formattings
    pub fn family_identifier(&self) -> Result<u16> {
        self.data.read_u16(0x2)
    }

    pub fn first_character_code(&self) -> Result<u16> {
        self.data.read_u16(0x4)
    }

    pub fn last_character_code(&self) -> Result<u16> {
        self.data.read_u16(0x6)
    }

    pub fn maximum_ascent(&self) -> Result<f64> {
        self.read_fraction(0x8)
    }

    pub fn maximum_descent(&self) -> Result<f64> {
        self.read_fraction(0xA)
    }

    pub fn maximum_leading(&self) -> Result<f64> {
        self.read_fraction(0xC)
    }

    pub fn maximum_glyph_width(&self) -> Result<f64> {
        self.read_fraction(0xE)
    }

    pub fn style_properties(&self) -> Result<FontStyleProperties> {
        Ok(FontStyleProperties {
            plain_extra_width: self.read_fraction(0x1C)?,
            bold_extra_width: self.read_fraction(0x1E)?,
            italic_extra_width: self.read_fraction(0x20)?,
            underline_extra_width: self.read_fraction(0x22)?,
            outline_extra_width: self.read_fraction(0x24)?,
            shadow_extra_width: self.read_fraction(0x26)?,
            condensed_extra_width: self.read_fraction(0x28)?,
            extended_extra_width: self.read_fraction(0x2A)?,
        })
    }

    /// Format version of the resource, from 0 to 3.
    pub fn version(&self) -> Result<u16> {
        self.data.read_u16(0x32)
    }

    pub fn font_associations(&self) -> Result<Vec<FontAssociation>> {
        let count = usize::from(self.data.read_u16(ASSOCIATION_TABLE_OFFSET)?) + 1;
        (0..count)
            .map(|i| {
                let offset = ASSOCIATION_TABLE_OFFSET + 2 + i * ASSOCIATION_LENGTH;
                Ok(FontAssociation {
                    size: self.data.read_u16(offset)?,
                    style: TextStyle::from_bits_truncate(self.data.read_u16(offset + 2)? as u8),
                    resource_identifier: self.data.read_u16(offset + 4)?,
                })
            })
            .collect()
    }
}

/// Metrics and image of one character of a bitmap font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    /// Bit offset of the glyph in the strike
    pub image_offset: u16,
    pub image_width: u16,
    /// Distance from the origin to the left of the image, negative for kerning
    pub origin_offset: i16,
    /// Advance to the origin of the next glyph
    pub width: u8,
}

/// A decoded bitmap font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapFont {
    pub first_character_code: u16,
    pub last_character_code: u16,
    pub maximum_width: u16,
    pub maximum_kerning: i16,
    pub font_rectangle_width: u16,
    pub font_rectangle_height: u16,
    pub maximum_ascent: u16,
    pub maximum_descent: u16,
    pub leading: u16,
    /// Every glyph side by side
    pub strike: Image,
    /// Glyphs from the first code to the last, then the missing-character glyph.
    /// Codes the font lacks are `None`.
    pub glyphs: Vec<Option<Glyph>>,
}

impl BitmapFont {
    /// The glyph drawn for a character code.
    pub fn glyph(&self, code: u8) -> Option<&Glyph> {
        let code = u16::from(code);
        let missing = self.glyphs.last().and_then(Option::as_ref);
        if code < self.first_character_code || code > self.last_character_code {
            return missing;
        }
        match self.glyphs.get(usize::from(code - self.first_character_code)) {
            Some(Some(glyph)) => Some(glyph),
            _ => missing,
        }
    }
}

/// Reader of a `NFNT` or `FONT` resource.
#[derive(Debug, Clone)]
pub struct BitmapFontReader {
    data: ByteRange,
}

impl BitmapFontReader {
    pub fn new(data: ByteRange) -> Self {
        Self { data }
    }

    pub fn has_image_height_table(&self) -> Result<bool> {
        self.data.read_flag16(0, 0)
    }

    pub fn has_glyph_width_table(&self) -> Result<bool> {
        self.data.read_flag16(0, 1)
    }

    pub fn first_character_code(&self) -> Result<u16> {
        self.data.read_u16(0x2)
    }

    pub fn last_character_code(&self) -> Result<u16> {
        self.data.read_u16(0x4)
    }

    pub fn maximum_width(&self) -> Result<u16> {
        self.data.read_u16(0x6)
    }

    pub fn maximum_kerning(&self) -> Result<i16> {
        self.data.read_i16(0x8)
    }

    pub fn font_rectangle_width(&self) -> Result<u16> {
        self.data.read_u16(0xC)
    }

    pub fn font_rectangle_height(&self) -> Result<u16> {
        self.data.read_u16(0xE)
    }

    pub fn maximum_ascent(&self) -> Result<u16> {
        self.data.read_u16(0x12)
    }

    pub fn maximum_descent(&self) -> Result<u16> {
        self.data.read_u16(0x14)
    }

    pub fn leading(&self) -> Result<u16> {
        self.data.read_u16(0x16)
    }

    /// Width of the strike in 16-bit words
    pub fn bit_image_row_words(&self) -> Result<u16> {
        self.data.read_u16(0x18)
    }

    /// Glyph count, the missing-character glyph included.
    fn glyph_count(&self) -> Result<usize> {
        let first = usize::from(self.first_character_code()?);
        let last = usize::from(self.last_character_code()?);
        Ok((last + 2).saturating_sub(first))
    }

    fn bit_image_length(&self) -> Result<usize> {
        Ok(usize::from(self.bit_image_row_words()?) * 2 * usize::from(self.font_rectangle_height()?))
    }

    pub fn strike(&self) -> Result<Image> {
        let row_bytes = usize::from(self.bit_image_row_words()?) * 2;
        Image::read(
            &self.data,
            BIT_IMAGE_OFFSET,
            row_bytes * 8,
            usize::from(self.font_rectangle_height()?),
            row_bytes,
        )
    }

    /// Bit offsets of the glyphs in the strike, one more than the glyphs.
    pub fn locations(&self) -> Result<Vec<u16>> {
        let start = BIT_IMAGE_OFFSET + self.bit_image_length()?;
        (0..=self.glyph_count()?)
            .map(|i| self.data.read_u16(start + 2 * i))
            .collect()
    }

    /// Offset and width of each glyph, `None` for missing characters.
    pub fn offset_widths(&self) -> Result<Vec<Option<(i16, u8)>>> {
        let count = self.glyph_count()?;
        let start = BIT_IMAGE_OFFSET + self.bit_image_length()? + (count + 1) * 2;
        (0..count)
            .map(|i| {
                let value = self.data.read_i16(start + 2 * i)?;
                Ok((value != -1).then(|| (i16::from((value >> 8) as i8), (value & 0xFF) as u8)))
            })
            .collect()
    }

    pub fn read_font(&self) -> Result<BitmapFont> {
        let locations = self.locations()?;
        let kerning = self.maximum_kerning()?;
        let glyphs = self
            .offset_widths()?
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.map(|(offset, width)| Glyph {
                    image_offset: locations[i],
                    image_width: locations[i + 1].saturating_sub(locations[i]),
                    origin_offset: offset + kerning,
                    width,
                })
            })
            .collect();
        Ok(BitmapFont {
            first_character_code: self.first_character_code()?,
            last_character_code: self.last_character_code()?,
            maximum_width: self.maximum_width()?,
            maximum_kerning: kerning,
            font_rectangle_width: self.font_rectangle_width()?,
            font_rectangle_height: self.font_rectangle_height()?,
            maximum_ascent: self.maximum_ascent()?,
            maximum_descent: self.maximum_descent()?,
            leading: self.leading()?,
            strike: self.strike()?,
            glyphs,
        })
    }
}

/// An outline font, kept as the raw `sfnt` data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorFont {
    pub data: Bytes,
}

impl VectorFont {
    pub fn read(data: &ByteRange) -> Self {
        Self {
            data: Bytes::copy_from_slice(data.as_slice()),
        }
    }

    /// Number of tables of the font directory, `None` if the data is too short.
    pub fn table_count(&self) -> Option<u16> {
        ByteRange::new(self.data.clone()).read_u16(4).ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn family_bytes(identifier: u16, associations: &[(u16, u8, u16)]) -> Vec<u8> {
        let mut data = vec![0u8; ASSOCIATION_TABLE_OFFSET];
        data[0x2..0x4].copy_from_slice(&identifier.to_be_bytes());
        data[0x8..0xA].copy_from_slice(&0x0C00u16.to_be_bytes()); // ascent 0.75
        data[0xA..0xC].copy_from_slice(&0xF000u16.to_be_bytes()); // descent -1 in two's complement
        data[0xC..0xE].copy_from_slice(&0x8800u16.to_be_bytes()); // leading -0.5 as sign and magnitude
        data[0x1E..0x20].copy_from_slice(&0x0100u16.to_be_bytes()); // bold 1/16
        data.extend_from_slice(&((associations.len() as u16) - 1).to_be_bytes());
        for &(size, style, resource) in associations {
            data.extend_from_slice(&size.to_be_bytes());
            data.extend_from_slice(&u16::from(style).to_be_bytes());
            data.extend_from_slice(&resource.to_be_bytes());
        }
        data
    }

    /// A font of two characters, `A` and `C`, `B` missing.
    pub(crate) fn bitmap_font_bytes() -> Vec<u8> {
        let mut data = vec![0u8; BIT_IMAGE_OFFSET];
        data[0x2..0x4].copy_from_slice(&0x41u16.to_be_bytes()); // first A
        data[0x4..0x6].copy_from_slice(&0x43u16.to_be_bytes()); // last C
        data[0x6..0x8].copy_from_slice(&6u16.to_be_bytes());
        data[0x8..0xA].copy_from_slice(&(-1i16).to_be_bytes()); // kerning
        data[0xE..0x10].copy_from_slice(&2u16.to_be_bytes()); // height
        data[0x12..0x14].copy_from_slice(&2u16.to_be_bytes());
        data[0x18..0x1A].copy_from_slice(&1u16.to_be_bytes()); // one word per row
        data.extend_from_slice(&[0b1111_0110, 0b1000_0000, 0b1001_0110, 0b1000_0000]);
        for location in [0u16, 4, 4, 7, 9] {
            data.extend_from_slice(&location.to_be_bytes());
        }
        data.extend_from_slice(&0x0105u16.to_be_bytes()); // A: offset 1, width 5
        data.extend_from_slice(&(-1i16).to_be_bytes()); // B missing
        data.extend_from_slice(&0x0004u16.to_be_bytes());
        data.extend_from_slice(&0x0003u16.to_be_bytes()); // missing-character glyph
        data
    }

    #[test]
    fn test_family_header() {
        let reader = FontFamilyReader::new(ByteRange::new(family_bytes(21, &[(12, 0, 1000), (0, 1, 2000)])));
        assert_eq!(reader.family_identifier().unwrap(), 21);
        assert_eq!(reader.maximum_ascent().unwrap(), 0.75);
        assert_eq!(reader.maximum_descent().unwrap(), -1.0);
        assert_eq!(reader.maximum_leading().unwrap(), -0.5);
        assert_eq!(reader.style_properties().unwrap().bold_extra_width, 0.0625);
        let associations = reader.font_associations().unwrap();
        assert_eq!(associations.len(), 2);
        assert_eq!(associations[1].style, TextStyle::BOLD);
        assert_eq!(associations[1].resource_identifier, 2000);
    }

    #[test]
    fn test_bitmap_font() {
        let font = BitmapFontReader::new(ByteRange::new(bitmap_font_bytes())).read_font().unwrap();
        assert_eq!(font.glyphs.len(), 4);
        assert_eq!(font.strike.width, 16);
        let a = font.glyph(b'A').unwrap();
        assert_eq!((a.image_offset, a.image_width, a.width), (0, 4, 5));
        assert_eq!(a.origin_offset, 0);
        // Missing and out of range codes use the last glyph
        assert_eq!(font.glyph(b'B').unwrap().width, 3);
        assert_eq!(font.glyph(b'z').unwrap().width, 3);
        assert_eq!(font.glyph(b'C').unwrap().image_width, 3);
        assert!(font.strike.pixel(0, 0));
        assert!(!font.strike.pixel(4, 0));
    }

    #[test]
    fn test_vector_font() {
        let font = VectorFont::read(&ByteRange::new(vec![0, 1, 0, 0, 0, 9]));
        assert_eq!(font.table_count(), Some(9));
        assert_eq!(VectorFont::read(&ByteRange::new(vec![0])).table_count(), None);
    }
}
