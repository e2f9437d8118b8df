//! Decoded resources of a fork, grouped by kind.

use std::rc::Rc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::common::binary::ByteRange;
use crate::common::error::Result;
use crate::common::lazy::LazyField;
use crate::stack::blocks::TextStyle;

use super::color::{self, AddColorElement};
use super::font::{BitmapFont, BitmapFontReader, FontFamilyReader, FontStyleProperties, VectorFont};
use super::fork::{ResourceFork, ResourceReference, ResourceType};
use super::image::Image;
use super::picture::Picture;

/// A resource whose content is decoded on first access.
pub struct Resource<T> {
    pub identifier: i16,
    pub name: String,
    pub content: LazyField<T>,
}

impl<T> Resource<T> {
    pub fn new(identifier: i16, name: impl Into<String>, content: LazyField<T>) -> Self {
        Self {
            identifier,
            name: name.into(),
            content,
        }
    }
}

/// A bitmap font of a family, for one size and style.
pub struct FamilyBitmapFont {
    pub size: u16,
    pub style: TextStyle,
    pub font: Rc<Resource<BitmapFont>>,
}

/// A vector font of a family, for one style.
pub struct FamilyVectorFont {
    pub style: TextStyle,
    pub font: Rc<Resource<VectorFont>>,
}

/// A font family with its fonts resolved in the fork.
///
/// Associations pointing to fonts absent from the fork are dropped.
pub struct FontFamily {
    pub family_identifier: u16,
    pub bitmap_fonts: Vec<FamilyBitmapFont>,
    pub vector_fonts: Vec<FamilyVectorFont>,
    /// Absent when the family widens glyphs by whole pixels
    pub style_properties: Option<FontStyleProperties>,
}

impl FontFamily {
    fn resolve(
        reader: &FontFamilyReader,
        bitmap_fonts: &[Rc<Resource<BitmapFont>>],
        vector_fonts: &[Rc<Resource<VectorFont>>],
    ) -> Result<Self> {
        let associations = reader.font_associations()?;

        let mut family_bitmap_fonts = Vec::new();
        let mut family_vector_fonts = Vec::new();
        for association in associations {
            let identifier = association.resource_identifier;
            if association.size == 0 {
                match vector_fonts.iter().find(|f| i32::from(f.identifier) == i32::from(identifier)) {
                    Some(font) => family_vector_fonts.push(FamilyVectorFont {
                        style: association.style,
                        font: Rc::clone(font),
                    }),
                    None => log::debug!("Vector font {identifier} of the family is not in the fork"),
                }
            } else {
                match bitmap_fonts.iter().find(|f| i32::from(f.identifier) == i32::from(identifier)) {
                    Some(font) => family_bitmap_fonts.push(FamilyBitmapFont {
                        size: association.size,
                        style: association.style,
                        font: Rc::clone(font),
                    }),
                    None => log::debug!("Bitmap font {identifier} of the family is not in the fork"),
                }
            }
        }

        let style_properties = if reader.uses_integer_extra_width()? {
            None
        } else {
            Some(reader.style_properties()?)
        };
        Ok(Self {
            family_identifier: reader.family_identifier()?,
            bitmap_fonts: family_bitmap_fonts,
            vector_fonts: family_vector_fonts,
            style_properties,
        })
    }

    /// The bitmap font closest to a size, for a style.
    pub fn bitmap_font(&self, size: u16, style: TextStyle) -> Option<&FamilyBitmapFont> {
        self.bitmap_fonts
            .iter()
            .filter(|f| f.style == style)
            .min_by_key(|f| f.size.abs_diff(size))
    }
}

/// Summary of a resource, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub resource_type: ResourceType,
    pub identifier: i16,
    pub name: String,
}

/// Every resource of a fork the stack reader knows how to decode.
pub struct ResourceRepository {
    pub references: Vec<ResourceReference>,
    pub icons: Vec<Rc<Resource<Image>>>,
    pub bitmap_fonts: Vec<Rc<Resource<BitmapFont>>>,
    pub vector_fonts: Vec<Rc<Resource<VectorFont>>>,
    pub font_families: Vec<Rc<Resource<FontFamily>>>,
    pub pictures: Vec<Rc<Resource<Picture>>>,
    pub card_colors: Vec<Rc<Resource<Vec<AddColorElement>>>>,
    pub background_colors: Vec<Rc<Resource<Vec<AddColorElement>>>>,
}

impl ResourceRepository {
    /// List the resources of a fork. Contents are decoded on first access.
    pub fn read(data: impl Into<Bytes>) -> Result<Self> {
        let fork = Rc::new(ResourceFork::new(ByteRange::new(data))?);
        let references = fork.references()?;
        log::debug!("Resource fork lists {} resources", references.len());

        let icons = list(&fork, &references, &[ResourceType::ICON], Image::read_icon);
        let bitmap_fonts = list(
            &fork,
            &references,
            &[ResourceType::BITMAP_FONT, ResourceType::BITMAP_FONT_OLD],
            |data| BitmapFontReader::new(data.clone()).read_font(),
        );
        let vector_fonts = list(&fork, &references, &[ResourceType::VECTOR_FONT], |data| {
            Ok(VectorFont::read(data))
        });
        let font_families = {
            let bitmap_fonts = Rc::new(bitmap_fonts.clone());
            let vector_fonts = Rc::new(vector_fonts.clone());
            list(&fork, &references, &[ResourceType::FONT_FAMILY], move |data| {
                FontFamily::resolve(&FontFamilyReader::new(data.clone()), &bitmap_fonts, &vector_fonts)
            })
        };
        let pictures = list(&fork, &references, &[ResourceType::PICTURE], Picture::read);
        let card_colors = list(&fork, &references, &[ResourceType::CARD_COLOR], color::read_elements);
        let background_colors = list(&fork, &references, &[ResourceType::BACKGROUND_COLOR], color::read_elements);

        Ok(Self {
            references,
            icons,
            bitmap_fonts,
            vector_fonts,
            font_families,
            pictures,
            card_colors,
            background_colors,
        })
    }

    /// Type, identifier and name of every resource of the fork.
    pub fn summaries(&self) -> Vec<ResourceSummary> {
        self.references
            .iter()
            .map(|r| ResourceSummary {
                resource_type: r.resource_type,
                identifier: r.identifier,
                name: r.name.clone(),
            })
            .collect()
    }

    pub fn icon(&self, identifier: i16) -> Option<&Rc<Resource<Image>>> {
        self.icons.iter().find(|r| r.identifier == identifier)
    }

    /// Icons are also found by name, ignoring case.
    pub fn icon_named(&self, name: &str) -> Option<&Rc<Resource<Image>>> {
        self.icons.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn picture_named(&self, name: &str) -> Option<&Rc<Resource<Picture>>> {
        self.pictures.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn font_family(&self, identifier: i16) -> Option<&Rc<Resource<FontFamily>>> {
        self.font_families.iter().find(|r| r.identifier == identifier)
    }

    pub fn font_family_named(&self, name: &str) -> Option<&Rc<Resource<FontFamily>>> {
        self.font_families.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// AddColor declarations of a card.
    pub fn card_color(&self, card_identifier: i32) -> Option<&Rc<Resource<Vec<AddColorElement>>>> {
        self.card_colors
            .iter()
            .find(|r| i32::from(r.identifier) == card_identifier)
    }

    /// AddColor declarations of a background.
    pub fn background_color(&self, background_identifier: i32) -> Option<&Rc<Resource<Vec<AddColorElement>>>> {
        self.background_colors
            .iter()
            .find(|r| i32::from(r.identifier) == background_identifier)
    }
}

/// Build the lazy resources of some types, in map order.
fn list<T, D>(
    fork: &Rc<ResourceFork>,
    references: &[ResourceReference],
    types: &[ResourceType],
    decode: D,
) -> Vec<Rc<Resource<T>>>
where
    T: 'static,
    D: Fn(&ByteRange) -> Result<T> + Clone + 'static,
{
    references
        .iter()
        .filter(|r| types.contains(&r.resource_type))
        .map(|reference| {
            let fork = Rc::clone(fork);
            let decode = decode.clone();
            let located = reference.clone();
            let content = LazyField::new(move || decode(&fork.resource_data(&located)?));
            Rc::new(Resource::new(reference.identifier, reference.name.clone(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::font::tests::{bitmap_font_bytes, family_bytes};
    use crate::resource::fork::tests::fork_bytes;

    fn repository() -> ResourceRepository {
        let bytes = fork_bytes(&[
            (b"ICON", 128, "Arrow", {
                let mut icon = vec![0u8; 128];
                icon[0] = 0xFF;
                icon
            }),
            (b"NFNT", 3000, "", bitmap_font_bytes()),
            (b"FOND", 21, "Chicago", family_bytes(21, &[(12, 0, 3000), (9, 0, 4000)])),
            (b"HCcd", 0x2000, "", vec![0x02, 0, 5, 0, 1, 0, 0, 0, 0, 0xFF, 0xFF]),
        ]);
        ResourceRepository::read(bytes).unwrap()
    }

    #[test]
    fn test_icons() {
        let repository = repository();
        assert_eq!(repository.icons.len(), 1);
        let icon = repository.icon_named("arrow").unwrap();
        assert!(!icon.content.is_ready());
        assert_eq!(icon.content.with(Image::black_pixel_count).unwrap(), 8);
        assert!(repository.icon(1).is_none());
    }

    #[test]
    fn test_font_family_resolution() {
        let repository = repository();
        let family = repository.font_family_named("Chicago").unwrap();
        family
            .content
            .with(|family| {
                assert_eq!(family.family_identifier, 21);
                // The 9-point font is not in the fork
                assert_eq!(family.bitmap_fonts.len(), 1);
                let font = family.bitmap_font(10, TextStyle::empty()).unwrap();
                assert_eq!(font.size, 12);
                assert_eq!(font.font.content.with(|f| f.glyphs.len()).unwrap(), 4);
            })
            .unwrap();
    }

    #[test]
    fn test_card_colors() {
        let repository = repository();
        let colors = repository.card_color(0x2000).unwrap().content.get().unwrap();
        assert!(matches!(colors[0], AddColorElement::Field { identifier: 5, bevel: 1, .. }));
        assert!(repository.background_color(0x2000).is_none());
    }

    #[test]
    fn test_summaries() {
        let summaries = repository().summaries();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[2].resource_type, ResourceType::FONT_FAMILY);
        assert_eq!(summaries[2].name, "Chicago");
    }
}
