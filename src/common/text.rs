//! Mac OS Roman text and the legacy comparison rules.
//!
//! Every string in a stack file is encoded in Mac OS Roman. Comparisons in the
//! scripting language ignore both case and diacritics, so `"fàLSE"` matches
//! `false`.

use encoding_rs::MACINTOSH;
use phf::phf_map;

/// Accented Latin letters of the Mac OS Roman repertoire mapped to their base letter.
static DIACRITIC_FOLDS: phf::Map<char, char> = phf_map! {
    'à' => 'a', 'á' => 'a', 'â' => 'a', 'ã' => 'a', 'ä' => 'a', 'å' => 'a',
    'À' => 'a', 'Á' => 'a', 'Â' => 'a', 'Ã' => 'a', 'Ä' => 'a', 'Å' => 'a',
    'ç' => 'c', 'Ç' => 'c',
    'è' => 'e', 'é' => 'e', 'ê' => 'e', 'ë' => 'e',
    'È' => 'e', 'É' => 'e', 'Ê' => 'e', 'Ë' => 'e',
    'ì' => 'i', 'í' => 'i', 'î' => 'i', 'ï' => 'i',
    'Ì' => 'i', 'Í' => 'i', 'Î' => 'i', 'Ï' => 'i',
    'ñ' => 'n', 'Ñ' => 'n',
    'ò' => 'o', 'ó' => 'o', 'ô' => 'o', 'õ' => 'o', 'ö' => 'o', 'ø' => 'o',
    'Ò' => 'o', 'Ó' => 'o', 'Ô' => 'o', 'Õ' => 'o', 'Ö' => 'o', 'Ø' => 'o',
    'ù' => 'u', 'ú' => 'u', 'û' => 'u', 'ü' => 'u',
    'Ù' => 'u', 'Ú' => 'u', 'Û' => 'u', 'Ü' => 'u',
    'ÿ' => 'y', 'Ÿ' => 'y',
};

/// Decode Mac OS Roman bytes.
///
/// # Examples
///
/// ```
/// use hyperstack::common::text::decode_mac_roman;
/// assert_eq!(decode_mac_roman(b"caf\x8E"), "café");
/// ```
pub fn decode_mac_roman(bytes: &[u8]) -> String {
    let (text, _) = MACINTOSH.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Encode text to Mac OS Roman, unmappable characters become numeric references.
pub fn encode_mac_roman(text: &str) -> Vec<u8> {
    let (bytes, _, _) = MACINTOSH.encode(text);
    bytes.into_owned()
}

/// Lowercase a character and strip its diacritic.
#[inline]
pub fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    if let Some(&base) = DIACRITIC_FOLDS.get(&c) {
        return base;
    }
    c.to_lowercase().next().unwrap_or(c)
}

/// Lowercase a string and strip its diacritics.
pub fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Case and diacritic insensitive equality.
///
/// # Examples
///
/// ```
/// use hyperstack::common::text::equals_folded;
/// assert!(equals_folded("fàLSE", "false"));
/// assert!(!equals_folded("false", "fals"));
/// ```
pub fn equals_folded(a: &str, b: &str) -> bool {
    let mut left = a.chars().map(fold_char);
    let mut right = b.chars().map(fold_char);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => {},
            _ => return false,
        }
    }
}

/// Whether a character counts as a letter for identifiers.
#[inline]
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || DIACRITIC_FOLDS.contains_key(&c)
}
