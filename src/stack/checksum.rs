//! Checksums of the card directory and of the stack header.
//!
//! List and page blocks store a rolling checksum of their references. A
//! mismatch is reported as [`Error::IntegrityWarning`]: the directory stays
//! usable, callers log the warning and go on.

use crate::common::error::{Error, Result};

/// Rotate a 32-bit value 3 bits to the right.
///
/// # Examples
///
/// ```
/// use hyperstack::stack::checksum::rotate_right_3_bits;
/// assert_eq!(rotate_right_3_bits(0b1000), 0b1);
/// assert_eq!(rotate_right_3_bits(0b0101), 0xA000_0000);
/// ```
#[inline]
pub const fn rotate_right_3_bits(n: u32) -> u32 {
    (n >> 3) | ((n & 0b111) << 29)
}

/// Checksum of a list block from its `(page identifier, card count)` pairs.
pub fn list_checksum(references: impl IntoIterator<Item = (i32, u16)>) -> u32 {
    references
        .into_iter()
        .fold(0u32, |c, (identifier, card_count)| {
            rotate_right_3_bits(c.wrapping_add(identifier as u32)).wrapping_add(u32::from(card_count))
        })
}

/// Checksum of a page block from its card identifiers.
pub fn page_checksum(identifiers: impl IntoIterator<Item = i32>) -> u32 {
    identifiers.into_iter().fold(0u32, |c, identifier| {
        rotate_right_3_bits(c.wrapping_add(identifier as u32))
    })
}

/// Compare a stored checksum with the recomputed one.
pub fn verify(block: &'static str, stored: u32, computed: u32) -> Result<()> {
    if stored == computed {
        Ok(())
    } else {
        Err(Error::IntegrityWarning {
            block,
            stored,
            computed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate() {
        assert_eq!(rotate_right_3_bits(0), 0);
        assert_eq!(rotate_right_3_bits(0xFFFF_FFFF), 0xFFFF_FFFF);
        assert_eq!(rotate_right_3_bits(1), 0x2000_0000);
    }

    #[test]
    fn test_page_checksum() {
        // rot(0 + 8) = 1, rot(1 + 0x0F) = 2
        assert_eq!(page_checksum([8, 0x0F]), 2);
        assert_eq!(page_checksum([]), 0);
    }

    #[test]
    fn test_list_checksum() {
        // rot(0 + 16) + 3 = 5, rot(5 + 3) + 1 = 2
        assert_eq!(list_checksum([(16, 3), (3, 1)]), 2);
    }

    #[test]
    fn test_verify() {
        assert!(verify("PAGE", 2, 2).is_ok());
        let err = verify("PAGE", 2, 3).unwrap_err();
        assert!(err.is_warning());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_rotation_is_a_permutation(n in any::<u32>()) {
                // 32 rotations of 3 bits are three full turns
                let mut value = n;
                for _ in 0..32 {
                    value = rotate_right_3_bits(value);
                }
                prop_assert_eq!(value, n);
                prop_assert_eq!(rotate_right_3_bits(n), n.rotate_right(3));
            }

            #[test]
            fn prop_page_checksum_detects_changed_identifier(
                ids in proptest::collection::vec(any::<i32>(), 1..40),
                index in any::<proptest::sample::Index>(),
                delta in 1i32..i32::MAX,
            ) {
                let stored = page_checksum(ids.iter().copied());
                let mut changed = ids.clone();
                let i = index.index(changed.len());
                changed[i] = changed[i].wrapping_add(delta);
                prop_assert_ne!(page_checksum(changed), stored);
            }

            #[test]
            fn prop_list_checksum_detects_changed_identifier(
                refs in proptest::collection::vec((any::<i32>(), any::<u16>()), 1..20),
                index in any::<proptest::sample::Index>(),
                delta in 1i32..i32::MAX,
            ) {
                let stored = list_checksum(refs.iter().copied());
                let mut changed = refs.clone();
                let i = index.index(changed.len());
                changed[i].0 = changed[i].0.wrapping_add(delta);
                prop_assert_ne!(list_checksum(changed), stored);
            }
        }
    }
}
