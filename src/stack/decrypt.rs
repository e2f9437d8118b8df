//! Decryption of private stack headers.
//!
//! A stack with private access stores part of its header XORed with a
//! pseudo-random stream. The stream is seeded by a hash of the password and
//! advanced by the old Mac OS `Random` function. Without the password, the
//! seed can still be recovered by brute force over 16 bits.

use crate::common::binary::ByteRange;
use crate::common::error::{Error, Result};
use crate::common::text::{encode_mac_roman, fold};

use super::consts::{ENCODED_HEADER_LENGTH, ENCODED_HEADER_OFFSET};

/// Hash of an empty password ('Bill')
const EMPTY_PASSWORD_HASH: u32 = 0x4269_6C6C;

/// Offset of the password hash in the decoded header
const DECODED_PASSWORD_HASH_OFFSET: usize = 0x2C;

/// Offset of the user level in the stack block
const USER_LEVEL_OFFSET: usize = 0x48;

/// One step of the Mac OS pseudo-random generator (Park-Miller, 16807).
#[inline]
pub fn hash_number(x: u32) -> u32 {
    let mut result = u64::from(x) * 0x41A7;
    result += result >> 31;
    (result & 0x7FFF_FFFF) as u32
}

/// Hash of a password, as Mac OS Roman bytes.
pub fn hash_password(password: &[u8]) -> u32 {
    let first = password.first().map_or(0u32, |&c| u32::from(c));
    let mut s = first + password.len() as u32;
    if s > 0xFF {
        s &= 0xFF;
    } else if first > 0x80 {
        s |= 0xFFFF_FF00;
    }

    let mut x: u64 = 0;
    for &character in password {
        for bit in 0..8 {
            s = hash_number(s);
            if (character >> (7 - bit)) & 1 != 0 {
                x += u64::from(s);
            }
        }
    }

    if x == 0 {
        return EMPTY_PASSWORD_HASH;
    }
    (x & 0xFFFF_FFFF) as u32
}

/// XOR the encoded header range with the stream following `seed`, one
/// 32-bit value every 2 bytes.
///
/// With `advance_first` the stream value is advanced before each XOR,
/// otherwise after it.
fn xor_stream(encoded: &[u8], seed: u32, advance_first: bool) -> Vec<u8> {
    let mut data = encoded.to_vec();
    let mut x = seed;
    let mut i = 0;
    while i + 4 <= data.len() {
        if advance_first {
            x = hash_number(x);
        }
        for (k, byte) in x.to_be_bytes().iter().enumerate() {
            data[i + k] ^= byte;
        }
        if !advance_first {
            x = hash_number(x);
        }
        i += 2;
    }
    data
}

/// The encrypted bytes of the stack block.
fn encoded_header(stack: &ByteRange) -> Result<&[u8]> {
    stack.read_bytes(ENCODED_HEADER_OFFSET, ENCODED_HEADER_LENGTH)
}

/// Decode the header with the hash of a password, without checking it.
pub fn decode_header(stack: &ByteRange, password_hash: u32) -> Result<Vec<u8>> {
    let mut x = password_hash;
    for _ in 0..10 {
        x = hash_number(x);
    }
    Ok(xor_stream(encoded_header(stack)?, x, true))
}

/// Decrypt the header with a password.
///
/// The password is compared without case or accents. The decoded header
/// holds the hash of the first hash, which tells whether the password was
/// right.
pub fn decrypt_with_password(stack: &ByteRange, password: &str) -> Result<Vec<u8>> {
    let folded = encode_mac_roman(&fold(password));
    let first_hash = hash_password(&folded);
    let decoded = decode_header(stack, first_hash)?;

    let expected = hash_password(&first_hash.to_be_bytes());
    let stored = ByteRange::new(decoded.clone()).read_u32(DECODED_PASSWORD_HASH_OFFSET)?;
    if stored != expected {
        return Err(Error::WrongPassword);
    }
    Ok(decoded)
}

/// Recover the header without the password.
///
/// The first encoded word is the stack size XORed with `x ^ (hash(x) >> 16)`
/// where `x` is the first stream value. Its high 16 bits are known, the low
/// ones are tried one by one; the user level, which must be 0 to 5, tells a
/// good candidate.
pub fn hack_header(stack: &ByteRange) -> Result<Option<Vec<u8>>> {
    let xored = stack.read_u32(ENCODED_HEADER_OFFSET)?;
    let stack_size = stack.read_u32(0)?;
    let xor = xored ^ stack_size;
    let high = xor & 0xFFFF_0000;
    let xored_user_level = stack.read_u16(USER_LEVEL_OFFSET)?;

    for low in 0..u32::from(u16::MAX) {
        let candidate = high | low;
        if candidate ^ (hash_number(candidate) >> 16) != xor {
            continue;
        }
        let mut hash = candidate;
        for _ in 0..23 {
            hash = hash_number(hash);
        }
        let user_level = xored_user_level ^ (hash & 0xFFFF) as u16;
        if user_level <= 5 {
            log::debug!("Recovered the header key of a private stack");
            return Ok(Some(xor_stream(encoded_header(stack)?, candidate, false)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a 0x4C-byte stack block start whose header is encrypted with `password`.
    fn encrypted_stack(password: &str, user_level: u16) -> (Vec<u8>, Vec<u8>) {
        let mut plain = vec![0u8; 0x4C];
        plain[0..4].copy_from_slice(&0x800u32.to_be_bytes()); // stack block size
        plain[0x18..0x1C].copy_from_slice(&0x800u32.to_be_bytes()); // total size, same
        plain[0x48..0x4A].copy_from_slice(&user_level.to_be_bytes());

        let first_hash = hash_password(&encode_mac_roman(&fold(password)));
        let password_hash = hash_password(&first_hash.to_be_bytes());
        plain[0x44..0x48].copy_from_slice(&password_hash.to_be_bytes());

        // XOR is its own inverse
        let decoded = plain[0x18..0x4A].to_vec();
        let stack = ByteRange::new(plain.clone());
        let encoded = decode_header(&stack, first_hash).unwrap();
        let mut file = plain;
        file[0x18..0x4A].copy_from_slice(&encoded);
        (file, decoded)
    }

    #[test]
    fn test_hash_number() {
        assert_eq!(hash_number(1), 16807);
        assert_eq!(hash_number(0), 0);
        assert!(hash_number(0xFFFF_FFFF) <= 0x7FFF_FFFF);
    }

    #[test]
    fn test_hash_empty_password() {
        assert_eq!(hash_password(b""), EMPTY_PASSWORD_HASH);
        assert_ne!(hash_password(b"secret"), hash_password(b"secreT"));
    }

    #[test]
    fn test_decrypt_with_password() {
        let (file, decoded) = encrypted_stack("Sésame", 3);
        let stack = ByteRange::new(file);
        // Case and accents are ignored
        assert_eq!(decrypt_with_password(&stack, "sesame").unwrap(), decoded);
        assert_eq!(decrypt_with_password(&stack, "SÉSAME").unwrap(), decoded);
        assert_eq!(
            decrypt_with_password(&stack, "open"),
            Err(Error::WrongPassword)
        );
    }

    #[test]
    fn test_hack_header() {
        let (file, decoded) = encrypted_stack("hidden", 2);
        let stack = ByteRange::new(file);
        assert_eq!(hack_header(&stack).unwrap(), Some(decoded));
    }

    #[test]
    fn test_short_stack_block() {
        let stack = ByteRange::new(vec![0u8; 0x20]);
        assert!(decode_header(&stack, 1).is_err());
    }
}
