//! Wire hex codec.
//!
//! | Kind | Form | Rejected |
//! |------|------|----------|
//! | Integer | `0x0`, `0x1f` | no prefix, `0x`, uppercase, leading zeros, overflow |
//! | Bytes | `0x`, `0xdead` | no prefix, uppercase, odd length |
//!
//! Errors carry an empty field path; callers attach the field name with
//! [`DecodeResultExt::within`](crate::error::DecodeResultExt::within).

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::schema::wire::Hex;
use crate::schema::{Bytes, H256};

// ============================================================================
// Integers
// ============================================================================

/// Decodes a wire integer into an exact-width integer type.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the text is not canonical hex or the value
/// does not fit in `T`.
pub fn decode_uint<T: TryFrom<u128>>(hex: &Hex) -> Result<T> {
    let digits = digits(hex)?;
    if digits.is_empty() {
        return Err(invalid(hex, "no digits after 0x"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(invalid(hex, "leading zeros"));
    }
    if digits.len() > 32 {
        return Err(overflow::<T>(hex));
    }

    let value = u128::from_str_radix(digits, 16).map_err(|e| invalid(hex, &e.to_string()))?;
    T::try_from(value).map_err(|_| overflow::<T>(hex))
}

/// Encodes an integer as canonical wire hex.
#[inline]
#[must_use]
pub fn encode_uint(value: impl Into<u128>) -> Hex {
    Hex::from(format!("{:#x}", value.into()))
}

// ============================================================================
// Byte Strings
// ============================================================================

/// Decodes a wire byte string.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the text is not lowercase, even-length hex.
pub fn decode_bytes(hex: &Hex) -> Result<Bytes> {
    let digits = digits(hex)?;
    if digits.len() % 2 != 0 {
        return Err(invalid(hex, "odd number of hex digits"));
    }
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| invalid(hex, &e.to_string()))
}

/// Decodes a wire byte string of exactly `N` bytes.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the text is malformed or has the wrong length.
pub fn decode_fixed<const N: usize>(hex: &Hex) -> Result<[u8; N]> {
    let bytes = decode_bytes(hex)?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| invalid(hex, &format!("expected {N} bytes, got {}", bytes.len())))
}

/// Decodes a 32-byte hash.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the text is malformed or not 32 bytes long.
#[inline]
pub fn decode_h256(hex: &Hex) -> Result<H256> {
    decode_fixed::<32>(hex).map(H256::new)
}

/// Encodes bytes as wire hex.
#[inline]
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> Hex {
    Hex::from(format!("0x{}", hex::encode(bytes)))
}

/// Encodes a 32-byte hash as wire hex.
#[inline]
#[must_use]
pub fn encode_h256(hash: &H256) -> Hex {
    encode_bytes(hash.as_bytes())
}

// ============================================================================
// Helpers
// ============================================================================

/// Strips the prefix and checks the alphabet.
fn digits(hex: &Hex) -> Result<&str> {
    let digits = hex
        .as_str()
        .strip_prefix("0x")
        .ok_or_else(|| invalid(hex, "missing 0x prefix"))?;

    if let Some(bad) = digits.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        let reason = if bad.is_ascii_hexdigit() {
            "uppercase hex digits"
        } else {
            "non-hex character"
        };
        return Err(invalid(hex, reason));
    }

    Ok(digits)
}

fn invalid(hex: &Hex, reason: &str) -> Error {
    Error::decode("", format!("{reason} in {:?}", hex.as_str()))
}

fn overflow<T>(hex: &Hex) -> Error {
    let bits = std::mem::size_of::<T>() * 8;
    Error::decode("", format!("{:?} overflows {bits}-bit integer", hex.as_str()))
}

// ============================================================================
// Tests
// ============================================================================
