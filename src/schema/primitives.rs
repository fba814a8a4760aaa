//! Domain-side primitive values.
//!
//! The in-page client works with JavaScript `BigInt`s and byte sequences. JSON
//! carries neither, so domain values use these encodings on their way to and
//! from the page:
//!
//! | Rust | Sent to page | Accepted from page |
//! |------|--------------|--------------------|
//! | integer fields | `{"$bigint": "0x1f"}` | tagged, `"0x1f"`, `"31"`, `31` |
//! | [`Bytes`], [`H256`] | `"0x…"` | `"0x…"` |
//! | absent positional argument | `{"$undefined": true}` | — |
//!
//! The browser agent revives the tagged forms into `BigInt` and `undefined`
//! before calling into the client, and tags `BigInt` results on the way back.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Constants
// ============================================================================

/// Object key marking a big integer.
pub const BIGINT_TAG: &str = "$bigint";

/// Object key marking an absent (`undefined`) positional argument.
pub const UNDEFINED_TAG: &str = "$undefined";

/// Returns the value standing in for a JavaScript `undefined` argument.
#[must_use]
pub fn undefined() -> Value {
    let mut map = Map::new();
    map.insert(UNDEFINED_TAG.to_string(), Value::Bool(true));
    Value::Object(map)
}

// ============================================================================
// Bytes
// ============================================================================

/// An owned byte string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wraps raw bytes.
    #[inline]
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes(0x{})", hex::encode(&self.0))
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_prefixed(&text).map(Self).map_err(D::Error::custom)
    }
}

// ============================================================================
// H256
// ============================================================================

/// A 32-byte hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct H256([u8; 32]);

impl H256 {
    /// Wraps a raw hash.
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw hash bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for H256 {
    type Error = String;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 32]>::try_from(bytes)
            .map(Self)
            .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode_prefixed(&text).map_err(D::Error::custom)?;
        Self::try_from(bytes.as_slice()).map_err(D::Error::custom)
    }
}

/// Decodes `0x`-prefixed hex coming back from the page.
fn decode_prefixed(text: &str) -> Result<Vec<u8>, String> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| format!("expected 0x-prefixed hex, got {text:?}"))?;
    hex::decode(digits).map_err(|e| format!("invalid hex {text:?}: {e}"))
}

// ============================================================================
// Big Integers
// ============================================================================

/// Integer types that travel to the page as `BigInt`.
pub trait JsInteger: Copy + Into<u128> + TryFrom<u128> {}

impl JsInteger for u8 {}
impl JsInteger for u16 {}
impl JsInteger for u32 {}
impl JsInteger for u64 {}
impl JsInteger for u128 {}

/// Newtype carrying the big integer encoding.
///
/// Used where a `with` attribute cannot reach, e.g. inside tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsInt<T>(pub T);

impl<T: JsInteger> Serialize for JsInt<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bigint::serialize(&self.0, serializer)
    }
}

impl<'de, T: JsInteger> Deserialize<'de> for JsInt<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bigint::deserialize(deserializer).map(Self)
    }
}

/// Serde adapters for integer fields of domain records.
///
/// ```ignore
/// #[serde(with = "bigint")]
/// capacity: u64,
/// #[serde(with = "bigint::option", default, skip_serializing_if = "Option::is_none")]
/// cycles: Option<u64>,
/// ```
pub mod bigint {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{BIGINT_TAG, JsInteger};

    /// Shapes accepted from the page.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Tagged {
            #[serde(rename = "$bigint")]
            value: String,
        },
        Number(u64),
        Text(String),
    }

    /// Serializes an integer as a tagged big integer.
    pub fn serialize<T: JsInteger, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let raw: u128 = (*value).into();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(BIGINT_TAG, &format!("{raw:#x}"))?;
        map.end()
    }

    /// Deserializes an integer from any accepted shape.
    pub fn deserialize<'de, T: JsInteger, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<T, D::Error> {
        let raw = match Repr::deserialize(deserializer)? {
            Repr::Number(n) => u128::from(n),
            Repr::Tagged { value } | Repr::Text(value) => parse(&value).map_err(D::Error::custom)?,
        };
        T::try_from(raw).map_err(|_| D::Error::custom(format!("integer {raw} out of range")))
    }

    fn parse(text: &str) -> Result<u128, String> {
        let parsed = match text.strip_prefix("0x") {
            Some(digits) => u128::from_str_radix(digits, 16),
            None => text.parse::<u128>(),
        };
        parsed.map_err(|e| format!("invalid integer {text:?}: {e}"))
    }

    /// Adapters for `Option<T>` fields.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use crate::schema::primitives::{JsInt, JsInteger};

        /// Serializes `Some` as a tagged big integer and `None` as `null`.
        pub fn serialize<T: JsInteger, S: Serializer>(
            value: &Option<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(JsInt).serialize(serializer)
        }

        /// Deserializes an optional integer; `null` is `None`.
        pub fn deserialize<'de, T: JsInteger, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<T>, D::Error> {
            Ok(Option::<JsInt<T>>::deserialize(deserializer)?.map(|v| v.0))
        }
    }

    /// Adapters for `[T; 2]` range fields.
    pub mod range {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use crate::schema::primitives::{JsInt, JsInteger};

        /// Serializes both bounds as tagged big integers.
        pub fn serialize<T: JsInteger, S: Serializer>(
            value: &[T; 2],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            [JsInt(value[0]), JsInt(value[1])].serialize(serializer)
        }

        /// Deserializes a two-element range.
        pub fn deserialize<'de, T: JsInteger, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<[T; 2], D::Error> {
            let [start, end] = <[JsInt<T>; 2]>::deserialize(deserializer)?;
            Ok([start.0, end.0])
        }
    }

    /// Adapters for `Option<[T; 2]>` range fields.
    pub mod option_range {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use crate::schema::primitives::{JsInt, JsInteger};

        /// Serializes a present range as tagged big integers.
        pub fn serialize<T: JsInteger, S: Serializer>(
            value: &Option<[T; 2]>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value
                .map(|[start, end]| [JsInt(start), JsInt(end)])
                .serialize(serializer)
        }

        /// Deserializes an optional two-element range.
        pub fn deserialize<'de, T: JsInteger, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<[T; 2]>, D::Error> {
            let range = Option::<[JsInt<T>; 2]>::deserialize(deserializer)?;
            Ok(range.map(|[start, end]| [start.0, end.0]))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "bigint")]
        capacity: u64,
        #[serde(with = "bigint::option", default)]
        cycles: Option<u64>,
        #[serde(with = "bigint::range")]
        range: [u64; 2],
    }

    #[test]
    fn test_bigint_serializes_tagged() {
        let sample = Sample {
            capacity: 255,
            cycles: None,
            range: [0, 16],
        };
        let value = serde_json::to_value(&sample).expect("serialize");
        assert_eq!(
            value,
            json!({
                "capacity": {"$bigint": "0xff"},
                "cycles": null,
                "range": [{"$bigint": "0x0"}, {"$bigint": "0x10"}],
            })
        );
    }

    #[test]
    fn test_bigint_accepts_every_page_shape() {
        let value = json!({
            "capacity": "0xff",
            "cycles": {"$bigint": "0x10"},
            "range": [3, "12"],
        });
        let sample: Sample = serde_json::from_value(value).expect("parse");
        assert_eq!(sample.capacity, 255);
        assert_eq!(sample.cycles, Some(16));
        assert_eq!(sample.range, [3, 12]);
    }

    #[test]
    fn test_bigint_rejects_out_of_range() {
        let value = json!({"capacity": "0x10000000000000000", "range": [0, 0]});
        assert!(serde_json::from_value::<Sample>(value).is_err());
    }

    #[test]
    fn test_bytes_hex() {
        let bytes = Bytes::new(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_value(&bytes).expect("serialize"), json!("0xdead"));

        let empty: Bytes = serde_json::from_value(json!("0x")).expect("parse");
        assert!(empty.is_empty());
        assert!(serde_json::from_value::<Bytes>(json!("dead")).is_err());
    }

    #[test]
    fn test_h256_requires_32_bytes() {
        let hash = format!("0x{}", "ab".repeat(32));
        let parsed: H256 = serde_json::from_value(json!(hash)).expect("parse");
        assert_eq!(parsed.as_bytes(), &[0xab; 32]);
        assert_eq!(parsed.to_string(), hash);

        assert!(serde_json::from_value::<H256>(json!("0xabcd")).is_err());
    }

    #[test]
    fn test_undefined_marker() {
        assert_eq!(undefined(), json!({"$undefined": true}));
    }
}
