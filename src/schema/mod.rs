//! Record shapes on both sides of the bridge.
//!
//! | Module | Side | Conventions |
//! |--------|------|-------------|
//! | [`wire`] | JSON-RPC callers | snake_case, `0x` hex integers and bytes |
//! | [`domain`] | In-page client API | camelCase, native integers, raw bytes |
//! | [`primitives`] | Domain | [`Bytes`], [`H256`], big integer encoding |
//!
//! The two sides describe the same entities but never share a type. Conversion
//! between them lives in [`crate::transform`].

// ============================================================================
// Macros
// ============================================================================

/// Declares a closed string enum.
///
/// Generates the enum, an exhaustive `as_str`, a `FromStr` whose error names
/// `$field`, and serde impls using the given spellings. Unknown spellings
/// are always rejected.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $field:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $spelling:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the spelling used on this side of the bridge.
            #[inline]
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $spelling),+
                }
            }

            fn unknown(value: &str) -> String {
                format!(
                    "unknown {} {:?}, expected one of {}",
                    $field,
                    value,
                    [$($spelling),+].join(", ")
                )
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(value: &str) -> crate::error::Result<Self> {
                match value {
                    $($spelling => Ok(Self::$variant),)+
                    other => Err(crate::error::Error::decode($field, Self::unknown(other))),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                match value.as_ref() {
                    $($spelling => Ok(Self::$variant),)+
                    other => Err(serde::de::Error::custom(Self::unknown(other))),
                }
            }
        }
    };
}

// ============================================================================
// Submodules
// ============================================================================

/// Domain-side primitives.
pub mod primitives;

/// Wire (JSON-RPC) records.
pub mod wire;

/// Domain (in-page API) records.
pub mod domain;

// ============================================================================
// Re-exports
// ============================================================================

pub use primitives::{Bytes, H256};
