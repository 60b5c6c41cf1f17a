//! Newtype IDs for type-safe entity references.
//!
//! Bling identifies every entity with a positive 64-bit integer. Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing
//! IDs from different entity types and that validate untrusted input before
//! it reaches the upstream API.

use thiserror::Error;

/// Error returned when an ID cannot be parsed from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Input was empty or whitespace.
    #[error("ID is empty")]
    Empty,

    /// Input contained something other than ASCII digits.
    #[error("ID must contain only digits: {0}")]
    NotNumeric(String),

    /// Input was zero or too large for a 64-bit ID.
    #[error("ID out of range: {0}")]
    OutOfRange(String),
}

/// Parse a strictly positive integer ID.
///
/// Unlike a lenient `parseInt`, trailing garbage (`"12abc"`) and signs are
/// rejected.
///
/// # Errors
///
/// Returns `IdError` if the input is empty, non-numeric, zero, or overflows.
pub fn parse_positive_id(raw: &str) -> Result<i64, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::NotNumeric(trimmed.to_string()));
    }
    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(IdError::OutOfRange(trimmed.to_string())),
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `FromStr` with strict positive-integer validation
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use masterferri_core::define_id;
/// define_id!(ProductId);
/// define_id!(CategoryId);
///
/// let product_id: ProductId = "16219155706".parse().unwrap();
/// assert_eq!(product_id.as_i64(), 16_219_155_706);
///
/// // These are different types, so this won't compile:
/// // let _: CategoryId = product_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::parse_positive_id(s).map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let id: ProductId = "16219155706".parse().unwrap();
        assert_eq!(id.as_i64(), 16_219_155_706);
        assert_eq!(id.to_string(), "16219155706");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id, ProductId::new(42));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        let err = "12abc".parse::<ProductId>().unwrap_err();
        assert!(matches!(err, IdError::NotNumeric(_)));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert!(matches!(
            "0".parse::<ProductId>(),
            Err(IdError::OutOfRange(_))
        ));
        assert!(matches!(
            "-5".parse::<ProductId>(),
            Err(IdError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_overflow() {
        assert_eq!("".parse::<CategoryId>(), Err(IdError::Empty));
        assert!(matches!(
            "99999999999999999999".parse::<CategoryId>(),
            Err(IdError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&ProductId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(back, ProductId::new(7));
    }
}
