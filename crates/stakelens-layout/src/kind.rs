//! Field kinds.

use core::fmt;

/// Size of a public key field in bytes.
pub const PUBKEY_LEN: usize = 32;

/// Largest integer width (in bytes) a field may declare.
pub const MAX_INT_WIDTH: usize = 32;

/// The wire shape of a single layout field.
///
/// Every kind has a fixed byte size that can be computed without reading
/// account data. There are no length prefixes; arrays carry their length in
/// the kind itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Unsigned little-endian integer of `width` bytes
    UInt(usize),
    /// Two's-complement little-endian integer of `width` bytes
    Int(usize),
    /// Opaque byte run of fixed length
    Bytes(usize),
    /// 32-byte public key
    PublicKeyRef,
    /// Named struct type registered with the schema registry
    Struct(String),
    /// Fixed-length array of another kind
    Array(Box<FieldKind>, usize),
}

impl FieldKind {
    /// Shorthand for `u8`.
    pub const U8: Self = Self::UInt(1);
    /// Shorthand for `u16`.
    pub const U16: Self = Self::UInt(2);
    /// Shorthand for `u32`.
    pub const U32: Self = Self::UInt(4);
    /// Shorthand for `u64`.
    pub const U64: Self = Self::UInt(8);
    /// Shorthand for `u128`.
    pub const U128: Self = Self::UInt(16);
    /// Shorthand for `i64`.
    pub const I64: Self = Self::Int(8);

    /// Reference a registered struct type.
    pub fn structure(name: impl Into<String>) -> Self {
        Self::Struct(name.into())
    }

    /// Fixed-length array of `inner`.
    pub fn array(inner: FieldKind, len: usize) -> Self {
        Self::Array(Box::new(inner), len)
    }

    /// True for `UInt` and `Int`.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::UInt(_) | Self::Int(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt(width) => write!(f, "u{}", width * 8),
            Self::Int(width) => write!(f, "i{}", width * 8),
            Self::Bytes(len) => write!(f, "bytes[{len}]"),
            Self::PublicKeyRef => f.write_str("pubkey"),
            Self::Struct(name) => f.write_str(name),
            Self::Array(inner, len) => write!(f, "[{inner}; {len}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FieldKind::U64.to_string(), "u64");
        assert_eq!(FieldKind::I64.to_string(), "i64");
        assert_eq!(
            FieldKind::array(FieldKind::structure("stakingRound"), 32).to_string(),
            "[stakingRound; 32]"
        );
    }
}
