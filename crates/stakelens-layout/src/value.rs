//! Decoded value trees.

use num_bigint::{BigInt, BigUint};
use solana_pubkey::Pubkey;

/// A value decoded from account data.
///
/// Integers are always arbitrary precision; no field is narrowed to a native
/// integer type. Struct members keep their declared order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedValue {
    /// Unsigned integer
    Integer(BigUint),
    /// Signed integer
    SignedInteger(BigInt),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Public key
    PublicKey(Pubkey),
    /// Named members in declared order
    Struct(Vec<(String, DecodedValue)>),
    /// Array elements
    Array(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Member of a struct by exact name.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Struct members, if this is a struct.
    pub fn fields(&self) -> Option<&[(String, DecodedValue)]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Unsigned integer value.
    pub fn as_integer(&self) -> Option<&BigUint> {
        match self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Public key value.
    pub fn as_public_key(&self) -> Option<&Pubkey> {
        match self {
            Self::PublicKey(key) => Some(key),
            _ => None,
        }
    }

    /// Array elements.
    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}
