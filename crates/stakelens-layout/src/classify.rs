//! Value classifier.
//!
//! Decoded integers carry no unit. The classifier annotates each integer leaf
//! with a best-effort semantic tag derived from its field name and value:
//!
//! 1. name contains `time` and the value is a plausible Unix time in seconds
//!    (strictly between [`TIMESTAMP_MIN`] and [`TIMESTAMP_MAX`]) -> [`ClassifiedValue::Timestamp`]
//! 2. name contains `amount`, `tokens`, `stake` or `claim` -> [`ClassifiedValue::TokenAmount`]
//! 3. otherwise -> [`ClassifiedValue::PlainInteger`]
//!
//! Name checks are case-insensitive. Array elements are classified under the
//! array's field name. The raw integer is always kept; callers that need exact
//! figures read `raw`, never the rendered string.

use chrono::{DateTime, SecondsFormat};
use num_bigint::BigInt;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use solana_pubkey::Pubkey;
use stakelens_numeric::{format_plain, scale_units};

use crate::DecodedValue;

/// Exclusive lower bound of the timestamp window (September 2020).
pub const TIMESTAMP_MIN: i64 = 1_600_000_000;

/// Exclusive upper bound of the timestamp window (May 2033).
pub const TIMESTAMP_MAX: i64 = 2_000_000_000;

/// Decimal count used to render token amounts.
pub const DEFAULT_AMOUNT_DECIMALS: u8 = 6;

const AMOUNT_MARKERS: [&str; 4] = ["amount", "tokens", "stake", "claim"];

/// A decoded value annotated with its inferred meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedValue {
    /// Unix time in seconds
    Timestamp {
        /// Raw integer
        raw: BigInt,
        /// ISO-8601 UTC with millisecond precision
        iso: String,
    },
    /// Token base units
    TokenAmount {
        /// Raw integer
        raw: BigInt,
        /// Human-readable decimal
        human: String,
    },
    /// Integer without a recognised unit
    PlainInteger {
        /// Raw integer
        raw: BigInt,
    },
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Public key
    PublicKey(Pubkey),
    /// Named members in declared order
    Struct(Vec<(String, ClassifiedValue)>),
    /// Array elements
    Array(Vec<ClassifiedValue>),
}

impl ClassifiedValue {
    /// Member of a struct by exact name.
    pub fn get(&self, name: &str) -> Option<&ClassifiedValue> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Raw integer of any integer tag.
    pub fn raw_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Timestamp { raw, .. } | Self::TokenAmount { raw, .. } | Self::PlainInteger { raw } => {
                Some(raw)
            }
            _ => None,
        }
    }

    /// Rendered form of an integer leaf.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Timestamp { iso, .. } => Some(iso.clone()),
            Self::TokenAmount { human, .. } => Some(human.clone()),
            Self::PlainInteger { raw } => Some(raw.to_string()),
            _ => None,
        }
    }

    /// Strip the annotations, leaving the raw tree.
    ///
    /// Non-negative integers come back as [`DecodedValue::Integer`] whatever
    /// their declared signedness.
    pub fn to_decoded(&self) -> DecodedValue {
        match self {
            Self::Timestamp { raw, .. } | Self::TokenAmount { raw, .. } | Self::PlainInteger { raw } => {
                match raw.to_biguint() {
                    Some(unsigned) => DecodedValue::Integer(unsigned),
                    None => DecodedValue::SignedInteger(raw.clone()),
                }
            }
            Self::Bytes(bytes) => DecodedValue::Bytes(bytes.clone()),
            Self::PublicKey(key) => DecodedValue::PublicKey(*key),
            Self::Struct(fields) => DecodedValue::Struct(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_decoded()))
                    .collect(),
            ),
            Self::Array(items) => DecodedValue::Array(items.iter().map(Self::to_decoded).collect()),
        }
    }
}

/// Classifies decoded trees.
#[derive(Clone, Copy, Debug)]
pub struct Classifier {
    amount_decimals: u8,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            amount_decimals: DEFAULT_AMOUNT_DECIMALS,
        }
    }
}

impl Classifier {
    /// Classifier rendering token amounts with `amount_decimals`.
    pub fn with_amount_decimals(amount_decimals: u8) -> Self {
        Self { amount_decimals }
    }

    /// Classify a tree. The root has no field name.
    pub fn classify(&self, value: &DecodedValue) -> ClassifiedValue {
        self.classify_named("", value)
    }

    /// Classify `value` as if it were stored under `name`.
    pub fn classify_named(&self, name: &str, value: &DecodedValue) -> ClassifiedValue {
        match value {
            DecodedValue::Integer(n) => self.classify_integer(name, BigInt::from(n.clone())),
            DecodedValue::SignedInteger(n) => self.classify_integer(name, n.clone()),
            DecodedValue::Bytes(bytes) => ClassifiedValue::Bytes(bytes.clone()),
            DecodedValue::PublicKey(key) => ClassifiedValue::PublicKey(*key),
            DecodedValue::Struct(fields) => ClassifiedValue::Struct(
                fields
                    .iter()
                    .map(|(member, v)| (member.clone(), self.classify_named(member, v)))
                    .collect(),
            ),
            DecodedValue::Array(items) => ClassifiedValue::Array(
                items.iter().map(|item| self.classify_named(name, item)).collect(),
            ),
        }
    }

    fn classify_integer(&self, name: &str, raw: BigInt) -> ClassifiedValue {
        let lower = name.to_ascii_lowercase();

        if lower.contains("time")
            && let Some(iso) = timestamp_iso(&raw)
        {
            return ClassifiedValue::Timestamp { raw, iso };
        }

        if AMOUNT_MARKERS.iter().any(|marker| lower.contains(marker)) {
            let human = format_plain(&scale_units(&raw, self.amount_decimals));
            return ClassifiedValue::TokenAmount { raw, human };
        }

        ClassifiedValue::PlainInteger { raw }
    }
}

/// Classify with the default amount decimals.
pub fn classify(value: &DecodedValue) -> ClassifiedValue {
    Classifier::default().classify(value)
}

fn timestamp_iso(raw: &BigInt) -> Option<String> {
    let secs = i64::try_from(raw).ok()?;
    if secs <= TIMESTAMP_MIN || secs >= TIMESTAMP_MAX {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// Serialization
// ============================================================================

/// Integer leaves serialize as `{"kind", "raw", "value"}` objects so the raw
/// figure survives next to its rendering; structs as objects in declared
/// order, public keys as base58 strings.
impl Serialize for ClassifiedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Timestamp { raw, iso } => leaf(serializer, "timestamp", raw, iso),
            Self::TokenAmount { raw, human } => leaf(serializer, "tokenAmount", raw, human),
            Self::PlainInteger { raw } => leaf(serializer, "integer", raw, &raw.to_string()),
            Self::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Self::PublicKey(key) => serializer.serialize_str(&key.to_string()),
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

fn leaf<S: Serializer>(serializer: S, kind: &str, raw: &BigInt, value: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("kind", kind)?;
    map.serialize_entry("raw", &raw.to_string())?;
    map.serialize_entry("value", value)?;
    map.end()
}
