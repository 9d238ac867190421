//! Binary decoder.
//!
//! Reads fields strictly in declared order, consuming exactly the width each
//! [`FieldKind`] implies. Integers are little-endian and decoded into
//! arbitrary-precision values.

use num_bigint::{BigInt, BigUint};
use solana_pubkey::Pubkey;

use crate::{
    DISCRIMINATOR_LEN, DecodeError, DecodedValue, FieldKind, Layout, LayoutField, PUBKEY_LEN,
    RegistryError, SchemaRegistry,
};

/// Decodes account data against layouts of a registry.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'a> {
    registry: &'a SchemaRegistry,
}

struct Cursor<'d> {
    data: &'d [u8],
    offset: usize,
}

impl<'d> Cursor<'d> {
    fn new(data: &'d [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, path: &str, needed: usize) -> Result<&'d [u8], DecodeError> {
        if needed > self.remaining() {
            return Err(DecodeError::TruncatedInput {
                field: path.to_string(),
                needed,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(bytes)
    }
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `registry`.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Decode `bytes` as `layout`, returning a [`DecodedValue::Struct`].
    ///
    /// # Errors
    ///
    /// - [`DecodeError::DiscriminatorMismatch`] if the layout has a
    ///   discriminator and the data does not start with it
    /// - [`DecodeError::TruncatedInput`] if the data ends before a field
    /// - [`DecodeError::TrailingBytes`] if bytes are left over and the layout
    ///   is not prefix-only
    /// - [`DecodeError::UnknownType`] if a struct type is missing
    pub fn decode(&self, layout: &Layout, bytes: &[u8]) -> Result<DecodedValue, DecodeError> {
        let mut cursor = Cursor::new(bytes);

        if let Some(expected) = layout.discriminator() {
            let found = cursor.take("discriminator", DISCRIMINATOR_LEN)?;
            if found != expected {
                return Err(DecodeError::DiscriminatorMismatch {
                    layout: layout.name().to_string(),
                    expected: *expected,
                    found: found.to_vec(),
                });
            }
        }

        let value = self.read_fields(&mut cursor, "", layout.fields())?;

        if cursor.remaining() > 0 && !layout.is_prefix_only() {
            return Err(DecodeError::TrailingBytes {
                layout: layout.name().to_string(),
                consumed: cursor.offset,
                total: bytes.len(),
            });
        }

        Ok(value)
    }

    fn read_fields(
        &self,
        cursor: &mut Cursor<'_>,
        prefix: &str,
        fields: &[LayoutField],
    ) -> Result<DecodedValue, DecodeError> {
        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };
            let value = self.read_kind(cursor, &path, &field.kind)?;
            members.push((field.name.clone(), value));
        }
        Ok(DecodedValue::Struct(members))
    }

    fn read_kind(
        &self,
        cursor: &mut Cursor<'_>,
        path: &str,
        kind: &FieldKind,
    ) -> Result<DecodedValue, DecodeError> {
        match kind {
            FieldKind::UInt(width) => {
                let bytes = cursor.take(path, *width)?;
                Ok(DecodedValue::Integer(BigUint::from_bytes_le(bytes)))
            }
            FieldKind::Int(width) => {
                let bytes = cursor.take(path, *width)?;
                Ok(DecodedValue::SignedInteger(BigInt::from_signed_bytes_le(
                    bytes,
                )))
            }
            FieldKind::Bytes(len) => Ok(DecodedValue::Bytes(cursor.take(path, *len)?.to_vec())),
            FieldKind::PublicKeyRef => {
                let bytes = cursor.take(path, PUBKEY_LEN)?;
                let mut key = [0u8; PUBKEY_LEN];
                key.copy_from_slice(bytes);
                Ok(DecodedValue::PublicKey(Pubkey::new_from_array(key)))
            }
            FieldKind::Struct(name) => {
                let def = self
                    .registry
                    .type_def(name)
                    .ok_or_else(|| DecodeError::UnknownType(name.clone()))?;
                // fail early instead of partially reading a struct that cannot fit
                if let Some(size) = self.registry.type_size(name)
                    && size > cursor.remaining()
                {
                    return Err(DecodeError::TruncatedInput {
                        field: path.to_string(),
                        needed: size,
                        remaining: cursor.remaining(),
                    });
                }
                self.read_fields(cursor, path, def.fields())
            }
            FieldKind::Array(inner, len) => {
                // the declared length is untrusted until the bytes are known to be there
                let needed = match self.registry.kind_size(kind) {
                    Ok(size) => size,
                    Err(RegistryError::UnknownType { name, .. }) => {
                        return Err(DecodeError::UnknownType(name));
                    }
                    Err(_) => usize::MAX,
                };
                if needed > cursor.remaining() {
                    return Err(DecodeError::TruncatedInput {
                        field: path.to_string(),
                        needed,
                        remaining: cursor.remaining(),
                    });
                }
                let mut items = Vec::with_capacity((*len).min(cursor.remaining()));
                for index in 0..*len {
                    let item_path = format!("{path}[{index}]");
                    items.push(self.read_kind(cursor, &item_path, inner)?);
                }
                Ok(DecodedValue::Array(items))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use borsh::BorshSerialize;

    use super::*;
    use crate::TypeDef;

    #[derive(BorshSerialize)]
    struct Round {
        start_time: i64,
        rate: u64,
    }

    #[derive(BorshSerialize)]
    struct Record {
        tag: u8,
        amount: u64,
        owner: [u8; 32],
        rounds: [Round; 2],
        delta: i32,
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register_type(
                TypeDef::new("round")
                    .field("startTime", FieldKind::I64)
                    .field("rate", FieldKind::U64),
            )
            .unwrap();
        registry
            .register(
                Layout::new("record")
                    .field("tag", FieldKind::U8)
                    .field("amount", FieldKind::U64)
                    .field("owner", FieldKind::PublicKeyRef)
                    .field("rounds", FieldKind::array(FieldKind::structure("round"), 2))
                    .field("delta", FieldKind::Int(4)),
            )
            .unwrap();
        registry
    }

    fn record_bytes() -> Vec<u8> {
        borsh::to_vec(&Record {
            tag: 7,
            amount: u64::MAX,
            owner: [9; 32],
            rounds: [
                Round {
                    start_time: 1_700_000_000,
                    rate: 5,
                },
                Round {
                    start_time: -1,
                    rate: 6,
                },
            ],
            delta: -42,
        })
        .unwrap()
    }

    #[test]
    fn test_decode_record() {
        let registry = registry();
        let layout = registry.layout("record").unwrap();
        let value = Decoder::new(&registry).decode(layout, &record_bytes()).unwrap();

        assert_eq!(value.get("tag").unwrap().as_integer(), Some(&BigUint::from(7u8)));
        assert_eq!(
            value.get("amount").unwrap().as_integer(),
            Some(&BigUint::from(u64::MAX))
        );
        assert_eq!(
            value.get("owner").unwrap().as_public_key(),
            Some(&Pubkey::new_from_array([9; 32]))
        );
        assert_eq!(
            value.get("delta").unwrap(),
            &DecodedValue::SignedInteger(BigInt::from(-42))
        );

        let rounds = value.get("rounds").unwrap().as_array().unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(
            rounds[1].get("startTime").unwrap(),
            &DecodedValue::SignedInteger(BigInt::from(-1))
        );
        assert_eq!(
            rounds[1].get("rate").unwrap().as_integer(),
            Some(&BigUint::from(6u8))
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let registry = registry();
        let layout = registry.layout("record").unwrap();
        let decoder = Decoder::new(&registry);
        let bytes = record_bytes();
        assert_eq!(
            decoder.decode(layout, &bytes).unwrap(),
            decoder.decode(layout, &bytes).unwrap()
        );
    }

    #[test]
    fn test_truncated_reports_field_path() {
        let registry = registry();
        let layout = registry.layout("record").unwrap();
        let bytes = record_bytes();
        // cut inside the second round
        let cut = 1 + 8 + 32 + 16 + 4;
        let err = Decoder::new(&registry)
            .decode(layout, &bytes[..cut])
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                field: "rounds".into(),
                needed: 32,
                remaining: 20,
            }
        );

        // cut inside the trailing scalar
        let cut = bytes.len() - 2;
        let err = Decoder::new(&registry)
            .decode(layout, &bytes[..cut])
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                field: "delta".into(),
                needed: 4,
                remaining: 2,
            }
        );
    }

    /// A declared array length far beyond the data is rejected before any
    /// element is read or allocated.
    #[test]
    fn test_oversized_array_rejected_up_front() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(Layout::new("blob").field("data", FieldKind::array(FieldKind::U8, 1 << 40)))
            .unwrap();
        let layout = registry.layout("blob").unwrap();

        let err = Decoder::new(&registry).decode(layout, &[0; 8]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                field: "data".into(),
                needed: 1 << 40,
                remaining: 8,
            }
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let registry = registry();
        let layout = registry.layout("record").unwrap();
        let mut bytes = record_bytes();
        let total = bytes.len() + 3;
        bytes.extend_from_slice(&[0, 0, 0]);
        let err = Decoder::new(&registry).decode(layout, &bytes).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TrailingBytes {
                layout: "record".into(),
                consumed: total - 3,
                total,
            }
        );
    }

    #[test]
    fn test_prefix_only_tolerates_trailing() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(Layout::new("head").field("tag", FieldKind::U8).prefix_only())
            .unwrap();
        let layout = registry.layout("head").unwrap();
        let value = Decoder::new(&registry).decode(layout, &[3, 1, 2, 3]).unwrap();
        assert_eq!(value.get("tag").unwrap().as_integer(), Some(&BigUint::from(3u8)));
    }

    #[test]
    fn test_discriminator_mismatch() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                Layout::new("tagged")
                    .with_discriminator([1, 2, 3, 4, 5, 6, 7, 8])
                    .field("n", FieldKind::U8),
            )
            .unwrap();
        let layout = registry.layout("tagged").unwrap();
        let decoder = Decoder::new(&registry);

        let ok = decoder.decode(layout, &[1, 2, 3, 4, 5, 6, 7, 8, 42]).unwrap();
        assert_eq!(ok.get("n").unwrap().as_integer(), Some(&BigUint::from(42u8)));

        let err = decoder
            .decode(layout, &[0, 2, 3, 4, 5, 6, 7, 8, 42])
            .unwrap_err();
        assert_eq!(err.name(), "DiscriminatorMismatch");

        let err = decoder.decode(layout, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.name(), "TruncatedInput");
    }

    #[test]
    fn test_wide_integer_beyond_u128() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(Layout::new("wide").field("n", FieldKind::UInt(32)))
            .unwrap();
        let layout = registry.layout("wide").unwrap();
        let value = Decoder::new(&registry).decode(layout, &[0xff; 32]).unwrap();
        let expected = (BigUint::from(1u8) << 256u32) - 1u8;
        assert_eq!(value.get("n").unwrap().as_integer(), Some(&expected));
    }
}
