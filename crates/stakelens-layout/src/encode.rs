//! Encoder, the inverse of [`Decoder`](crate::Decoder).

use num_bigint::Sign;

use crate::{DecodedValue, EncodeError, FieldKind, Layout, LayoutField, SchemaRegistry};

/// Encodes value trees back into account data.
#[derive(Clone, Copy, Debug)]
pub struct Encoder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Encoder<'a> {
    /// Create an encoder over `registry`.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Encode `value` (a [`DecodedValue::Struct`]) as `layout`, discriminator
    /// included.
    ///
    /// # Errors
    ///
    /// [`EncodeError`] if the value tree does not have the layout's shape or an
    /// integer does not fit its declared width.
    pub fn encode(&self, layout: &Layout, value: &DecodedValue) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        if let Some(discriminator) = layout.discriminator() {
            out.extend_from_slice(discriminator);
        }
        self.write_fields(&mut out, "", layout.fields(), value)?;
        Ok(out)
    }

    fn write_fields(
        &self,
        out: &mut Vec<u8>,
        prefix: &str,
        fields: &[LayoutField],
        value: &DecodedValue,
    ) -> Result<(), EncodeError> {
        for field in fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };
            let member = value.get(&field.name).ok_or_else(|| EncodeError::ShapeMismatch {
                field: path.clone(),
                expected: field.kind.to_string(),
            })?;
            self.write_kind(out, &path, &field.kind, member)?;
        }
        Ok(())
    }

    fn write_kind(
        &self,
        out: &mut Vec<u8>,
        path: &str,
        kind: &FieldKind,
        value: &DecodedValue,
    ) -> Result<(), EncodeError> {
        let mismatch = || EncodeError::ShapeMismatch {
            field: path.to_string(),
            expected: kind.to_string(),
        };
        let overflow = |width: usize| EncodeError::Overflow {
            field: path.to_string(),
            width,
        };

        match (kind, value) {
            (FieldKind::UInt(width), DecodedValue::Integer(n)) => {
                let mut bytes = n.to_bytes_le();
                // zero encodes as a single 0x00 byte
                if bytes.len() > *width {
                    return Err(overflow(*width));
                }
                bytes.resize(*width, 0);
                out.extend_from_slice(&bytes);
            }
            (FieldKind::Int(width), DecodedValue::SignedInteger(n)) => {
                let mut bytes = n.to_signed_bytes_le();
                if bytes.len() > *width {
                    return Err(overflow(*width));
                }
                let fill = if n.sign() == Sign::Minus { 0xff } else { 0 };
                bytes.resize(*width, fill);
                out.extend_from_slice(&bytes);
            }
            (FieldKind::Bytes(len), DecodedValue::Bytes(bytes)) if bytes.len() == *len => {
                out.extend_from_slice(bytes);
            }
            (FieldKind::PublicKeyRef, DecodedValue::PublicKey(key)) => {
                out.extend_from_slice(key.as_ref());
            }
            (FieldKind::Struct(name), DecodedValue::Struct(_)) => {
                let def = self
                    .registry
                    .type_def(name)
                    .ok_or_else(|| EncodeError::UnknownType(name.clone()))?;
                self.write_fields(out, path, def.fields(), value)?;
            }
            (FieldKind::Array(inner, len), DecodedValue::Array(items)) if items.len() == *len => {
                for (index, item) in items.iter().enumerate() {
                    self.write_kind(out, &format!("{path}[{index}]"), inner, item)?;
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}
