//! Registry, decode and encode error types.

use thiserror::Error;

use crate::DISCRIMINATOR_LEN;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Error, strum::IntoStaticStr)]
pub enum RegistryError {
    /// A layout with this name is already registered
    #[error("layout `{0}` is already registered")]
    DuplicateLayout(String),

    /// A struct type with this name is already registered
    #[error("type `{0}` is already registered")]
    DuplicateType(String),

    /// A field references a struct type that has not been registered yet
    #[error("`{owner}` references unknown type `{name}`")]
    UnknownType {
        /// Layout or type holding the reference
        owner: String,
        /// Missing type name
        name: String,
    },

    /// An integer field declares an unsupported width
    #[error("field `{field}` has unsupported integer width {width}")]
    InvalidWidth {
        /// Offending field
        field: String,
        /// Declared width in bytes
        width: usize,
    },

    /// Footprint does not fit in `usize`
    #[error("footprint of `{0}` overflows")]
    FootprintOverflow(String),
}

impl RegistryError {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Structural failures while decoding account data against a layout.
#[derive(Clone, Debug, PartialEq, Eq, Error, strum::IntoStaticStr)]
pub enum DecodeError {
    /// Fewer bytes remain than the next field needs
    #[error("truncated input at `{field}`: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        /// Dotted path of the field being read
        field: String,
        /// Bytes the field needs
        needed: usize,
        /// Bytes left in the input
        remaining: usize,
    },

    /// Input is longer than a strict layout's footprint
    #[error("layout `{layout}` consumed {consumed} of {total} bytes")]
    TrailingBytes {
        /// Layout name
        layout: String,
        /// Bytes read
        consumed: usize,
        /// Input length
        total: usize,
    },

    /// Leading bytes are not the layout's discriminator
    #[error("discriminator mismatch for `{layout}`: expected {expected:?}, found {found:?}")]
    DiscriminatorMismatch {
        /// Layout name
        layout: String,
        /// Expected discriminator
        expected: [u8; DISCRIMINATOR_LEN],
        /// Bytes actually present
        found: Vec<u8>,
    },

    /// A `Struct` kind names a type the registry does not know
    #[error("unknown type `{0}`")]
    UnknownType(String),
}

impl DecodeError {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Failures while encoding a value tree back to bytes.
#[derive(Clone, Debug, PartialEq, Eq, Error, strum::IntoStaticStr)]
pub enum EncodeError {
    /// Value shape does not match the declared kind
    #[error("field `{field}`: expected {expected}")]
    ShapeMismatch {
        /// Dotted path of the field
        field: String,
        /// Declared kind
        expected: String,
    },

    /// Integer does not fit in the declared width
    #[error("field `{field}`: value does not fit in {width} bytes")]
    Overflow {
        /// Dotted path of the field
        field: String,
        /// Declared width in bytes
        width: usize,
    },

    /// A `Struct` kind names a type the registry does not know
    #[error("unknown type `{0}`")]
    UnknownType(String),
}

impl EncodeError {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
