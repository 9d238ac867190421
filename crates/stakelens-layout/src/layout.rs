//! Record layouts and struct type definitions.

use sha2::{Digest, Sha256};

use crate::FieldKind;

/// Length of an Anchor account discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Anchor account discriminator: first 8 bytes of `sha256("account:<Name>")`.
///
/// `name` is the account's type name as it appears in the program source
/// (`"Staking"`, not `"staking"`).
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// A named field within a layout or struct type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutField {
    /// Field name as declared
    pub name: String,
    /// Wire shape
    pub kind: FieldKind,
}

impl LayoutField {
    /// Create a field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A named, ordered record layout that account data can be decoded against.
///
/// Layouts are built with the chained constructors below and become
/// immutable once handed to the registry.
///
/// ```
/// use stakelens_layout::{FieldKind, Layout};
///
/// let layout = Layout::new("position")
///     .field("owner", FieldKind::PublicKeyRef)
///     .field("amount", FieldKind::U64);
/// assert_eq!(layout.fields().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    name: String,
    discriminator: Option<[u8; DISCRIMINATOR_LEN]>,
    fields: Vec<LayoutField>,
    prefix_only: bool,
}

impl Layout {
    /// Start an empty layout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator: None,
            fields: Vec::new(),
            prefix_only: false,
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(LayoutField::new(name, kind));
        self
    }

    /// Require the data to start with `discriminator`.
    pub fn with_discriminator(mut self, discriminator: [u8; DISCRIMINATOR_LEN]) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Accept data longer than the layout's footprint.
    pub fn prefix_only(mut self) -> Self {
        self.prefix_only = true;
        self
    }

    /// Layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in wire order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Expected discriminator, if any.
    pub fn discriminator(&self) -> Option<&[u8; DISCRIMINATOR_LEN]> {
        self.discriminator.as_ref()
    }

    /// Whether trailing bytes are tolerated.
    pub fn is_prefix_only(&self) -> bool {
        self.prefix_only
    }
}

/// A named struct type referenced from layouts through [`FieldKind::Struct`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    name: String,
    fields: Vec<LayoutField>,
}

impl TypeDef {
    /// Start an empty struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(LayoutField::new(name, kind));
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in wire order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }
}
