//! Schema registry.
//!
//! The registry is write-once: it is populated at startup (by hand, from an
//! IDL, or via [`adrena_registry`](crate::adrena_registry)) and then only read.
//! Layouts are kept in registration order, which is the order the
//! [`CandidateResolver`](crate::CandidateResolver) tries them in.
//!
//! Struct types must be registered before anything references them. This rules
//! out recursive types, so every footprint is known at registration time and
//! cached.

use std::collections::{HashMap, HashSet};

use crate::{
    DISCRIMINATOR_LEN, FieldKind, Layout, LayoutField, MAX_INT_WIDTH, PUBKEY_LEN, RegistryError,
    TypeDef,
};

/// Registered layouts and struct types.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    layouts: Vec<Layout>,
    layout_sizes: HashMap<String, usize>,
    types: HashMap<String, TypeDef>,
    type_order: Vec<String>,
    type_sizes: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateType`] if the name is taken,
    /// [`RegistryError::UnknownType`] if a field references an unregistered type.
    pub fn register_type(&mut self, def: TypeDef) -> Result<(), RegistryError> {
        if self.types.contains_key(def.name()) {
            return Err(RegistryError::DuplicateType(def.name().to_string()));
        }
        let size = self.fields_size(def.name(), def.fields())?;
        self.type_sizes.insert(def.name().to_string(), size);
        self.type_order.push(def.name().to_string());
        self.types.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Register a layout. It is appended to the try-order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateLayout`] if the name is taken,
    /// [`RegistryError::UnknownType`] if a field references an unregistered type.
    pub fn register(&mut self, layout: Layout) -> Result<(), RegistryError> {
        if self.layout_sizes.contains_key(layout.name()) {
            return Err(RegistryError::DuplicateLayout(layout.name().to_string()));
        }
        let body = self.fields_size(layout.name(), layout.fields())?;
        let prefix = if layout.discriminator().is_some() {
            DISCRIMINATOR_LEN
        } else {
            0
        };
        let size = body
            .checked_add(prefix)
            .ok_or_else(|| RegistryError::FootprintOverflow(layout.name().to_string()))?;
        self.layout_sizes.insert(layout.name().to_string(), size);
        self.layouts.push(layout);
        Ok(())
    }

    /// Append `other`'s types and layouts after the ones already registered.
    ///
    /// Returns the names left out. A name that is already taken is left out,
    /// unless it is a type identical to the registered one. A type left out
    /// because it differs also takes every entry referencing it along.
    pub fn merge(&mut self, other: &SchemaRegistry) -> Vec<String> {
        let mut left_out = Vec::new();
        let mut conflicting: HashSet<&str> = HashSet::new();

        for name in &other.type_order {
            let Some(def) = other.types.get(name) else {
                continue;
            };
            if self.types.get(name) == Some(def) {
                continue;
            }
            let clashes = self.types.contains_key(name)
                || def.fields().iter().any(|f| references(&f.kind, &conflicting));
            if clashes || self.register_type(def.clone()).is_err() {
                conflicting.insert(name.as_str());
                left_out.push(name.clone());
            }
        }

        for layout in &other.layouts {
            let clashes = self.layout_sizes.contains_key(layout.name())
                || layout.fields().iter().any(|f| references(&f.kind, &conflicting));
            if clashes || self.register(layout.clone()).is_err() {
                left_out.push(layout.name().to_string());
            }
        }
        left_out
    }

    /// All layouts in registration order.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Layout names in registration order.
    pub fn layout_names(&self) -> Vec<String> {
        self.layouts.iter().map(|l| l.name().to_string()).collect()
    }

    /// Look up a layout by name.
    pub fn layout(&self, name: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.name() == name)
    }

    /// Look up a struct type by name.
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Bytes consumed by the named layout, discriminator included.
    pub fn footprint(&self, layout: &str) -> Option<usize> {
        self.layout_sizes.get(layout).copied()
    }

    /// Bytes consumed by a single field kind.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownType`] for unregistered struct references.
    pub fn kind_size(&self, kind: &FieldKind) -> Result<usize, RegistryError> {
        self.kind_size_in("<kind>", "<kind>", kind)
    }

    pub(crate) fn type_size(&self, name: &str) -> Option<usize> {
        self.type_sizes.get(name).copied()
    }

    fn fields_size(&self, owner: &str, fields: &[LayoutField]) -> Result<usize, RegistryError> {
        fields.iter().try_fold(0usize, |total, field| {
            let size = self.kind_size_in(owner, &field.name, &field.kind)?;
            total
                .checked_add(size)
                .ok_or_else(|| RegistryError::FootprintOverflow(owner.to_string()))
        })
    }

    fn kind_size_in(
        &self,
        owner: &str,
        field: &str,
        kind: &FieldKind,
    ) -> Result<usize, RegistryError> {
        match kind {
            FieldKind::UInt(width) | FieldKind::Int(width) => {
                if *width == 0 || *width > MAX_INT_WIDTH {
                    return Err(RegistryError::InvalidWidth {
                        field: field.to_string(),
                        width: *width,
                    });
                }
                Ok(*width)
            }
            FieldKind::Bytes(len) => Ok(*len),
            FieldKind::PublicKeyRef => Ok(PUBKEY_LEN),
            FieldKind::Struct(name) => {
                self.type_sizes
                    .get(name)
                    .copied()
                    .ok_or_else(|| RegistryError::UnknownType {
                        owner: owner.to_string(),
                        name: name.clone(),
                    })
            }
            FieldKind::Array(inner, len) => self
                .kind_size_in(owner, field, inner)?
                .checked_mul(*len)
                .ok_or_else(|| RegistryError::FootprintOverflow(owner.to_string())),
        }
    }
}

fn references(kind: &FieldKind, names: &HashSet<&str>) -> bool {
    match kind {
        FieldKind::Struct(name) => names.contains(name.as_str()),
        FieldKind::Array(inner, _) => references(inner, names),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> TypeDef {
        TypeDef::new("point")
            .field("x", FieldKind::U32)
            .field("y", FieldKind::U32)
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = SchemaRegistry::new();
        registry.register(Layout::new("b")).unwrap();
        registry.register(Layout::new("a")).unwrap();
        assert_eq!(registry.layout_names(), ["b", "a"]);
    }

    #[test]
    fn test_duplicate_layout() {
        let mut registry = SchemaRegistry::new();
        registry.register(Layout::new("a")).unwrap();
        let err = registry.register(Layout::new("a")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateLayout("a".into()));
        assert_eq!(registry.layouts().len(), 1);
    }

    #[test]
    fn test_duplicate_type() {
        let mut registry = SchemaRegistry::new();
        registry.register_type(point()).unwrap();
        let err = registry.register_type(point()).unwrap_err();
        assert_eq!(err.name(), "DuplicateType");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(Layout::new("a").field("p", FieldKind::structure("point")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownType {
                owner: "a".into(),
                name: "point".into()
            }
        );
    }

    /// A type cannot reference itself because it is not registered yet.
    #[test]
    fn test_recursive_type_rejected() {
        let mut registry = SchemaRegistry::new();
        let node = TypeDef::new("node").field("next", FieldKind::structure("node"));
        assert!(registry.register_type(node).is_err());
    }

    #[test]
    fn test_footprint() {
        let mut registry = SchemaRegistry::new();
        registry.register_type(point()).unwrap();
        registry
            .register(
                Layout::new("shape")
                    .with_discriminator([1; 8])
                    .field("tag", FieldKind::U8)
                    .field("owner", FieldKind::PublicKeyRef)
                    .field("points", FieldKind::array(FieldKind::structure("point"), 3))
                    .field("pad", FieldKind::Bytes(7)),
            )
            .unwrap();
        // 8 + 1 + 32 + 3 * 8 + 7
        assert_eq!(registry.footprint("shape"), Some(72));
        assert_eq!(registry.footprint("missing"), None);
    }

    #[test]
    fn test_merge_appends_after_existing() {
        let mut base = SchemaRegistry::new();
        base.register_type(point()).unwrap();
        base.register(Layout::new("first").field("p", FieldKind::structure("point")))
            .unwrap();

        let mut extra = SchemaRegistry::new();
        extra.register_type(point()).unwrap();
        extra.register(Layout::new("first").field("n", FieldKind::U8)).unwrap();
        extra.register(Layout::new("second").field("p", FieldKind::structure("point")))
            .unwrap();

        let left_out = base.merge(&extra);
        // identical types are shared, taken layout names are not
        assert_eq!(left_out, ["first"]);
        assert_eq!(base.layout_names(), ["first", "second"]);
        assert_eq!(base.footprint("second"), Some(8));
    }

    #[test]
    fn test_merge_drops_dependents_of_conflicting_type() {
        let mut base = SchemaRegistry::new();
        base.register_type(point()).unwrap();

        let mut extra = SchemaRegistry::new();
        extra
            .register_type(TypeDef::new("point").field("x", FieldKind::U64))
            .unwrap();
        extra
            .register_type(TypeDef::new("segment").field("a", FieldKind::structure("point")))
            .unwrap();
        extra
            .register(Layout::new("path").field("s", FieldKind::array(FieldKind::structure("segment"), 2)))
            .unwrap();
        extra.register(Layout::new("flag").field("on", FieldKind::U8)).unwrap();

        let left_out = base.merge(&extra);
        assert_eq!(left_out, ["point", "segment", "path"]);
        assert_eq!(base.layout_names(), ["flag"]);
        assert_eq!(base.type_def("point"), Some(&point()));
        assert!(base.type_def("segment").is_none());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(Layout::new("a").field("n", FieldKind::UInt(0)))
            .unwrap_err();
        assert_eq!(err.name(), "InvalidWidth");
    }
}
