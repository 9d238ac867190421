//! Anchor IDL import.
//!
//! Builds a [`SchemaRegistry`] from an Anchor IDL (the `anchor-lang-idl-spec`
//! JSON format). Struct types become [`TypeDef`]s, accounts become
//! [`Layout`]s carrying the IDL discriminator.
//!
//! Only fixed-size shapes are representable. Types and accounts that use
//! `string`, `bytes`, `vec`, `option`, floats, generics or enums with data are
//! skipped and reported in [`IdlImport::skipped`]. Fieldless enums decode as
//! their one-byte variant index.

use std::collections::{HashMap, HashSet};

use anchor_lang_idl_spec::{
    Idl, IdlArrayLen, IdlDefinedFields, IdlType, IdlTypeDef, IdlTypeDefTy,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{DISCRIMINATOR_LEN, FieldKind, Layout, RegistryError, SchemaRegistry, TypeDef};

/// Errors while importing an IDL.
#[derive(Debug, Error)]
pub enum IdlError {
    /// Not a valid IDL document
    #[error("invalid IDL json: {0}")]
    Json(#[from] serde_json::Error),

    /// The IDL's definitions conflict with each other
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// An IDL entry that could not be imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Type or account name
    pub name: String,
    /// Why it was skipped
    pub reason: String,
}

/// Result of an IDL import.
#[derive(Clone, Debug)]
pub struct IdlImport {
    /// Registry holding every importable type and account
    pub registry: SchemaRegistry,
    /// Entries left out
    pub skipped: Vec<SkippedEntry>,
}

/// Parse an IDL document and import it.
///
/// # Errors
///
/// [`IdlError::Json`] for malformed documents, [`IdlError::Registry`] for
/// duplicate names.
pub fn from_idl_json(json: &str) -> Result<IdlImport, IdlError> {
    let idl: Idl = serde_json::from_str(json)?;
    from_idl(&idl)
}

/// Import an already parsed IDL.
///
/// # Errors
///
/// [`IdlError::Registry`] if the IDL declares the same name twice.
pub fn from_idl(idl: &Idl) -> Result<IdlImport, IdlError> {
    let mut registry = SchemaRegistry::new();
    let mut skipped = Vec::new();

    // fieldless enums and aliases are inlined rather than registered
    let mut inline: HashMap<&str, FieldKind> = HashMap::new();
    let mut pending: Vec<&IdlTypeDef> = Vec::new();

    for def in &idl.types {
        if !def.generics.is_empty() {
            skip(&mut skipped, &def.name, "generic type".into());
            continue;
        }
        match &def.ty {
            IdlTypeDefTy::Enum { variants } => {
                if variants.iter().all(|v| v.fields.is_none()) {
                    inline.insert(&def.name, FieldKind::U8);
                } else {
                    skip(&mut skipped, &def.name, "enum with data".into());
                }
            }
            IdlTypeDefTy::Struct { .. } | IdlTypeDefTy::Type { .. } => pending.push(def),
        }
    }

    // aliases can point at each other; resolve until nothing changes
    loop {
        let mut progressed = false;
        for def in &pending {
            if let IdlTypeDefTy::Type { alias } = &def.ty {
                if inline.contains_key(def.name.as_str()) {
                    continue;
                }
                if let Ok(kind) = convert(alias, &inline, &HashSet::new()) {
                    inline.insert(&def.name, kind);
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }

    let mut structs: Vec<&IdlTypeDef> = Vec::new();
    for def in pending {
        match &def.ty {
            IdlTypeDefTy::Type { .. } if !inline.contains_key(def.name.as_str()) => {
                skip(&mut skipped, &def.name, "unsupported alias".into());
            }
            IdlTypeDefTy::Struct { .. } => structs.push(def),
            _ => {}
        }
    }

    // register structs once their dependencies are registered
    let mut registered: HashSet<String> = HashSet::new();
    let mut rejected: HashSet<String> = HashSet::new();
    loop {
        let mut progressed = false;
        for def in &structs {
            if registered.contains(&def.name) || rejected.contains(&def.name) {
                continue;
            }
            match struct_def(def, &inline, &registered) {
                Ok(Some(type_def)) => {
                    registry.register_type(type_def)?;
                    registered.insert(def.name.clone());
                    progressed = true;
                }
                Ok(None) => {}
                Err(reason) => {
                    skip(&mut skipped, &def.name, reason);
                    rejected.insert(def.name.clone());
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    for def in &structs {
        if !registered.contains(&def.name) && !rejected.contains(&def.name) {
            skip(
                &mut skipped,
                &def.name,
                "depends on an unavailable or recursive type".into(),
            );
        }
    }

    for account in &idl.accounts {
        let Ok(discriminator) = <[u8; DISCRIMINATOR_LEN]>::try_from(account.discriminator.as_slice())
        else {
            skip(
                &mut skipped,
                &account.name,
                format!("discriminator is {} bytes", account.discriminator.len()),
            );
            continue;
        };
        let Some(def) = registry.type_def(&account.name).cloned() else {
            skip(&mut skipped, &account.name, "account type not importable".into());
            continue;
        };
        let layout = def
            .fields()
            .iter()
            .fold(Layout::new(account.name.clone()), |layout, field| {
                layout.field(field.name.clone(), field.kind.clone())
            })
            .with_discriminator(discriminator);
        debug!(layout = %account.name, fields = def.fields().len(), "imported account layout");
        registry.register(layout)?;
    }

    Ok(IdlImport { registry, skipped })
}

fn skip(skipped: &mut Vec<SkippedEntry>, name: &str, reason: String) {
    warn!(entry = %name, %reason, "skipping IDL entry");
    skipped.push(SkippedEntry {
        name: name.to_string(),
        reason,
    });
}

/// `Ok(None)` when a referenced struct is not registered yet.
fn struct_def(
    def: &IdlTypeDef,
    inline: &HashMap<&str, FieldKind>,
    registered: &HashSet<String>,
) -> Result<Option<TypeDef>, String> {
    let IdlTypeDefTy::Struct { fields } = &def.ty else {
        return Err("not a struct".into());
    };

    let members: Vec<(String, &IdlType)> = match fields {
        None => Vec::new(),
        Some(IdlDefinedFields::Named(named)) => {
            named.iter().map(|f| (f.name.clone(), &f.ty)).collect()
        }
        Some(IdlDefinedFields::Tuple(types)) => types
            .iter()
            .enumerate()
            .map(|(i, ty)| (i.to_string(), ty))
            .collect(),
    };

    let mut type_def = TypeDef::new(def.name.clone());
    for (name, ty) in members {
        match convert(ty, inline, registered) {
            Ok(kind) => type_def = type_def.field(name, kind),
            Err(Unsupported::NotYet) => return Ok(None),
            Err(Unsupported::Never(reason)) => return Err(format!("field `{name}`: {reason}")),
        }
    }
    Ok(Some(type_def))
}

enum Unsupported {
    NotYet,
    Never(&'static str),
}

fn convert(
    ty: &IdlType,
    inline: &HashMap<&str, FieldKind>,
    registered: &HashSet<String>,
) -> Result<FieldKind, Unsupported> {
    Ok(match ty {
        IdlType::Bool | IdlType::U8 => FieldKind::UInt(1),
        IdlType::I8 => FieldKind::Int(1),
        IdlType::U16 => FieldKind::UInt(2),
        IdlType::I16 => FieldKind::Int(2),
        IdlType::U32 => FieldKind::UInt(4),
        IdlType::I32 => FieldKind::Int(4),
        IdlType::U64 => FieldKind::UInt(8),
        IdlType::I64 => FieldKind::Int(8),
        IdlType::U128 => FieldKind::UInt(16),
        IdlType::I128 => FieldKind::Int(16),
        IdlType::Pubkey => FieldKind::PublicKeyRef,
        IdlType::Array(inner, IdlArrayLen::Value(len)) => {
            FieldKind::array(convert(inner, inline, registered)?, *len)
        }
        IdlType::Array(_, IdlArrayLen::Generic(_)) => {
            return Err(Unsupported::Never("generic array length"));
        }
        IdlType::Defined { name, generics } => {
            if !generics.is_empty() {
                return Err(Unsupported::Never("generic type"));
            }
            if let Some(kind) = inline.get(name.as_str()) {
                kind.clone()
            } else if registered.contains(name) {
                FieldKind::structure(name.clone())
            } else {
                return Err(Unsupported::NotYet);
            }
        }
        IdlType::F32 | IdlType::F64 => return Err(Unsupported::Never("floating point")),
        IdlType::String | IdlType::Bytes | IdlType::Vec(_) | IdlType::Option(_) => {
            return Err(Unsupported::Never("variable-length type"));
        }
        _ => return Err(Unsupported::Never("unsupported type")),
    })
}
