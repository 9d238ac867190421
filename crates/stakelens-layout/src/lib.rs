//! Schema-driven decoding of Solana account data.
//!
//! Account data is a fixed-size binary blob with no self-description. This
//! crate holds the layouts that describe such blobs and the machinery to
//! decode them without knowing in advance which layout applies.
//!
//! # Pipeline
//!
//! ```text
//! SchemaRegistry ──► CandidateResolver ──► Decoder ──► DecodedValue
//!                                                           │
//!                                               Classifier  ▼
//!                                                    ClassifiedValue
//! ```
//!
//! - [`SchemaRegistry`]: write-once set of [`Layout`]s and struct [`TypeDef`]s
//! - [`Decoder`] / [`Encoder`]: layout-driven binary codec, little-endian,
//!   arbitrary-precision integers
//! - [`CandidateResolver`]: first layout that decodes wins
//! - [`Classifier`]: tags integer leaves as timestamps, token amounts or plain
//!   integers
//! - [`from_idl_json`]: registry from an Anchor IDL
//! - [`adrena_registry`]: built-in Adrena staking layouts
//!
//! # Example
//!
//! ```
//! use stakelens_layout::{CandidateResolver, FieldKind, Layout, SchemaRegistry, classify};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(Layout::new("counter").field("amount", FieldKind::U64)).unwrap();
//!
//! let resolution = CandidateResolver::new(&registry)
//!     .resolve(&2_500_000u64.to_le_bytes())
//!     .unwrap();
//! assert_eq!(resolution.layout, "counter");
//!
//! let classified = classify(&resolution.value);
//! assert_eq!(classified.get("amount").and_then(|v| v.display()), Some("2.5".into()));
//! ```

mod builtin;
mod classify;
mod decode;
mod encode;
mod error;
mod idl;
mod kind;
mod layout;
mod registry;
mod resolve;
mod value;

pub use builtin::*;
pub use classify::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use idl::*;
pub use kind::*;
pub use layout::*;
pub use registry::*;
pub use resolve::*;
pub use value::*;

pub use anchor_lang_idl_spec::Idl;
