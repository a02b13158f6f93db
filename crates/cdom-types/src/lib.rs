//! Type and declaration model for the cdom name resolver.
//!
//! - `TypeId`/`TypeData` and the `TypeInterner` that deduplicates them
//! - `Declaration`s and the `DeclarationStore` that owns them
//! - Inheritance queries (`Hierarchy`) and conversions (`TypeRelation`)
//! - Type-parameter substitution
//! - Recursion guards shared with the resolver

pub mod types;
pub use types::{DeclList, IntrinsicKind, TypeData, TypeId, TypeList, TypeParamRef};

pub mod intern;
pub use intern::TypeInterner;

pub mod decl;
pub use decl::{
    DeclBuilder, DeclId, DeclKind, DeclOrigin, Declaration, DeclarationStore, Modifiers,
    ParamDecl, RefKind, TypeParamDecl,
};

pub mod instantiate;
pub use instantiate::{
    TypeSubstitution, contains_type_parameters, contains_type_params_of, contains_unresolved,
    instantiate_type,
};

pub mod hierarchy;
pub use hierarchy::Hierarchy;

pub mod relation;
pub use relation::{Conversion, DelegateSignature, TypeRelation, is_numeric_widening};

pub mod format;
pub use format::TypeFormatter;

pub mod recursion;
pub use recursion::{CycleGuard, Denied, DepthCounter};
