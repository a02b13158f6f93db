//! Declaration identifiers and storage.
//!
//! Every entity a name can denote (namespace, type, member, local,
//! parameter) is a `Declaration` in one `DeclarationStore`, whether it comes
//! from the source tree or from imported metadata. The resolver only ever
//! holds `DeclId` handles; the store owns the declarations and outlives any
//! resolution pass.
//!
//! Declaration kinds form a closed set. Resolution queries them through a
//! small capability surface (`has_parameters`, `is_static`,
//! `generic_arity`, `declaring_type`, `is_operator`) instead of per-kind
//! code paths.

use crate::types::TypeId;
use bitflags::bitflags;
use cdom_common::Atom;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// =============================================================================
// DeclId
// =============================================================================

/// Handle to a declaration in a `DeclarationStore`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Sentinel value for invalid `DeclId`.
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

// =============================================================================
// DeclKind / Modifiers
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclKind {
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Method,
    Constructor,
    /// User-defined operator overload (`operator +`).
    Operator,
    Property,
    Indexer,
    Field,
    EnumMember,
    Local,
    Parameter,
}

impl DeclKind {
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Struct | Self::Interface | Self::Enum | Self::Delegate
        )
    }

    /// Kinds that carry a parameter list.
    pub const fn has_parameters(self) -> bool {
        matches!(
            self,
            Self::Method | Self::Constructor | Self::Operator | Self::Indexer | Self::Delegate
        )
    }

    /// Kinds whose value is read like a variable.
    pub const fn is_variable(self) -> bool {
        matches!(
            self,
            Self::Field | Self::Property | Self::Local | Self::Parameter | Self::EnumMember
        )
    }

    /// Whether the declaration is a value-typed type (struct/enum).
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }

    /// Human-readable kind name used in diagnostics.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Delegate => "delegate",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Operator => "operator",
            Self::Property => "property",
            Self::Indexer => "indexer",
            Self::Field => "field",
            Self::EnumMember => "enum member",
            Self::Local => "local variable",
            Self::Parameter => "parameter",
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const STATIC = 1 << 4;
        const ABSTRACT = 1 << 5;
        const VIRTUAL = 1 << 6;
        const OVERRIDE = 1 << 7;
        const SEALED = 1 << 8;
        const READONLY = 1 << 9;
        const CONST = 1 << 10;
    }
}

impl Modifiers {
    /// Parse a modifier keyword (`"static"`, `"public"`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "public" => Self::PUBLIC,
            "private" => Self::PRIVATE,
            "protected" => Self::PROTECTED,
            "internal" => Self::INTERNAL,
            "static" => Self::STATIC,
            "abstract" => Self::ABSTRACT,
            "virtual" => Self::VIRTUAL,
            "override" => Self::OVERRIDE,
            "sealed" => Self::SEALED,
            "readonly" => Self::READONLY,
            "const" => Self::CONST,
            _ => return None,
        })
    }
}

/// Where a declaration came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum DeclOrigin {
    /// Declared in the code DOM being analyzed.
    #[default]
    Source,
    /// Imported from compiled metadata (an assembly/library).
    Metadata { library: Atom },
}

/// Parameter passing mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    #[default]
    Value,
    Ref,
    Out,
}

impl RefKind {
    /// Reference and output parameters alias caller storage.
    pub const fn is_by_ref(self) -> bool {
        matches!(self, Self::Ref | Self::Out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Atom,
    pub ty: TypeId,
    pub ref_kind: RefKind,
    /// Trailing `params T[]` parameter.
    pub is_variadic: bool,
    /// Has a default value and may be omitted.
    pub has_default: bool,
}

impl ParamDecl {
    pub fn new(name: Atom, ty: TypeId) -> Self {
        Self {
            name,
            ty,
            ref_kind: RefKind::Value,
            is_variadic: false,
            has_default: false,
        }
    }

    pub fn by_ref(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.has_default = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: Atom,
    /// Types every argument must convert to. May mention the declaration's
    /// own type parameters (`T : IComparable<T>`).
    pub constraints: Vec<TypeId>,
}

// =============================================================================
// Declaration
// =============================================================================

#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Atom,
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub origin: DeclOrigin,
    /// Enclosing declaration; `None` for the global namespace.
    pub parent: Option<DeclId>,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ParamDecl>,
    /// Variable type for fields/properties/locals/parameters, return type
    /// for methods/operators/indexers/delegates. `None` for implicitly typed
    /// locals and for declarations without a type.
    pub ty: Option<TypeId>,
    /// Declared base class and interfaces, in declaration order.
    pub base_types: Vec<TypeId>,
    /// Namespaces imported into this namespace (`using` directives).
    pub imports: Vec<DeclId>,
    members: IndexMap<Atom, SmallVec<[DeclId; 2]>>,
}

impl Declaration {
    pub fn new(name: Atom, kind: DeclKind) -> Self {
        Self {
            name,
            kind,
            modifiers: Modifiers::empty(),
            origin: DeclOrigin::Source,
            parent: None,
            type_params: Vec::new(),
            params: Vec::new(),
            ty: None,
            base_types: Vec::new(),
            imports: Vec::new(),
            members: IndexMap::new(),
        }
    }

    pub fn has_parameters(&self) -> bool {
        self.kind.has_parameters()
    }

    /// Whether the declaration is reached without an instance.
    ///
    /// Nested types, namespaces, constants and enum members are implicitly
    /// static; locals and parameters are neither and report `false`.
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
            || self.modifiers.contains(Modifiers::CONST)
            || self.kind.is_type()
            || matches!(
                self.kind,
                DeclKind::Namespace | DeclKind::EnumMember | DeclKind::Operator
            )
    }

    /// Members that require an instance.
    pub fn is_instance_member(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Method | DeclKind::Property | DeclKind::Indexer | DeclKind::Field
        ) && !self.is_static()
    }

    pub fn generic_arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_operator(&self) -> bool {
        self.kind == DeclKind::Operator
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self.origin, DeclOrigin::Metadata { .. })
    }

    pub fn variadic_param(&self) -> Option<&ParamDecl> {
        self.params.last().filter(|p| p.is_variadic)
    }

    /// Number of parameters that must be supplied.
    pub fn required_param_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.has_default && !p.is_variadic)
            .count()
    }

    pub fn members_named(&self, name: Atom) -> &[DeclId] {
        self.members.get(&name).map(|m| m.as_slice()).unwrap_or(&[])
    }

    pub fn all_members(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.members.values().flat_map(|m| m.iter().copied())
    }
}

/// Fluent construction of a `Declaration`.
///
/// ```
/// use cdom_common::Interner;
/// use cdom_types::{DeclBuilder, DeclKind, DeclarationStore, ParamDecl, TypeId};
///
/// let mut names = Interner::new();
/// let mut store = DeclarationStore::new();
/// let class = store.add(
///     DeclBuilder::new(names.intern("Program"), DeclKind::Class)
///         .parent(store.global())
///         .build(),
/// );
/// let f = store.add(
///     DeclBuilder::new(names.intern("f"), DeclKind::Method)
///         .parent(class)
///         .param(ParamDecl::new(names.intern("x"), TypeId::INT32))
///         .returns(TypeId::VOID)
///         .build(),
/// );
/// assert_eq!(store.declaring_type(f), Some(class));
/// ```
pub struct DeclBuilder {
    decl: Declaration,
}

impl DeclBuilder {
    pub fn new(name: Atom, kind: DeclKind) -> Self {
        Self {
            decl: Declaration::new(name, kind),
        }
    }

    pub fn parent(mut self, parent: DeclId) -> Self {
        self.decl.parent = Some(parent);
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.decl.modifiers |= modifiers;
        self
    }

    pub fn static_member(self) -> Self {
        self.modifiers(Modifiers::STATIC)
    }

    pub fn origin(mut self, origin: DeclOrigin) -> Self {
        self.decl.origin = origin;
        self
    }

    /// Variable type of a field/property/local/parameter.
    pub fn ty(mut self, ty: TypeId) -> Self {
        self.decl.ty = Some(ty);
        self
    }

    /// Return type of a method/operator/indexer/delegate.
    pub fn returns(self, ty: TypeId) -> Self {
        self.ty(ty)
    }

    pub fn param(mut self, param: ParamDecl) -> Self {
        self.decl.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParamDecl>) -> Self {
        self.decl.params.extend(params);
        self
    }

    pub fn type_param(mut self, name: Atom, constraints: Vec<TypeId>) -> Self {
        self.decl.type_params.push(TypeParamDecl { name, constraints });
        self
    }

    pub fn base(mut self, base: TypeId) -> Self {
        self.decl.base_types.push(base);
        self
    }

    pub fn import(mut self, namespace: DeclId) -> Self {
        self.decl.imports.push(namespace);
        self
    }

    pub fn build(self) -> Declaration {
        self.decl
    }
}

// =============================================================================
// DeclarationStore
// =============================================================================

/// Owner of every declaration, indexed by `DeclId`.
#[derive(Default)]
pub struct DeclarationStore {
    decls: Vec<Declaration>,
    global: Option<DeclId>,
}

impl DeclarationStore {
    /// Create a store whose first declaration is the unnamed global namespace.
    pub fn new() -> Self {
        let mut store = Self::default();
        let global = store.add(Declaration::new(Atom::NONE, DeclKind::Namespace));
        store.global = Some(global);
        store
    }

    pub fn global(&self) -> DeclId {
        self.global.unwrap_or(DeclId(0))
    }

    /// Register a declaration and link it into its parent's member table.
    pub fn add(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        let name = decl.name;
        let parent = decl.parent;
        self.decls.push(decl);
        if let Some(parent) = parent
            && let Some(parent_decl) = self.decls.get_mut(parent.0 as usize)
        {
            parent_decl.members.entry(name).or_default().push(id);
        }
        id
    }

    /// The id the next `add` will return. Generic declarations need it to
    /// build their own type-parameter types before they are registered.
    pub fn next_id(&self) -> DeclId {
        DeclId(self.decls.len() as u32)
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Declaration> {
        self.decls.get_mut(id.0 as usize)
    }

    pub fn contains(&self, id: DeclId) -> bool {
        (id.0 as usize) < self.decls.len()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn kind(&self, id: DeclId) -> Option<DeclKind> {
        self.get(id).map(|d| d.kind)
    }

    /// Nearest enclosing type of a declaration (not the declaration itself).
    pub fn declaring_type(&self, id: DeclId) -> Option<DeclId> {
        let mut current = self.get(id)?.parent;
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if steps > cdom_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                return None;
            }
            let decl = self.get(parent)?;
            if decl.kind.is_type() {
                return Some(parent);
            }
            current = decl.parent;
        }
        None
    }

    /// Enclosing declarations from the immediate parent outwards.
    pub fn ancestors(&self, id: DeclId) -> Vec<DeclId> {
        let mut result = Vec::new();
        let mut current = self.get(id).and_then(|d| d.parent);
        while let Some(parent) = current {
            if result.len() as u32 >= cdom_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                break;
            }
            result.push(parent);
            current = self.get(parent).and_then(|d| d.parent);
        }
        result
    }

    /// Constructors declared directly on a type.
    pub fn constructors_of(&self, type_decl: DeclId) -> Vec<DeclId> {
        let Some(decl) = self.get(type_decl) else {
            return Vec::new();
        };
        decl.all_members()
            .filter(|&m| self.kind(m) == Some(DeclKind::Constructor))
            .collect()
    }

    /// Indexers declared directly on a type.
    pub fn indexers_of(&self, type_decl: DeclId) -> Vec<DeclId> {
        let Some(decl) = self.get(type_decl) else {
            return Vec::new();
        };
        decl.all_members()
            .filter(|&m| self.kind(m) == Some(DeclKind::Indexer))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d))
    }
}

#[cfg(test)]
#[path = "../tests/decl_tests.rs"]
mod tests;
