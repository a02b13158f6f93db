//! Interned type representation.
//!
//! Types are immutable values identified by `TypeId`. Two structurally equal
//! types always intern to the same id, so type identity (the test reference
//! and output parameters require) is an integer comparison.

use crate::decl::DeclId;
use cdom_common::Atom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The type of an expression that could not be determined at all.
    pub const UNDETERMINED: TypeId = TypeId(0);
    /// The universal top type; everything except `void` converts to it.
    pub const OBJECT: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    /// The type of the `null` literal.
    pub const NULL: TypeId = TypeId(3);
    pub const BOOL: TypeId = TypeId(4);
    pub const CHAR: TypeId = TypeId(5);
    pub const INT8: TypeId = TypeId(6);
    pub const UINT8: TypeId = TypeId(7);
    pub const INT16: TypeId = TypeId(8);
    pub const UINT16: TypeId = TypeId(9);
    pub const INT32: TypeId = TypeId(10);
    pub const UINT32: TypeId = TypeId(11);
    pub const INT64: TypeId = TypeId(12);
    pub const UINT64: TypeId = TypeId(13);
    pub const FLOAT32: TypeId = TypeId(14);
    pub const FLOAT64: TypeId = TypeId(15);
    pub const DECIMAL: TypeId = TypeId(16);
    pub const STRING: TypeId = TypeId(17);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 18;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// Built-in types known to the resolver without any declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntrinsicKind {
    Undetermined,
    Object,
    Void,
    Null,
    Bool,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    String,
}

impl IntrinsicKind {
    /// All intrinsics, in `TypeId` order.
    pub const ALL: [IntrinsicKind; TypeId::FIRST_USER as usize] = [
        Self::Undetermined,
        Self::Object,
        Self::Void,
        Self::Null,
        Self::Bool,
        Self::Char,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Decimal,
        Self::String,
    ];

    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Undetermined => "?",
            Self::Object => "object",
            Self::Void => "void",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Int8 => "sbyte",
            Self::UInt8 => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.keyword() == keyword)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float32
                | Self::Float64
                | Self::Decimal
        )
    }

    /// Whether values of this type are references (and so accept `null`).
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Object | Self::String | Self::Null)
    }
}

/// A type parameter, identified by its owning generic declaration and its
/// position in that declaration's type-parameter list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParamRef {
    pub owner: DeclId,
    pub index: u32,
}

pub type TypeList = SmallVec<[TypeId; 4]>;
pub type DeclList = SmallVec<[DeclId; 4]>;

/// Structural type data stored behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    /// A non-generic type declaration, or an open generic one.
    Declared(DeclId),
    /// A generic declaration applied to type arguments (`List<int>`).
    Application { base: DeclId, args: TypeList },
    /// An array with the given rank (`int[]` has rank 1, `int[,]` rank 2).
    Array { element: TypeId, rank: u32 },
    TypeParameter(TypeParamRef),
    /// The value of a bare reference to an overloaded method name.
    MethodGroup(DeclList),
    /// The type of a reference that did not resolve.
    Unresolved(Atom),
}
