//! What kind of entity a name use expects.

use cdom_types::DeclKind;
use serde::{Deserialize, Serialize};

/// The syntactic position a reference appears in.
///
/// Fixed once resolution begins. It decides which declaration kinds are
/// eligible and what "the type" of a match means when evaluating an
/// unresolved reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolveCategory {
    Type,
    Expression,
    Method,
    Constructor,
    Property,
    Indexer,
    Attribute,
    OperatorOverload,
    /// Receivers of a member access: a namespace, a type or a value.
    Unspecified,
}

impl ResolveCategory {
    /// Whether a declaration of `kind` is the right kind of entity.
    ///
    /// Delegate-typed variables in `Method` position need the variable's
    /// type and are handled by the classifier.
    pub fn accepts(self, kind: DeclKind) -> bool {
        match self {
            Self::Type => kind.is_type(),
            Self::Expression => kind.is_variable() || kind == DeclKind::Method,
            Self::Method => kind == DeclKind::Method,
            // A type with no declared constructor stands in for its
            // implicit parameterless one.
            Self::Constructor => {
                kind == DeclKind::Constructor || matches!(kind, DeclKind::Class | DeclKind::Struct)
            }
            Self::Attribute => kind == DeclKind::Constructor || kind == DeclKind::Class,
            Self::Property => matches!(kind, DeclKind::Property | DeclKind::Field),
            Self::Indexer => kind == DeclKind::Indexer,
            Self::OperatorOverload => kind == DeclKind::Operator,
            Self::Unspecified => true,
        }
    }

    /// Whether matching takes an argument list into account.
    pub const fn is_invocation(self) -> bool {
        matches!(
            self,
            Self::Method
                | Self::Constructor
                | Self::Attribute
                | Self::Indexer
                | Self::OperatorOverload
        )
    }

    /// Noun used in diagnostic text ("No method named 'f' ...").
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Expression => "variable",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Property => "property",
            Self::Indexer => "indexer",
            Self::Attribute => "attribute",
            Self::OperatorOverload => "operator",
            Self::Unspecified => "name",
        }
    }
}

#[cfg(test)]
#[path = "../tests/category_tests.rs"]
mod tests;
