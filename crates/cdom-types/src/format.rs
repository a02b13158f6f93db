//! Display names for types and declarations, used in diagnostic text.

use crate::decl::{DeclId, DeclKind, DeclarationStore, RefKind};
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};
use cdom_common::Interner;
use cdom_common::limits::MAX_TYPE_WALK_DEPTH;

pub struct TypeFormatter<'a> {
    types: &'a TypeInterner,
    decls: &'a DeclarationStore,
    names: &'a Interner,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(types: &'a TypeInterner, decls: &'a DeclarationStore, names: &'a Interner) -> Self {
        Self {
            types,
            decls,
            names,
        }
    }

    pub fn format_type(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, 0);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId, depth: u32) {
        if depth > MAX_TYPE_WALK_DEPTH {
            out.push_str("...");
            return;
        }
        match self.types.lookup(ty) {
            Some(TypeData::Intrinsic(kind)) => out.push_str(kind.keyword()),
            Some(TypeData::Declared(decl)) => {
                out.push_str(&self.decl_name(decl));
                self.write_type_param_names(out, decl);
            }
            Some(TypeData::Application { base, args }) => {
                out.push_str(&self.decl_name(base));
                out.push('<');
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, arg, depth + 1);
                }
                out.push('>');
            }
            Some(TypeData::Array { element, rank }) => {
                self.write_type(out, element, depth + 1);
                out.push('[');
                for _ in 1..rank {
                    out.push(',');
                }
                out.push(']');
            }
            Some(TypeData::TypeParameter(param)) => {
                let name = self
                    .decls
                    .get(param.owner)
                    .and_then(|d| d.type_params.get(param.index as usize))
                    .map(|tp| self.names.resolve(tp.name).to_string());
                match name {
                    Some(name) => out.push_str(&name),
                    None => out.push_str(&format!("T{}", param.index)),
                }
            }
            Some(TypeData::MethodGroup(_)) => out.push_str("method group"),
            Some(TypeData::Unresolved(name)) => out.push_str(self.names.resolve(name)),
            None => out.push('?'),
        }
    }

    fn write_type_param_names(&self, out: &mut String, decl: DeclId) {
        let Some(d) = self.decls.get(decl) else {
            return;
        };
        if d.type_params.is_empty() {
            return;
        }
        out.push('<');
        let names: Vec<&str> = d
            .type_params
            .iter()
            .map(|tp| self.names.resolve(tp.name))
            .collect();
        out.push_str(&names.join(", "));
        out.push('>');
    }

    /// Simple name of a declaration. Constructors print as their type.
    pub fn decl_name(&self, decl: DeclId) -> String {
        let Some(d) = self.decls.get(decl) else {
            return "?".to_string();
        };
        if d.kind == DeclKind::Constructor
            && let Some(owner) = d.parent
        {
            return self.decl_name(owner);
        }
        self.names.resolve(d.name).to_string()
    }

    /// Dotted path from the outermost named namespace.
    pub fn qualified_name(&self, decl: DeclId) -> String {
        let mut parts: Vec<String> = self
            .decls
            .ancestors(decl)
            .into_iter()
            .rev()
            .filter_map(|id| self.decls.get(id))
            .filter(|d| !d.name.is_none())
            .map(|d| self.names.resolve(d.name).to_string())
            .collect();
        parts.push(self.decl_name(decl));
        parts.join(".")
    }

    /// `Name<T>(int, ref string, params object[])`, or the bare qualified
    /// name for declarations without parameters.
    pub fn format_signature(&self, decl: DeclId) -> String {
        let Some(d) = self.decls.get(decl) else {
            return "?".to_string();
        };
        let mut out = self.qualified_name(decl);
        if d.kind != DeclKind::Constructor {
            self.write_type_param_names(&mut out, decl);
        }
        if !d.has_parameters() {
            return out;
        }
        let (open, close) = if d.kind == DeclKind::Indexer {
            ('[', ']')
        } else {
            ('(', ')')
        };
        out.push(open);
        for (i, param) in d.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match param.ref_kind {
                RefKind::Ref => out.push_str("ref "),
                RefKind::Out => out.push_str("out "),
                RefKind::Value => {}
            }
            if param.is_variadic {
                out.push_str("params ");
            }
            self.write_type(&mut out, param.ty, 0);
        }
        out.push(close);
        out
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
