//! Type-argument inference slots.
//!
//! One slot per type parameter of the candidate being scored. Slots are
//! filled by walking each declared parameter type against the argument
//! type: a parameter that *is* the type parameter binds directly; one that
//! only *contains* it (`T[]`, `IEnumerable<T>`) is taken apart first.

use cdom_common::limits::MAX_TYPE_WALK_DEPTH;
use cdom_types::{DeclId, Hierarchy, TypeData, TypeId, TypeInterner, TypeList, TypeRelation};
use smallvec::SmallVec;
use std::fmt;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    /// Two arguments bound one type parameter to unrelated types.
    Conflict {
        type_param: usize,
        first: TypeId,
        second: TypeId,
    },
    /// No argument mentions the type parameter.
    Uninferred { type_param: usize },
}

impl InferenceError {
    pub fn type_param(&self) -> usize {
        match self {
            Self::Conflict { type_param, .. } | Self::Uninferred { type_param } => *type_param,
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                type_param,
                first,
                second,
            } => write!(
                f,
                "type parameter {type_param} inferred as both {} and {}",
                first.0, second.0
            ),
            Self::Uninferred { type_param } => {
                write!(f, "type parameter {type_param} could not be inferred")
            }
        }
    }
}

impl std::error::Error for InferenceError {}

/// Inferred type arguments of one generic candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceSlots {
    owner: DeclId,
    slots: SmallVec<[Option<TypeId>; 4]>,
}

impl InferenceSlots {
    pub fn new(owner: DeclId, arity: usize) -> Self {
        Self {
            owner,
            slots: smallvec::smallvec![None; arity],
        }
    }

    pub fn owner(&self) -> DeclId {
        self.owner
    }

    pub fn get(&self, index: usize) -> Option<TypeId> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every slot filled, or the first empty one.
    pub fn finish(&self) -> Result<TypeList, InferenceError> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| slot.ok_or(InferenceError::Uninferred { type_param: i }))
            .collect()
    }
}

/// Fills inference slots from (parameter type, argument type) pairs.
pub struct Inferencer<'a> {
    types: &'a TypeInterner,
    relation: &'a TypeRelation<'a>,
    hierarchy: &'a Hierarchy<'a>,
}

impl<'a> Inferencer<'a> {
    pub fn new(types: &'a TypeInterner, relation: &'a TypeRelation<'a>) -> Self {
        Self {
            types,
            relation,
            hierarchy: relation.hierarchy(),
        }
    }

    pub fn infer(
        &self,
        slots: &mut InferenceSlots,
        param: TypeId,
        arg: TypeId,
    ) -> Result<(), InferenceError> {
        self.infer_inner(slots, param, arg, 0)
    }

    fn infer_inner(
        &self,
        slots: &mut InferenceSlots,
        param: TypeId,
        arg: TypeId,
        depth: u32,
    ) -> Result<(), InferenceError> {
        if depth > MAX_TYPE_WALK_DEPTH
            || self.types.is_undetermined(arg)
            || arg == TypeId::NULL
            || self.types.method_group_members(arg).is_some()
        {
            return Ok(());
        }
        match self.types.lookup(param) {
            Some(TypeData::TypeParameter(tp)) if tp.owner == slots.owner => {
                self.bind(slots, tp.index as usize, arg)
            }
            Some(TypeData::Array { element, rank }) => match self.types.array_parts(arg) {
                Some((arg_element, arg_rank)) if arg_rank == rank => {
                    self.infer_inner(slots, element, arg_element, depth + 1)
                }
                _ => Ok(()),
            },
            Some(TypeData::Application { base, args }) => {
                let Some(instance) = self.hierarchy.find_instantiation(arg, base) else {
                    return Ok(());
                };
                let instance_args = self.types.type_args(instance);
                for (&p, &a) in args.iter().zip(instance_args.iter()) {
                    self.infer_inner(slots, p, a, depth + 1)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Bind a slot, widening to the other type when one converts to it.
    fn bind(
        &self,
        slots: &mut InferenceSlots,
        index: usize,
        arg: TypeId,
    ) -> Result<(), InferenceError> {
        let Some(slot) = slots.slots.get_mut(index) else {
            return Ok(());
        };
        match *slot {
            None => {
                trace!(type_param = index, ty = arg.0, "inferred");
                *slot = Some(arg);
                Ok(())
            }
            Some(prev) if prev == arg => Ok(()),
            Some(prev) => {
                if self.relation.is_implicitly_convertible(arg, prev) {
                    Ok(())
                } else if self.relation.is_implicitly_convertible(prev, arg) {
                    *slot = Some(arg);
                    Ok(())
                } else {
                    Err(InferenceError::Conflict {
                        type_param: index,
                        first: prev,
                        second: arg,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
