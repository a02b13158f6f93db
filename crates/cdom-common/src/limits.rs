//! Centralized limits and thresholds for name resolution.
//!
//! These bound recursion in places where the declaration graph itself could
//! be cyclic (an erroneous `class A : B`, `class B : A`) or the code DOM is
//! pathologically deep. The per-node reentrancy flag handles legitimate
//! self-reference; these limits only stop malformed input.

/// Maximum nesting of resolutions triggered from inside another resolution.
///
/// Resolving a call resolves its arguments, which resolve their own
/// arguments, and so on. Past this depth the resolver leaves the node
/// unresolved instead of recursing further.
pub const MAX_RESOLUTION_DEPTH: u32 = 256;

/// Maximum depth when walking base-type chains.
///
/// Inheritance cycles are reported elsewhere; walks stop here so a cycle
/// cannot hang conversion checks or scope lookup.
pub const MAX_INHERITANCE_DEPTH: u32 = 64;

/// Maximum depth for type substitution and structural walks over a type.
pub const MAX_TYPE_WALK_DEPTH: u32 = 64;

/// Maximum number of enclosing declarations walked when building a scope chain.
pub const MAX_SCOPE_WALK_ITERATIONS: u32 = 10_000;
