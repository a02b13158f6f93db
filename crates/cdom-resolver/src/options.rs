//! Resolver configuration.

use cdom_common::limits::MAX_RESOLUTION_DEPTH;
use serde::{Deserialize, Serialize};

/// Knobs for one resolution pass.
///
/// Project files carry these under `"options"`; every field may be omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Report signature mismatches caused by unresolved arguments as warnings.
    pub suppress_cascading_errors: bool,
    /// Let `[Foo]` also find `FooAttribute`.
    pub attribute_suffix: bool,
    /// Break ties between complete matches by conversion quality.
    pub prefer_better_conversions: bool,
    /// Nested resolutions allowed before a node is left unresolved.
    pub max_resolution_depth: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            suppress_cascading_errors: true,
            attribute_suffix: true,
            prefer_better_conversions: true,
            max_resolution_depth: MAX_RESOLUTION_DEPTH,
        }
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
