//! Front end for the cdom name resolver.
//!
//! Resolution itself lives in the workspace crates:
//! - `cdom-common`: interning, diagnostic codes and messages, limits
//! - `cdom-types`: declarations, types, hierarchy and conversions
//! - `cdom-resolver`: the code DOM and the resolver
//!
//! This crate loads JSON projects into a code DOM, runs the resolver and
//! reports the outcome.

pub use cdom_common as common;
pub use cdom_resolver as resolver;
pub use cdom_types as types;

#[cfg(feature = "cli")]
pub mod cli;

// Tracing configuration (text / tree / JSON output on stderr)
pub mod tracing_config;
#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tracing_config_tests;
