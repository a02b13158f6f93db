//! Common types and utilities for the cdom name resolver.
//!
//! This crate provides foundational types used across all cdom crates:
//! - String interning (`Atom`, `Interner`)
//! - Diagnostic categories, codes and message templates
//! - Resolver limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostic model shared by the resolver and the CLI reporter
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, diagnostic_codes, format_message,
    get_diagnostic_message, get_message_template,
};

// Centralized limits and thresholds
pub mod limits;
