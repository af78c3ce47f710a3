//! Common types and utilities for the typegraph builder.
//!
//! This crate provides the foundational pieces used across all typegraph
//! crates:
//! - String interning (`Atom`, `Interner`)
//! - The diagnostic model (`Severity`, `Diagnostic`, `DiagnosticSink`,
//!   `DiagnosticCollector`) and the stable diagnostic code table

// String interning for name deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostics - monitor-style sink consumed by every build phase
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticSink, Severity, codes};
