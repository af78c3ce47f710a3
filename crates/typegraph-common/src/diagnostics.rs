//! Diagnostic model for the type-system build.
//!
//! Every error, warning, and informational message raised during
//! registration, canonicalization, cycle detection, or union resolution is
//! emitted through a monitor-style sink. A run with at least one error
//! returns failure but keeps going, so independent errors from the same run
//! are all surfaced together.
//!
//! Diagnostic codes are stable `u32` constants grouped by taxonomy class so
//! downstream tooling can match on them without parsing message text.

use serde::Serialize;
use tracing::warn;

/// Severity of a build diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Stable diagnostic codes.
///
/// Grouping:
/// - `1xxx` unsupported shape (fatal for the field, not for the run)
/// - `2xxx` structural conflict (fatal for the field)
/// - `3xxx` graph invariant violation (fatal for the family)
/// - `4xxx` warnings (never fail the run)
pub mod codes {
    // Unsupported shape
    pub const UNSUPPORTED_SHAPE: u32 = 1001;
    pub const ENUM_MISSING_EXTERNAL_NAME: u32 = 1002;
    pub const ENUM_UNDERLYING_NOT_INTEGER: u32 = 1003;

    // Structural conflict
    pub const FIELD_TYPE_CONFLICT: u32 = 2001;
    pub const NULLABILITY_MISMATCH: u32 = 2002;
    pub const FIELD_DEFAULT_CONFLICT: u32 = 2003;
    pub const MUST_BE_FULLY_MUTABLE: u32 = 2004;
    pub const MULTIPLE_CONSTRUCTORS: u32 = 2005;

    // Graph invariant violation
    pub const INSTANTIATION_CYCLE: u32 = 3001;
    pub const MISSING_DEFAULT: u32 = 3002;
    pub const AMBIGUOUS_UNION: u32 = 3003;
    pub const UNION_ERASED_BY_ANY: u32 = 3004;
    pub const UNION_MEMBER_NULLABLE: u32 = 3005;
    pub const DICTIONARY_KEY_NULLABLE: u32 = 3006;
    pub const DICTIONARY_KEY_NOT_READONLY: u32 = 3007;
    pub const SET_ITEM_NOT_HASH_SAFE: u32 = 3008;
    pub const UNION_HAS_NO_DEFAULT: u32 = 3009;
    pub const ABSTRACT_INTERFACE_CYCLE: u32 = 3010;
    pub const REGISTRY_LOCKED: u32 = 3011;

    // Warnings
    pub const IMPLEMENTATIONLESS_ABSTRACT: u32 = 4001;
    pub const REDUNDANT_UNION_MEMBER: u32 = 4002;
}

/// One diagnostic raised during a build run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: u32,
    pub message: String,
    /// Field path context, e.g. `Order.lines.product => Order`, when the
    /// diagnostic is tied to a specific place in the graph.
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn warning(code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn info(code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Info,
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Monitor-style sink the build emits through.
///
/// The builder never inspects what a sink does with a diagnostic; it only
/// tracks its own error count to decide whether finalization may succeed.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Vec-backed collector, the default sink.
#[derive(Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Drain all collected diagnostics.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.errors = 0;
        self.warnings = 0;
        std::mem::take(&mut self.diagnostics)
    }

    /// Find the first diagnostic with the given code.
    pub fn find(&self, code: u32) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.code == code)
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => {
                self.warnings += 1;
                warn!(code = diagnostic.code, message = %diagnostic.message, "build warning");
            }
            Severity::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts_by_severity() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::error(codes::MISSING_DEFAULT, "no default"));
        collector.report(Diagnostic::warning(
            codes::REDUNDANT_UNION_MEMBER,
            "absorbed",
        ));
        collector.report(Diagnostic::info(0, "note"));

        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert_eq!(collector.diagnostics().len(), 3);
        assert!(collector.has_errors());
    }

    #[test]
    fn test_find_by_code() {
        let mut collector = DiagnosticCollector::new();
        collector.report(
            Diagnostic::error(codes::INSTANTIATION_CYCLE, "cycle").with_path("A.b, B.a => A"),
        );
        let found = collector
            .find(codes::INSTANTIATION_CYCLE)
            .expect("diagnostic recorded");
        assert_eq!(found.path.as_deref(), Some("A.b, B.a => A"));
        assert!(collector.find(codes::MISSING_DEFAULT).is_none());
    }

    #[test]
    fn test_diagnostics_serialize_for_tooling() {
        let diagnostic =
            Diagnostic::error(codes::MISSING_DEFAULT, "no default").with_path("Order.total");
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "Error");
        assert_eq!(json["code"], 3002);
        assert_eq!(json["path"], "Order.total");
    }

    #[test]
    fn test_take_resets_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::error(codes::AMBIGUOUS_UNION, "related members"));
        let drained = collector.take();
        assert_eq!(drained.len(), 1);
        assert!(!collector.has_errors());
        assert!(collector.diagnostics().is_empty());
    }
}
