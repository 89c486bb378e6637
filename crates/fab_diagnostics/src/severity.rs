//! Diagnostic severity levels ordered from least to most severe.

use std::fmt;

/// The severity level of a non-fatal diagnostic.
///
/// Ordered from least severe (`Note`) to most severe (`Warning`), matching
/// the derived `PartialOrd`/`Ord` based on declaration order. Fatal
/// conditions never go through here; see `fab_common::FatalError`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    /// An informational note (e.g. an SA per-temperature trace line).
    Note,
    /// A potential issue worth surfacing but not fatal to the run (e.g. a
    /// CTS fanout imbalance within the allowed one-off tolerance).
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
