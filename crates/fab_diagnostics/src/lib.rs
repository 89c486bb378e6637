//! Structured, non-fatal diagnostic reporting for the placement engine.
//!
//! This is a trimmed relative of the accumulator-style diagnostic sink used
//! elsewhere in the ecosystem: it drops the `Mutex`-guarded concurrency (the
//! engine is single-threaded, so no concurrent writers ever contend for the
//! sink) but keeps the same shape (severity, short message,
//! accumulate-then-drain). Diagnostics emitted here never change a return
//! status; they exist purely to surface SA progress lines, seeder fallback
//! notices, and CTS imbalance warnings.

pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
