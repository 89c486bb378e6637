//! A single structured, non-fatal diagnostic message.

use crate::severity::Severity;

/// A structured diagnostic message: a severity, a short message, and the
/// name of the entity it concerns (an instance, net, or buffer name), if
/// any.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// The entity this diagnostic concerns, if applicable.
    pub entity: Option<String>,
}

impl Diagnostic {
    /// Creates a new informational note.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            message: message.into(),
            entity: None,
        }
    }

    /// Creates a new warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            entity: None,
        }
    }

    /// Attaches the name of the entity this diagnostic concerns.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}
