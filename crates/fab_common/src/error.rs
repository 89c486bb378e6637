//! The closed set of fatal error kinds and the crate-wide `Result` alias.
//!
//! Every core entry point returns [`FabResult`]. None of these kinds is
//! retried or swallowed internally; a fatal error always aborts the current
//! run and no partial artefact is written.

use thiserror::Error;

/// The `Result` alias returned by every fallible core entry point.
pub type FabResult<T> = Result<T, FatalError>;

/// A fatal error raised by the placement engine.
///
/// Each variant identifies the offending entity (a slot id or instance name)
/// and carries a short remediation hint, so a fatal error can always be
/// rendered as a single diagnostic line naming the kind, the offending
/// entity, and how to fix it.
#[derive(Debug, Error)]
pub enum FatalError {
    /// Raised by the fabric model: duplicate slot id, out-of-bounds
    /// coordinate, or an empty fabric.
    #[error("invalid fabric: {detail} ({hint})")]
    InvalidFabric {
        /// What was wrong (e.g. "duplicate slot id 7").
        detail: String,
        /// A short remediation hint.
        hint: String,
    },

    /// Raised by the netlist model: dangling pin reference, duplicate
    /// instance name, or a net with no driver.
    #[error("invalid netlist: {detail} ({hint})")]
    InvalidNetlist {
        /// What was wrong (e.g. "net 'n1' has no driver").
        detail: String,
        /// A short remediation hint.
        hint: String,
    },

    /// Raised by the greedy seeder: no kind-compatible free slot exists for
    /// a required instance.
    #[error("instance '{instance}' could not be placed ({hint})")]
    UnplaceableInstance {
        /// The instance that could not be placed.
        instance: String,
        /// A short remediation hint.
        hint: String,
    },

    /// Raised when binding a pre-placed instance to its declared slot:
    /// the instance's cell kind does not match the slot's kind.
    #[error("kind mismatch binding instance '{instance}' to slot {slot} ({hint})")]
    KindMismatch {
        /// The instance involved.
        instance: String,
        /// The slot involved.
        slot: u32,
        /// A short remediation hint.
        hint: String,
    },

    /// Raised by H-tree CTS: no fabric slot remains to host a required
    /// buffer.
    #[error("no slot available for clock buffer '{buffer}' ({hint})")]
    NoBufferSlot {
        /// The name of the buffer that could not be placed.
        buffer: String,
        /// A short remediation hint.
        hint: String,
    },

    /// Raised by the ECO rewriter: a rename collision, or a DFF instance
    /// lacking a slot binding.
    #[error("ECO conflict: {detail} ({hint})")]
    EcoConflict {
        /// What was wrong (e.g. "slot_42 bound to two instances").
        detail: String,
        /// A short remediation hint.
        hint: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_fabric() {
        let err = FatalError::InvalidFabric {
            detail: "duplicate slot id 7".into(),
            hint: "ensure slot ids are unique".into(),
        };
        assert_eq!(
            format!("{err}"),
            "invalid fabric: duplicate slot id 7 (ensure slot ids are unique)"
        );
    }

    #[test]
    fn display_unplaceable_instance() {
        let err = FatalError::UnplaceableInstance {
            instance: "dff_3".into(),
            hint: "add more DFF slots to the fabric".into(),
        };
        assert_eq!(
            format!("{err}"),
            "instance 'dff_3' could not be placed (add more DFF slots to the fabric)"
        );
    }

    #[test]
    fn display_kind_mismatch() {
        let err = FatalError::KindMismatch {
            instance: "lut_0".into(),
            slot: 12,
            hint: "LOGIC instances cannot bind to DFF slots".into(),
        };
        assert_eq!(
            format!("{err}"),
            "kind mismatch binding instance 'lut_0' to slot 12 (LOGIC instances cannot bind to DFF slots)"
        );
    }

    #[test]
    fn display_eco_conflict() {
        let err = FatalError::EcoConflict {
            detail: "slot_5 bound to two instances".into(),
            hint: "rebind instances to distinct slots before rewriting".into(),
        };
        assert!(format!("{err}").starts_with("ECO conflict:"));
    }

    #[test]
    fn result_alias_ok_path() {
        let r: FabResult<i32> = Ok(42);
        assert!(r.is_ok());
        assert_eq!(r.ok(), Some(42));
    }

    #[test]
    fn result_alias_err_path() {
        let r: FabResult<i32> = Err(FatalError::NoBufferSlot {
            buffer: "buf_1".into(),
            hint: "widen the fabric or raise max_fanout".into(),
        });
        assert!(r.is_err());
    }
}
