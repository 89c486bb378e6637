//! The placement bijection: the one piece of mutable state in the engine.

use crate::kinds::{kind_compatible, CellKind, SlotKind};
use fab_common::error::FatalError;
use fab_common::ids::{InstanceId, SlotId};
use fab_common::FabResult;

/// The current binding between instances and slots.
///
/// This is the sole source of truth for "who is placed where" — no other
/// module caches an instance-to-slot mapping. Every lookup is O(1); every
/// mutation is O(1).
#[derive(Clone, Debug)]
pub struct PlacementState {
    slot_of: Vec<Option<SlotId>>,
    inst_of: Vec<Option<InstanceId>>,
}

impl PlacementState {
    /// Creates an empty placement over `num_instances` instances and
    /// `num_slots` slots, with nothing bound.
    pub fn new(num_instances: usize, num_slots: usize) -> Self {
        Self {
            slot_of: vec![None; num_instances],
            inst_of: vec![None; num_slots],
        }
    }

    /// The slot an instance is bound to, if any.
    pub fn slot_of(&self, inst: InstanceId) -> Option<SlotId> {
        self.slot_of[inst.as_raw() as usize]
    }

    /// The instance bound to a slot, if any.
    pub fn inst_of(&self, slot: SlotId) -> Option<InstanceId> {
        self.inst_of[slot.as_raw() as usize]
    }

    /// Whether the given slot is currently unbound.
    pub fn is_slot_free(&self, slot: SlotId) -> bool {
        self.inst_of(slot).is_none()
    }

    /// Whether the given instance is currently bound.
    pub fn is_bound(&self, inst: InstanceId) -> bool {
        self.slot_of(inst).is_some()
    }

    /// Binds a free instance to a free slot.
    ///
    /// Kind compatibility must already have been checked by the caller
    /// (the seeder and SA only ever offer kind-compatible candidates); this
    /// is a raw O(1) write, not a validating one. Both sides must be free —
    /// violating that is a caller bug, not a recoverable condition.
    pub fn bind(&mut self, inst: InstanceId, slot: SlotId) {
        debug_assert!(self.slot_of(inst).is_none(), "instance already bound");
        debug_assert!(self.is_slot_free(slot), "slot already occupied");
        self.slot_of[inst.as_raw() as usize] = Some(slot);
        self.inst_of[slot.as_raw() as usize] = Some(inst);
    }

    /// Binds an instance to a slot after checking kind compatibility.
    ///
    /// This is the entry point external data (a pre-placed instance's
    /// declared slot) must go through, since its compatibility hasn't been
    /// established by a candidate search the way the seeder's and SA's
    /// moves have. Fails with [`FatalError::KindMismatch`] if the cell kind
    /// and slot kind don't match.
    pub fn bind_checked(
        &mut self,
        inst: InstanceId,
        inst_name: &str,
        cell_kind: CellKind,
        slot: SlotId,
        slot_kind: SlotKind,
    ) -> FabResult<()> {
        if !kind_compatible(cell_kind, slot_kind) {
            return Err(FatalError::KindMismatch {
                instance: inst_name.to_string(),
                slot: slot.as_raw(),
                hint: format!("a {cell_kind} cell cannot bind to a {slot_kind} slot"),
            });
        }
        self.bind(inst, slot);
        Ok(())
    }

    /// Unbinds an instance, freeing its slot. A no-op if already unbound.
    pub fn unbind(&mut self, inst: InstanceId) {
        if let Some(slot) = self.slot_of[inst.as_raw() as usize].take() {
            self.inst_of[slot.as_raw() as usize] = None;
        }
    }

    /// Exchanges the bindings of two bound instances.
    pub fn swap(&mut self, a: InstanceId, b: InstanceId) {
        let sa = self.slot_of(a);
        let sb = self.slot_of(b);
        debug_assert!(sa.is_some() && sb.is_some(), "swap requires both instances bound");
        self.slot_of[a.as_raw() as usize] = sb;
        self.slot_of[b.as_raw() as usize] = sa;
        if let Some(s) = sb {
            self.inst_of[s.as_raw() as usize] = Some(a);
        }
        if let Some(s) = sa {
            self.inst_of[s.as_raw() as usize] = Some(b);
        }
    }

    /// Moves a bound instance to a currently-free slot. The concrete
    /// expression of "swap with one side unbound" degenerating to a move.
    pub fn relocate(&mut self, inst: InstanceId, dest: SlotId) {
        debug_assert!(self.is_slot_free(dest), "relocate destination must be free");
        if let Some(old) = self.slot_of[inst.as_raw() as usize].take() {
            self.inst_of[old.as_raw() as usize] = None;
        }
        self.slot_of[inst.as_raw() as usize] = Some(dest);
        self.inst_of[dest.as_raw() as usize] = Some(inst);
    }

    /// The number of currently-bound instances.
    pub fn bound_count(&self) -> usize {
        self.slot_of.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_and_lookup_both_directions() {
        let mut state = PlacementState::new(2, 2);
        let i = InstanceId::from_raw(0);
        let s = SlotId::from_raw(1);
        state.bind(i, s);
        assert_eq!(state.slot_of(i), Some(s));
        assert_eq!(state.inst_of(s), Some(i));
        assert!(!state.is_slot_free(s));
    }

    #[test]
    fn unbind_frees_slot() {
        let mut state = PlacementState::new(1, 1);
        let i = InstanceId::from_raw(0);
        let s = SlotId::from_raw(0);
        state.bind(i, s);
        state.unbind(i);
        assert!(state.slot_of(i).is_none());
        assert!(state.is_slot_free(s));
    }

    #[test]
    fn swap_exchanges_bindings() {
        let mut state = PlacementState::new(2, 2);
        let i = InstanceId::from_raw(0);
        let j = InstanceId::from_raw(1);
        let si = SlotId::from_raw(0);
        let sj = SlotId::from_raw(1);
        state.bind(i, si);
        state.bind(j, sj);
        state.swap(i, j);
        assert_eq!(state.slot_of(i), Some(sj));
        assert_eq!(state.slot_of(j), Some(si));
        assert_eq!(state.inst_of(si), Some(j));
        assert_eq!(state.inst_of(sj), Some(i));
    }

    #[test]
    fn relocate_moves_instance_and_frees_old_slot() {
        let mut state = PlacementState::new(1, 2);
        let i = InstanceId::from_raw(0);
        let s0 = SlotId::from_raw(0);
        let s1 = SlotId::from_raw(1);
        state.bind(i, s0);
        state.relocate(i, s1);
        assert_eq!(state.slot_of(i), Some(s1));
        assert!(state.is_slot_free(s0));
    }

    #[test]
    fn bind_checked_rejects_incompatible_kind() {
        let mut state = PlacementState::new(1, 1);
        let err = state
            .bind_checked(
                InstanceId::from_raw(0),
                "dff0",
                CellKind::Sequential,
                SlotId::from_raw(0),
                SlotKind::Logic,
            )
            .unwrap_err();
        assert!(matches!(err, fab_common::error::FatalError::KindMismatch { .. }));
    }

    #[test]
    fn bind_checked_accepts_compatible_kind() {
        let mut state = PlacementState::new(1, 1);
        state
            .bind_checked(
                InstanceId::from_raw(0),
                "lut0",
                CellKind::Combinational,
                SlotId::from_raw(0),
                SlotKind::Logic,
            )
            .unwrap();
        assert!(state.is_bound(InstanceId::from_raw(0)));
    }

    #[test]
    fn bound_count_tracks_bindings() {
        let mut state = PlacementState::new(3, 3);
        assert_eq!(state.bound_count(), 0);
        state.bind(InstanceId::from_raw(0), SlotId::from_raw(0));
        state.bind(InstanceId::from_raw(1), SlotId::from_raw(1));
        assert_eq!(state.bound_count(), 2);
    }
}
