//! The fixed slot grid a design is placed onto.

use crate::kinds::SlotKind;
use fab_common::error::FatalError;
use fab_common::ids::SlotId;
use fab_common::FabResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The rectangular extent of the die, in micrometres.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DieBox {
    /// Die width in micrometres.
    pub width: i64,
    /// Die height in micrometres.
    pub height: i64,
}

impl DieBox {
    /// The geometric centre of the die, rounded towards the origin.
    pub fn centre(&self) -> (i64, i64) {
        (self.width / 2, self.height / 2)
    }

    /// The Manhattan diagonal of the die, used to scale the SA window
    /// radius.
    pub fn diameter(&self) -> i64 {
        self.width + self.height
    }
}

/// A single fixed site on the fabric.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Slot {
    /// The slot's identity.
    pub id: SlotId,
    /// X coordinate in micrometres.
    pub x: i64,
    /// Y coordinate in micrometres.
    pub y: i64,
    /// The kind of cell this slot can host.
    pub kind: SlotKind,
}

/// The fixed, immutable slot grid of a structured ASIC fabric.
///
/// Constructed once from a raw slot list and never mutated afterwards: every
/// other module in this crate treats `Fabric` as read-only ground truth.
///
/// Deliberately not `Serialize`/`Deserialize`: the derived indices
/// (`slots_by_kind`, `row_major`) would either have to be skipped and left
/// empty on deserialize, or serialized as redundant, easily-desynchronized
/// copies of `slots`. Round-tripping instead always goes through
/// `Fabric::new` from the raw `(DieBox, Vec<Slot>)` pair (see
/// `fab_cli::load::load_fabric`), which is the only place these indices are
/// built.
#[derive(Clone, Debug)]
pub struct Fabric {
    die: DieBox,
    slots: Vec<Slot>,
    /// `slots_by_kind[kind]` lists slot ids of that kind in row-major order;
    /// this is the "free slot view" the seeder and SA scan when looking for
    /// a candidate of a particular kind.
    slots_by_kind: HashMap<SlotKind, Vec<SlotId>>,
    /// Row-major ordering of every slot id, built once at construction.
    row_major: Vec<SlotId>,
}

impl Fabric {
    /// Builds a fabric from a raw slot list and die box.
    ///
    /// Fails with [`FatalError::InvalidFabric`] if slot ids are not a dense
    /// `0..n` range, if any slot lies outside the die box, or if the slot
    /// list is empty.
    pub fn new(die: DieBox, mut slots: Vec<Slot>) -> FabResult<Self> {
        if slots.is_empty() {
            return Err(FatalError::InvalidFabric {
                detail: "fabric has no slots".into(),
                hint: "provide at least one slot".into(),
            });
        }
        if die.width <= 0 || die.height <= 0 {
            return Err(FatalError::InvalidFabric {
                detail: format!("die box {}x{} is not positive", die.width, die.height),
                hint: "die width and height must be positive".into(),
            });
        }

        let mut seen = vec![false; slots.len()];
        for slot in &slots {
            let raw = slot.id.as_raw() as usize;
            if raw >= slots.len() {
                return Err(FatalError::InvalidFabric {
                    detail: format!("slot id {} is out of the dense 0..{} range", raw, slots.len()),
                    hint: "slot ids must form a dense 0..n range".into(),
                });
            }
            if seen[raw] {
                return Err(FatalError::InvalidFabric {
                    detail: format!("duplicate slot id {}", raw),
                    hint: "slot ids must be unique".into(),
                });
            }
            seen[raw] = true;
            if slot.x < 0 || slot.y < 0 || slot.x > die.width || slot.y > die.height {
                return Err(FatalError::InvalidFabric {
                    detail: format!(
                        "slot {} at ({}, {}) lies outside the die box {}x{}",
                        raw, slot.x, slot.y, die.width, die.height
                    ),
                    hint: "every slot must lie within the die box".into(),
                });
            }
        }

        // Row-major order: ascending y, then ascending x, stable on ties by id.
        slots.sort_by_key(|s| (s.y, s.x, s.id.as_raw()));
        let row_major: Vec<SlotId> = slots.iter().map(|s| s.id).collect();

        let mut slots_by_kind: HashMap<SlotKind, Vec<SlotId>> = HashMap::new();
        for slot in &slots {
            slots_by_kind.entry(slot.kind).or_default().push(slot.id);
        }

        // Index by raw id for O(1) slot() lookup.
        let mut by_raw = slots.clone();
        by_raw.sort_by_key(|s| s.id.as_raw());

        Ok(Self {
            die,
            slots: by_raw,
            slots_by_kind,
            row_major,
        })
    }

    /// The die box this fabric was built with.
    pub fn die(&self) -> DieBox {
        self.die
    }

    /// The total number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the fabric has no slots (never true for a validly constructed
    /// fabric, kept for API completeness).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Looks up a slot by id in O(1).
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.as_raw() as usize]
    }

    /// Slot ids of the given kind, in row-major order.
    pub fn slots_of_kind(&self, kind: SlotKind) -> &[SlotId] {
        self.slots_by_kind
            .get(&kind)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All slot ids in row-major order (ascending y, then ascending x).
    pub fn iter_row_major(&self) -> impl Iterator<Item = &Slot> {
        self.row_major.iter().map(move |id| self.slot(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fab_common::ids::SlotId;

    fn slot(raw: u32, x: i64, y: i64, kind: SlotKind) -> Slot {
        Slot {
            id: SlotId::from_raw(raw),
            x,
            y,
            kind,
        }
    }

    fn small_fabric() -> Fabric {
        let die = DieBox {
            width: 10,
            height: 10,
        };
        let slots = vec![
            slot(0, 0, 0, SlotKind::Logic),
            slot(1, 10, 0, SlotKind::Logic),
            slot(2, 0, 10, SlotKind::Dff),
            slot(3, 10, 10, SlotKind::Io),
        ];
        Fabric::new(die, slots).unwrap()
    }

    #[test]
    fn builds_and_looks_up() {
        let fabric = small_fabric();
        assert_eq!(fabric.len(), 4);
        assert_eq!(fabric.slot(SlotId::from_raw(2)).kind, SlotKind::Dff);
    }

    #[test]
    fn row_major_order_is_y_then_x() {
        let fabric = small_fabric();
        let order: Vec<u32> = fabric.iter_row_major().map(|s| s.id.as_raw()).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn slots_of_kind_filters_correctly() {
        let fabric = small_fabric();
        assert_eq!(fabric.slots_of_kind(SlotKind::Logic).len(), 2);
        assert_eq!(fabric.slots_of_kind(SlotKind::Io).len(), 1);
        assert_eq!(fabric.slots_of_kind(SlotKind::Tie).len(), 0);
    }

    #[test]
    fn empty_slot_list_is_invalid_fabric() {
        let die = DieBox {
            width: 10,
            height: 10,
        };
        let err = Fabric::new(die, vec![]).unwrap_err();
        assert!(matches!(err, FatalError::InvalidFabric { .. }));
    }

    #[test]
    fn duplicate_slot_id_is_invalid_fabric() {
        let die = DieBox {
            width: 10,
            height: 10,
        };
        let slots = vec![
            slot(0, 0, 0, SlotKind::Logic),
            slot(0, 5, 5, SlotKind::Logic),
        ];
        let err = Fabric::new(die, slots).unwrap_err();
        assert!(matches!(err, FatalError::InvalidFabric { .. }));
    }

    #[test]
    fn out_of_bounds_slot_is_invalid_fabric() {
        let die = DieBox {
            width: 10,
            height: 10,
        };
        let slots = vec![slot(0, 0, 0, SlotKind::Logic), slot(1, 20, 20, SlotKind::Logic)];
        let err = Fabric::new(die, slots).unwrap_err();
        assert!(matches!(err, FatalError::InvalidFabric { .. }));
    }

    #[test]
    fn die_centre_and_diameter() {
        let die = DieBox {
            width: 10,
            height: 20,
        };
        assert_eq!(die.centre(), (5, 10));
        assert_eq!(die.diameter(), 30);
    }
}
