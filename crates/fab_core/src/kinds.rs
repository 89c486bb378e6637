//! The closed sets of cell kinds and slot kinds, and the compatibility
//! relation between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a netlist instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CellKind {
    /// A combinational cell (LUT, gate, etc).
    Combinational,
    /// A sequential cell (flip-flop).
    Sequential,
    /// A top-level IO cell.
    Io,
    /// A constant-tie cell.
    Tie,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Combinational => write!(f, "combinational"),
            CellKind::Sequential => write!(f, "sequential"),
            CellKind::Io => write!(f, "io"),
            CellKind::Tie => write!(f, "tie"),
        }
    }
}

/// The kind of a fabric slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SlotKind {
    /// A generic combinational logic slot.
    Logic,
    /// A flip-flop slot.
    Dff,
    /// A top-level IO slot.
    Io,
    /// A constant-tie slot.
    Tie,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Logic => write!(f, "LOGIC"),
            SlotKind::Dff => write!(f, "DFF"),
            SlotKind::Io => write!(f, "IO"),
            SlotKind::Tie => write!(f, "TIE"),
        }
    }
}

/// Returns whether a cell of the given kind may occupy a slot of the given
/// kind: sequential cells take DFF slots, IO cells take IO slots, tie cells
/// take TIE slots, and every other (combinational) cell takes a LOGIC slot.
pub fn kind_compatible(cell: CellKind, slot: SlotKind) -> bool {
    matches!(
        (cell, slot),
        (CellKind::Sequential, SlotKind::Dff)
            | (CellKind::Io, SlotKind::Io)
            | (CellKind::Tie, SlotKind::Tie)
            | (CellKind::Combinational, SlotKind::Logic)
    )
}

/// The slot kind a cell of the given kind requires.
pub fn required_slot_kind(cell: CellKind) -> SlotKind {
    match cell {
        CellKind::Sequential => SlotKind::Dff,
        CellKind::Io => SlotKind::Io,
        CellKind::Tie => SlotKind::Tie,
        CellKind::Combinational => SlotKind::Logic,
    }
}
