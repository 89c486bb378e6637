//! Human-readable and machine-readable rendering of a finished run:
//! the placement map, clock tree summary, and resource usage.

use crate::cts::{ClockChild, ClockNode, ClockTree};
use crate::fabric::Fabric;
use crate::kinds::SlotKind;
use crate::netlist::Netlist;
use crate::placement::state::PlacementState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// The primary artefact of a finished run: one row per *placed* instance,
/// sorted by instance name, suitable for a DEF writer or visualizer to
/// consume directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementMap {
    /// One row per bound instance, sorted by `instance` name.
    pub rows: Vec<PlacementRow>,
}

/// A single row of a [`PlacementMap`]: `instance_name slot_id x_um y_um`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementRow {
    /// The instance's logical name.
    pub instance: String,
    /// The slot's raw id.
    pub slot: u32,
    /// X coordinate in micrometres.
    pub x_um: i64,
    /// Y coordinate in micrometres.
    pub y_um: i64,
}

impl PlacementMap {
    /// Builds a placement map from the current bindings. Unbound (still
    /// free) slots are omitted; only placed instances appear.
    pub fn build(fabric: &Fabric, netlist: &Netlist, placement: &PlacementState) -> Self {
        let mut rows: Vec<PlacementRow> = netlist
            .instances()
            .iter()
            .filter_map(|inst| {
                let slot_id = placement.slot_of(inst.id)?;
                let slot = fabric.slot(slot_id);
                Some(PlacementRow {
                    instance: inst.name.clone(),
                    slot: slot_id.as_raw(),
                    x_um: slot.x,
                    y_um: slot.y,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.instance.cmp(&b.instance));
        Self { rows }
    }

    /// Renders the map as `instance_name slot_id x_um y_um` text lines,
    /// sorted by instance name.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let _ = writeln!(out, "{} {} {} {}", row.instance, row.slot, row.x_um, row.y_um);
        }
        out
    }
}

/// Counts of occupied vs. total slots, broken down by kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// `kind display name -> (used, total)`.
    pub by_kind: HashMap<String, (usize, usize)>,
}

impl ResourceUsage {
    /// Summarizes slot utilization by kind.
    pub fn build(fabric: &Fabric, placement: &PlacementState) -> Self {
        let mut by_kind: HashMap<String, (usize, usize)> = HashMap::new();
        for kind in [SlotKind::Logic, SlotKind::Dff, SlotKind::Io, SlotKind::Tie] {
            let slots = fabric.slots_of_kind(kind);
            let used = slots.iter().filter(|&&s| !placement.is_slot_free(s)).count();
            by_kind.insert(kind.to_string(), (used, slots.len()));
        }
        Self { by_kind }
    }
}

/// A flattened, serializable view of a [`ClockTree`], suitable for emitting
/// alongside the placement map. Buffers and DFF sink leaves share one
/// uniform, id-indexed node list — a reader never needs to special-case a
/// leaf.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockTreeReport {
    /// Every node — buffer or sink leaf — indexed by position in this
    /// vector.
    pub nodes: Vec<ClockTreeNodeReport>,
    /// The number of buffer-to-buffer levels beneath the root.
    pub depth: usize,
}

/// A single node of a [`ClockTreeReport`]: `{id, x_um, y_um, children}`.
/// A sink leaf has an empty `children`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockTreeNodeReport {
    /// This node's index within [`ClockTreeReport::nodes`].
    pub id: u32,
    /// X coordinate in micrometres.
    pub x_um: i64,
    /// Y coordinate in micrometres.
    pub y_um: i64,
    /// Ids (within this same node list) of the nodes this node drives.
    pub children: Vec<u32>,
}

impl ClockTreeReport {
    /// Flattens a [`ClockTree`] into an id-indexed, serializable report.
    /// DFF sink leaves are flattened into the same node list as buffers,
    /// with their placed coordinates looked up via `fabric`/`placement`.
    pub fn build(tree: &ClockTree, fabric: &Fabric, placement: &PlacementState) -> Self {
        let mut nodes = Vec::new();
        flatten(&tree.root, fabric, placement, &mut nodes);
        Self {
            depth: tree.root.buffer_depth(),
            nodes,
        }
    }
}

fn flatten(
    node: &ClockNode,
    fabric: &Fabric,
    placement: &PlacementState,
    nodes: &mut Vec<ClockTreeNodeReport>,
) -> u32 {
    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        match child {
            ClockChild::Buffer(b) => {
                children.push(flatten(b, fabric, placement, nodes));
            }
            ClockChild::Sink(inst) => {
                let slot = placement
                    .slot_of(*inst)
                    .expect("sequential instance unplaced while building the clock tree report");
                let s = fabric.slot(slot);
                let id = nodes.len() as u32;
                nodes.push(ClockTreeNodeReport {
                    id,
                    x_um: s.x,
                    y_um: s.y,
                    children: Vec::new(),
                });
                children.push(id);
            }
        }
    }
    let id = nodes.len() as u32;
    nodes.push(ClockTreeNodeReport {
        id,
        x_um: node.x,
        y_um: node.y,
        children,
    });
    id
}
