//! Clock tree synthesis: recursive geometric bisection over DFF sinks.

use crate::fabric::Fabric;
use crate::kinds::SlotKind;
use crate::netlist::Netlist;
use crate::params::CtsParams;
use crate::placement::state::PlacementState;
use fab_common::error::FatalError;
use fab_common::ids::{InstanceId, SlotId};
use fab_common::FabResult;
use std::collections::HashSet;

/// A child of a clock tree node: either another buffer, or a DFF sink.
#[derive(Clone, Debug)]
pub enum ClockChild {
    /// Another synthesized clock buffer.
    Buffer(Box<ClockNode>),
    /// A terminal DFF sink.
    Sink(InstanceId),
}

/// A single synthesized clock buffer and the subtree it drives.
#[derive(Clone, Debug)]
pub struct ClockNode {
    /// The buffer's synthesized instance name.
    pub name: String,
    /// X coordinate of the buffer's assigned slot.
    pub x: i64,
    /// Y coordinate of the buffer's assigned slot.
    pub y: i64,
    /// The slot this buffer occupies.
    pub slot: SlotId,
    /// This buffer's children: further buffers or DFF sinks.
    pub children: Vec<ClockChild>,
}

impl ClockNode {
    /// The number of buffer-to-buffer levels beneath this node: zero for a
    /// leaf buffer driving only sinks, otherwise one more than its deepest
    /// buffer child.
    pub fn buffer_depth(&self) -> usize {
        self.children
            .iter()
            .filter_map(|c| match c {
                ClockChild::Buffer(b) => Some(1 + b.buffer_depth()),
                ClockChild::Sink(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Every DFF sink reachable from this node.
    pub fn leaf_sinks(&self) -> Vec<InstanceId> {
        let mut out = Vec::new();
        self.collect_sinks(&mut out);
        out
    }

    fn collect_sinks(&self, out: &mut Vec<InstanceId>) {
        for child in &self.children {
            match child {
                ClockChild::Sink(inst) => out.push(*inst),
                ClockChild::Buffer(b) => b.collect_sinks(out),
            }
        }
    }
}

/// A synthesized clock tree rooted at a single buffer.
#[derive(Clone, Debug)]
pub struct ClockTree {
    /// The root buffer, driven directly by the top-level clock port.
    pub root: ClockNode,
}

/// Builds a clock tree over every sequential instance's current placement.
///
/// Returns `Ok(None)` if the design has no sequential instances — there is
/// nothing to synthesize a tree over. Fails with
/// [`FatalError::NoBufferSlot`] if a buffer cannot find a free slot of any
/// kind in its fallback order (LOGIC, then DFF, then IO).
pub fn synthesize(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    params: &CtsParams,
) -> FabResult<Option<ClockTree>> {
    let mut sinks: Vec<(InstanceId, i64, i64)> = netlist
        .sequential_instances()
        .map(|inst| {
            let slot = placement
                .slot_of(inst.id)
                .expect("sequential instance unplaced before clock tree synthesis");
            let s = fabric.slot(slot);
            (inst.id, s.x, s.y)
        })
        .collect();

    if sinks.is_empty() {
        return Ok(None);
    }

    sinks.sort_by_key(|&(id, _, _)| id.as_raw());

    let mut used: HashSet<SlotId> = HashSet::new();
    for inst in netlist.instances() {
        if let Some(slot) = placement.slot_of(inst.id) {
            used.insert(slot);
        }
    }

    let mut next_buffer = 0usize;
    let root = build_subtree(fabric, &sinks, params.max_fanout, &mut used, &mut next_buffer)?;
    Ok(Some(ClockTree { root }))
}

fn build_subtree(
    fabric: &Fabric,
    sinks: &[(InstanceId, i64, i64)],
    max_fanout: usize,
    used: &mut HashSet<SlotId>,
    next_buffer: &mut usize,
) -> FabResult<ClockNode> {
    if sinks.len() <= max_fanout.max(1) {
        let (cx, cy) = centroid(sinks.iter().map(|&(_, x, y)| (x, y)));
        let children = sinks.iter().map(|&(id, _, _)| ClockChild::Sink(id)).collect();
        return make_buffer(fabric, cx, cy, children, used, next_buffer);
    }

    let min_x = sinks.iter().map(|&(_, x, _)| x).min().unwrap();
    let max_x = sinks.iter().map(|&(_, x, _)| x).max().unwrap();
    let min_y = sinks.iter().map(|&(_, _, y)| y).min().unwrap();
    let max_y = sinks.iter().map(|&(_, _, y)| y).max().unwrap();

    let mut ordered = sinks.to_vec();
    if (max_x - min_x) >= (max_y - min_y) {
        ordered.sort_by_key(|&(id, x, _)| (x, id.as_raw()));
    } else {
        ordered.sort_by_key(|&(id, _, y)| (y, id.as_raw()));
    }

    let mid = ordered.len() / 2;
    let (left, right) = ordered.split_at(mid);

    let left_node = build_subtree(fabric, left, max_fanout, used, next_buffer)?;
    let right_node = build_subtree(fabric, right, max_fanout, used, next_buffer)?;

    let cx = (left_node.x + right_node.x) / 2;
    let cy = (left_node.y + right_node.y) / 2;
    let children = vec![ClockChild::Buffer(Box::new(left_node)), ClockChild::Buffer(Box::new(right_node))];
    make_buffer(fabric, cx, cy, children, used, next_buffer)
}

fn make_buffer(
    fabric: &Fabric,
    x: i64,
    y: i64,
    children: Vec<ClockChild>,
    used: &mut HashSet<SlotId>,
    next_buffer: &mut usize,
) -> FabResult<ClockNode> {
    let name = format!("ctsbuf_{}", *next_buffer);
    *next_buffer += 1;

    let slot = nearest_free_slot(fabric, used, x, y, &[SlotKind::Logic, SlotKind::Dff, SlotKind::Io]).ok_or_else(|| {
        FatalError::NoBufferSlot {
            buffer: name.clone(),
            hint: "no free LOGIC, DFF, or IO slot remains for a clock buffer".into(),
        }
    })?;
    used.insert(slot);
    let s = fabric.slot(slot);

    Ok(ClockNode {
        name,
        x: s.x,
        y: s.y,
        slot,
        children,
    })
}

fn nearest_free_slot(
    fabric: &Fabric,
    used: &HashSet<SlotId>,
    x: i64,
    y: i64,
    fallback_order: &[SlotKind],
) -> Option<SlotId> {
    for &kind in fallback_order {
        let mut best = None;
        let mut best_dist = i64::MAX;
        for &candidate in fabric.slots_of_kind(kind) {
            if used.contains(&candidate) {
                continue;
            }
            let s = fabric.slot(candidate);
            let dist = (s.x - x).abs() + (s.y - y).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some(candidate);
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

fn centroid(points: impl Iterator<Item = (i64, i64)>) -> (i64, i64) {
    let mut sum_x = 0i64;
    let mut sum_y = 0i64;
    let mut n = 0i64;
    for (x, y) in points {
        sum_x += x;
        sum_y += y;
        n += 1;
    }
    if n == 0 {
        (0, 0)
    } else {
        ((sum_x + n / 2) / n, (sum_y + n / 2) / n)
    }
}
