//! The fanout-ordered greedy seeder: produces the initial placement that SA
//! refines.

use crate::fabric::Fabric;
use crate::kinds::{kind_compatible, required_slot_kind};
use crate::netlist::Netlist;
use crate::placement::state::PlacementState;
use fab_common::error::FatalError;
use fab_common::ids::InstanceId;
use fab_common::FabResult;

/// Seeds every movable instance into a free, kind-compatible slot.
///
/// Instances are visited in descending fanout order (ties broken by
/// ascending name, for determinism). Each instance's reference point is the
/// centroid of its already-placed neighbours (driver, for an instance on the
/// sink side of a net; sinks, for an instance on the driver side), or the
/// die centre if it has none yet. The instance is then bound to the nearest
/// free slot of its required kind, ties broken by row-major slot order.
///
/// Fixed instances are assumed already bound by the caller and are skipped,
/// but still contribute to neighbours' reference points.
///
/// Fails with [`FatalError::UnplaceableInstance`] if an instance's required
/// kind has no free slot left.
pub fn seed(fabric: &Fabric, netlist: &Netlist, placement: &mut PlacementState) -> FabResult<()> {
    let mut order: Vec<InstanceId> = netlist
        .instances()
        .iter()
        .filter(|i| !i.is_fixed)
        .map(|i| i.id)
        .collect();

    order.sort_by(|&a, &b| {
        let fa = netlist.fanout(a);
        let fb = netlist.fanout(b);
        fb.cmp(&fa).then_with(|| netlist.instance(a).name.cmp(&netlist.instance(b).name))
    });

    for inst in order {
        let (rx, ry) = reference_point(fabric, netlist, placement, inst);
        let kind = netlist.instance(inst).kind;
        let slot_kind = required_slot_kind(kind);

        let mut best = None;
        let mut best_dist = i64::MAX;
        for &candidate in fabric.slots_of_kind(slot_kind) {
            if !placement.is_slot_free(candidate) {
                continue;
            }
            let s = fabric.slot(candidate);
            let dist = (s.x - rx).abs() + (s.y - ry).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some(candidate);
            }
        }

        match best {
            Some(slot) => {
                debug_assert!(kind_compatible(kind, fabric.slot(slot).kind));
                placement.bind(inst, slot);
            }
            None => {
                return Err(FatalError::UnplaceableInstance {
                    instance: netlist.instance(inst).name.clone(),
                    hint: format!("no free {} slot remains", slot_kind),
                });
            }
        }
    }

    Ok(())
}

/// The centroid of an instance's already-placed neighbours, or the die
/// centre if it has none.
fn reference_point(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    inst: InstanceId,
) -> (i64, i64) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for &net_id in netlist.nets_of(inst) {
        if Some(net_id) == netlist.clock_net() {
            continue;
        }
        let net = netlist.net(net_id);
        let driver_inst = netlist.pin(net.driver).instance;
        if driver_inst == inst {
            for &sink_pin in &net.sinks {
                let sink_inst = netlist.pin(sink_pin).instance;
                if let Some(slot) = placement.slot_of(sink_inst) {
                    let s = fabric.slot(slot);
                    xs.push(s.x);
                    ys.push(s.y);
                }
            }
        } else if let Some(slot) = placement.slot_of(driver_inst) {
            let s = fabric.slot(slot);
            xs.push(s.x);
            ys.push(s.y);
        }
    }

    if xs.is_empty() {
        fabric.die().centre()
    } else {
        let sum_x: i64 = xs.iter().sum();
        let sum_y: i64 = ys.iter().sum();
        let n = xs.len() as i64;
        // Round-half-up for determinism across platforms.
        ((sum_x + n / 2) / n, (sum_y + n / 2) / n)
    }
}
