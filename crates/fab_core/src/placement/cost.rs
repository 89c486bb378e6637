//! Half-perimeter wirelength cost, with support for hypothetical (what-if)
//! evaluation so movegen can price a move without mutating the placement.

use crate::fabric::Fabric;
use crate::netlist::Netlist;
use crate::placement::state::PlacementState;
use fab_common::ids::{InstanceId, NetId, SlotId};

/// Looks up the effective slot of an instance: the override, if one is
/// supplied for it, otherwise its current placement.
fn effective_slot(
    placement: &PlacementState,
    overrides: &[(InstanceId, Option<SlotId>)],
    inst: InstanceId,
) -> Option<SlotId> {
    for &(oi, os) in overrides {
        if oi == inst {
            return os;
        }
    }
    placement.slot_of(inst)
}

/// The half-perimeter wirelength of a single net under a (possibly
/// overridden) placement. A net with fewer than one placed pin contributes
/// zero.
fn net_hpwl_with_overrides(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    net: NetId,
    overrides: &[(InstanceId, Option<SlotId>)],
) -> i64 {
    let n = netlist.net(net);
    let mut min_x = i64::MAX;
    let mut max_x = i64::MIN;
    let mut min_y = i64::MAX;
    let mut max_y = i64::MIN;
    let mut any = false;

    let mut visit = |pin_instance: InstanceId| {
        if let Some(slot) = effective_slot(placement, overrides, pin_instance) {
            let s = fabric.slot(slot);
            min_x = min_x.min(s.x);
            max_x = max_x.max(s.x);
            min_y = min_y.min(s.y);
            max_y = max_y.max(s.y);
            any = true;
        }
    };

    visit(netlist.pin(n.driver).instance);
    for &sink in &n.sinks {
        visit(netlist.pin(sink).instance);
    }

    if !any {
        0
    } else {
        (max_x - min_x) + (max_y - min_y)
    }
}

/// The half-perimeter wirelength of a single net under the current
/// placement, with no overrides.
pub fn net_hpwl(fabric: &Fabric, netlist: &Netlist, placement: &PlacementState, net: NetId) -> i64 {
    net_hpwl_with_overrides(fabric, netlist, placement, net, &[])
}

/// The total placement cost: the sum of HPWL over every net except the
/// clock net. Clock routing is synthesized separately by the clock tree
/// builder rather than cost-optimized by annealing, so it never enters
/// this sum.
pub fn total_cost(fabric: &Fabric, netlist: &Netlist, placement: &PlacementState) -> i64 {
    netlist
        .nets()
        .iter()
        .filter(|n| Some(n.id) != netlist.clock_net())
        .map(|n| net_hpwl(fabric, netlist, placement, n.id))
        .sum()
}

/// The net ids incident to either of two instances, deduplicated.
pub fn affected_nets(netlist: &Netlist, a: InstanceId, b: InstanceId) -> Vec<NetId> {
    let mut nets: Vec<NetId> = netlist.nets_of(a).to_vec();
    for &n in netlist.nets_of(b) {
        if !nets.contains(&n) {
            nets.push(n);
        }
    }
    nets
}

/// The change in total cost that would result from applying `overrides`,
/// without mutating the placement. `affected` should be the union of nets
/// touching every instance named in `overrides`.
pub fn delta_for_overrides(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    affected: &[NetId],
    overrides: &[(InstanceId, Option<SlotId>)],
) -> i64 {
    let mut delta = 0i64;
    for &net in affected {
        if Some(net) == netlist.clock_net() {
            continue;
        }
        let before = net_hpwl(fabric, netlist, placement, net);
        let after = net_hpwl_with_overrides(fabric, netlist, placement, net, overrides);
        delta += after - before;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::DieBox;
    use crate::kinds::{CellKind, SlotKind};
    use crate::netlist::{InstanceSpec, NetSpec};
    use fab_common::ids::SlotId;

    fn fabric() -> Fabric {
        let die = DieBox {
            width: 100,
            height: 100,
        };
        let slots = (0..4)
            .map(|i| crate::fabric::Slot {
                id: SlotId::from_raw(i),
                x: (i as i64) * 10,
                y: 0,
                kind: SlotKind::Logic,
            })
            .collect();
        Fabric::new(die, slots).unwrap()
    }

    fn netlist() -> Netlist {
        let instances = vec![
            InstanceSpec {
                name: "a".into(),
                kind: CellKind::Combinational,
                pins: vec!["Y".into()],
                is_fixed: false,
                fixed_slot: None,
            },
            InstanceSpec {
                name: "b".into(),
                kind: CellKind::Combinational,
                pins: vec!["A".into()],
                is_fixed: false,
                fixed_slot: None,
            },
        ];
        let nets = vec![NetSpec {
            name: "n1".into(),
            driver: ("a".into(), "Y".into()),
            sinks: vec![("b".into(), "A".into())],
        }];
        Netlist::build(instances, nets, None).unwrap()
    }

    #[test]
    fn unplaced_net_contributes_zero() {
        let fabric = fabric();
        let netlist = netlist();
        let placement = PlacementState::new(2, 4);
        assert_eq!(total_cost(&fabric, &netlist, &placement), 0);
    }

    #[test]
    fn two_pin_net_hpwl_is_manhattan_span() {
        let fabric = fabric();
        let netlist = netlist();
        let mut placement = PlacementState::new(2, 4);
        let a = netlist.instance_by_name("a").unwrap();
        let b = netlist.instance_by_name("b").unwrap();
        placement.bind(a, SlotId::from_raw(0));
        placement.bind(b, SlotId::from_raw(2));
        assert_eq!(total_cost(&fabric, &netlist, &placement), 20);
    }

    #[test]
    fn delta_matches_before_after_difference() {
        let fabric = fabric();
        let netlist = netlist();
        let mut placement = PlacementState::new(2, 4);
        let a = netlist.instance_by_name("a").unwrap();
        let b = netlist.instance_by_name("b").unwrap();
        placement.bind(a, SlotId::from_raw(0));
        placement.bind(b, SlotId::from_raw(1));
        let before = total_cost(&fabric, &netlist, &placement);

        let affected = affected_nets(&netlist, a, b);
        let overrides = [(a, Some(SlotId::from_raw(3))), (b, Some(SlotId::from_raw(0)))];
        let delta = delta_for_overrides(&fabric, &netlist, &placement, &affected, &overrides);

        placement.relocate(a, SlotId::from_raw(3));
        placement.relocate(b, SlotId::from_raw(0));
        let after = total_cost(&fabric, &netlist, &placement);
        assert_eq!(before + delta, after);
    }
}
