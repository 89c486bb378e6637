//! The top-level placement session: wires the fabric, netlist, placement
//! state, and diagnostic sink together and drives the full pipeline.

use crate::cts::{self, ClockTree};
use crate::eco::{self, EcoNetlist};
use crate::fabric::Fabric;
use crate::netlist::Netlist;
use crate::params::{CtsParams, SaParams};
use crate::placement::anneal::{self, SaTick};
use crate::placement::greedy;
use crate::placement::state::PlacementState;
use crate::placement::total_cost;
use crate::report::{ClockTreeReport, PlacementMap, ResourceUsage};
use fab_common::FabResult;
use fab_diagnostics::DiagnosticSink;

/// Everything produced by a completed run: the final placement cost, the
/// synthesized clock tree (if the design has any DFFs), the rewritten ECO
/// netlist, and the reports derived from the final placement.
pub struct SessionResult {
    /// Final total HPWL cost after annealing.
    pub final_cost: i64,
    /// The synthesized clock tree, if the design has sequential instances.
    pub clock_tree: Option<ClockTree>,
    /// The rewritten, gate-level netlist.
    pub eco_netlist: EcoNetlist,
    /// The primary artefact: `instance_name slot_id x_um y_um`, sorted by
    /// instance name.
    pub placement_map: PlacementMap,
    /// Slot utilization by kind.
    pub resource_usage: ResourceUsage,
    /// A flattened, serializable view of `clock_tree`, if one was built.
    pub clock_tree_report: Option<ClockTreeReport>,
}

/// Owns the immutable fabric and netlist, the one mutable placement state,
/// and the diagnostic sink, and runs them through the full pipeline: seed,
/// anneal, synthesize clock tree, rewrite.
pub struct Session {
    fabric: Fabric,
    netlist: Netlist,
    placement: PlacementState,
    sink: DiagnosticSink,
}

impl Session {
    /// Creates a new session, binding every fixed instance up front.
    ///
    /// Fails with [`fab_common::error::FatalError::KindMismatch`] if a
    /// fixed instance's declared slot doesn't match its cell kind.
    pub fn new(fabric: Fabric, netlist: Netlist) -> FabResult<Self> {
        let mut placement = PlacementState::new(netlist.instances().len(), fabric.len());
        for inst in netlist.instances() {
            if inst.is_fixed {
                if let Some(slot) = inst.fixed_slot {
                    let slot_kind = fabric.slot(slot).kind;
                    placement.bind_checked(inst.id, &inst.name, inst.kind, slot, slot_kind)?;
                }
            }
        }
        Ok(Self {
            fabric,
            netlist,
            placement,
            sink: DiagnosticSink::new(),
        })
    }

    /// Read-only access to the fabric.
    pub fn fabric(&self) -> &Fabric {
        &self.fabric
    }

    /// Read-only access to the netlist.
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Read-only access to the current placement.
    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    /// The diagnostic sink accumulating notes and warnings from the run.
    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Runs the full pipeline: greedy seed, SA refine, clock tree
    /// synthesis, ECO rewrite.
    pub fn run(
        &mut self,
        sa_params: &SaParams,
        cts_params: &CtsParams,
        reporter: Option<&mut dyn FnMut(&SaTick)>,
        cancel: Option<&mut dyn FnMut() -> bool>,
    ) -> FabResult<SessionResult> {
        greedy::seed(&self.fabric, &self.netlist, &mut self.placement)?;
        let final_cost = anneal::refine(
            &self.fabric,
            &self.netlist,
            &mut self.placement,
            sa_params,
            &self.sink,
            reporter,
            cancel,
        );
        let clock_tree = cts::synthesize(&self.fabric, &self.netlist, &self.placement, cts_params)?;
        let eco_netlist = eco::rewrite(&self.netlist, &self.placement, clock_tree.as_ref())?;

        let placement_map = PlacementMap::build(&self.fabric, &self.netlist, &self.placement);
        let resource_usage = ResourceUsage::build(&self.fabric, &self.placement);
        let clock_tree_report = clock_tree
            .as_ref()
            .map(|tree| ClockTreeReport::build(tree, &self.fabric, &self.placement));

        Ok(SessionResult {
            final_cost,
            clock_tree,
            eco_netlist,
            placement_map,
            resource_usage,
            clock_tree_report,
        })
    }

    /// The current total HPWL cost, without running any further passes.
    pub fn current_cost(&self) -> i64 {
        total_cost(&self.fabric, &self.netlist, &self.placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::{DieBox, Slot};
    use crate::kinds::{CellKind, SlotKind};
    use crate::netlist::{InstanceSpec, NetSpec};
    use fab_common::ids::SlotId;

    fn fabric() -> Fabric {
        let die = DieBox {
            width: 100,
            height: 10,
        };
        let slots = (0..6)
            .map(|i| Slot {
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
                pins: vec!["A".into(), "Y".into()],
                is_fixed: false,
                fixed_slot: None,
            },
            InstanceSpec {
                name: "c".into(),
                kind: CellKind::Combinational,
                pins: vec!["A".into()],
                is_fixed: false,
                fixed_slot: None,
            },
        ];
        let nets = vec![
            NetSpec {
                name: "n1".into(),
                driver: ("a".into(), "Y".into()),
                sinks: vec![("b".into(), "A".into())],
            },
            NetSpec {
                name: "n2".into(),
                driver: ("b".into(), "Y".into()),
                sinks: vec![("c".into(), "A".into())],
            },
        ];
        Netlist::build(instances, nets, None).unwrap()
    }

    #[test]
    fn full_pipeline_runs_end_to_end() {
        let mut session = Session::new(fabric(), netlist()).unwrap();
        let result = session
            .run(&SaParams::classic(), &CtsParams::default(), None, None)
            .unwrap();
        assert!(result.clock_tree.is_none());
        assert_eq!(result.eco_netlist.cells.len(), 3);
        assert!(result.final_cost >= 0);
    }

    #[test]
    fn fixed_instances_are_bound_before_seeding() {
        let instances = vec![InstanceSpec {
            name: "pad".into(),
            kind: CellKind::Combinational,
            pins: vec!["Y".into()],
            is_fixed: true,
            fixed_slot: Some(3),
        }];
        let netlist = Netlist::build(instances, vec![], None).unwrap();
        let session = Session::new(fabric(), netlist).unwrap();
        let pad = session.netlist().instance_by_name("pad").unwrap();
        assert_eq!(session.placement().slot_of(pad), Some(SlotId::from_raw(3)));
    }

    #[test]
    fn fixed_instance_with_wrong_slot_kind_is_kind_mismatch() {
        let instances = vec![InstanceSpec {
            name: "pad".into(),
            kind: CellKind::Sequential,
            pins: vec!["Q".into()],
            is_fixed: true,
            fixed_slot: Some(3),
        }];
        let netlist = Netlist::build(instances, vec![], None).unwrap();
        let err = Session::new(fabric(), netlist).unwrap_err();
        assert!(matches!(err, fab_common::error::FatalError::KindMismatch { .. }));
    }
}
