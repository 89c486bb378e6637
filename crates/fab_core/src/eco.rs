//! The ECO rewriter: a pure function from (netlist, placement, clock tree)
//! to a new, tool-agnostic gate-level netlist with clock buffers inserted
//! and every instance renamed to its canonical slot name.

use crate::cts::{ClockChild, ClockNode, ClockTree};
use crate::kinds::CellKind;
use crate::netlist::{Netlist, PinRole};
use crate::placement::state::PlacementState;
use fab_common::error::FatalError;
use fab_common::ids::InstanceId;
use fab_common::FabResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A cell in the rewritten netlist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EcoCell {
    /// The canonical name this cell was rewritten to (`slot_<id>`).
    pub name: String,
    /// The instance's original logical name, kept for traceability.
    pub original_name: String,
    /// The cell kind.
    pub kind: CellKind,
    /// The cell's pin names.
    pub pins: Vec<String>,
}

/// A net in the rewritten netlist, expressed as `cell.pin` references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EcoNet {
    /// The net's name.
    pub name: String,
    /// `cell.pin` of the driver.
    pub driver: String,
    /// `cell.pin` of every sink.
    pub sinks: Vec<String>,
}

/// The rewritten, gate-level, tool-agnostic netlist produced by the ECO
/// rewriter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EcoNetlist {
    /// Every cell, original instances plus synthesized clock buffers.
    pub cells: Vec<EcoCell>,
    /// Every net, with clock fanout rewired through the synthesized tree.
    pub nets: Vec<EcoNet>,
}

/// Rewrites a placed netlist into its ECO form.
///
/// Fails with [`FatalError::EcoConflict`] if any instance lacks a slot
/// binding, or if two instances (including synthesized buffers) resolve to
/// the same canonical name.
pub fn rewrite(netlist: &Netlist, placement: &PlacementState, clock_tree: Option<&ClockTree>) -> FabResult<EcoNetlist> {
    let mut cells = Vec::new();
    let mut nets = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    let mut canonical = |inst: InstanceId| -> FabResult<String> {
        let slot = placement.slot_of(inst).ok_or_else(|| FatalError::EcoConflict {
            detail: format!("instance '{}' has no slot binding", netlist.instance(inst).name),
            hint: "run placement to completion before ECO rewriting".into(),
        })?;
        Ok(format!("slot_{}", slot.as_raw()))
    };

    for inst in netlist.instances() {
        let name = canonical(inst.id)?;
        if !seen_names.insert(name.clone()) {
            return Err(FatalError::EcoConflict {
                detail: format!("canonical name '{}' assigned to more than one cell", name),
                hint: "two instances resolved to the same slot".into(),
            });
        }
        cells.push(EcoCell {
            name,
            original_name: inst.name.clone(),
            kind: inst.kind,
            pins: inst.pins.iter().map(|p| netlist.pin(*p).name.clone()).collect(),
        });
    }

    let clock_net = netlist.clock_net();

    for net in netlist.nets() {
        if Some(net.id) == clock_net {
            // The flat clock net's fanout is replaced below by the buffer
            // tree; here it is trimmed to drive only the root buffer.
            continue;
        }
        let driver_inst = netlist.pin(net.driver).instance;
        let driver_ref = format!("{}.{}", canonical(driver_inst)?, netlist.pin(net.driver).name);

        let mut sinks = Vec::with_capacity(net.sinks.len());
        for &sink_pin in &net.sinks {
            let sink_inst = netlist.pin(sink_pin).instance;
            // A DFF's clock pin is handled by the clock tree below, not by
            // its original net membership (it has none, since clock nets
            // are excluded above) — this branch only ever sees data nets.
            sinks.push(format!("{}.{}", canonical(sink_inst)?, netlist.pin(sink_pin).name));
        }
        nets.push(EcoNet {
            name: net.name.clone(),
            driver: driver_ref,
            sinks,
        });
    }

    if let (Some(tree), Some(clk_net_id)) = (clock_tree, clock_net) {
        let clk_net = netlist.net(clk_net_id);
        let port_ref = format!("{}.{}", canonical(netlist.pin(clk_net.driver).instance)?, netlist.pin(clk_net.driver).name);

        let mut buffer_cells = Vec::new();
        let mut buffer_nets = Vec::new();
        emit_buffer(
            &tree.root,
            netlist,
            clk_net_id,
            &mut canonical,
            &mut buffer_cells,
            &mut buffer_nets,
        )?;

        nets.push(EcoNet {
            name: clk_net.name.clone(),
            driver: port_ref,
            sinks: vec![format!("{}.I", tree.root.name)],
        });

        cells.extend(buffer_cells);
        nets.extend(buffer_nets);
    }

    Ok(EcoNetlist { cells, nets })
}

fn emit_buffer(
    node: &ClockNode,
    netlist: &Netlist,
    clock_net: fab_common::ids::NetId,
    canonical: &mut impl FnMut(InstanceId) -> FabResult<String>,
    cells: &mut Vec<EcoCell>,
    nets: &mut Vec<EcoNet>,
) -> FabResult<()> {
    cells.push(EcoCell {
        name: node.name.clone(),
        original_name: node.name.clone(),
        kind: CellKind::Combinational,
        pins: vec!["I".into(), "O".into()],
    });

    let mut sinks = Vec::with_capacity(node.children.len());
    for child in &node.children {
        match child {
            ClockChild::Buffer(b) => {
                emit_buffer(b, netlist, clock_net, canonical, cells, nets)?;
                sinks.push(format!("{}.I", b.name));
            }
            ClockChild::Sink(inst) => {
                let clk_pin_name = netlist
                    .instance(*inst)
                    .pins
                    .iter()
                    .map(|p| netlist.pin(*p))
                    .find(|p| p.role == PinRole::Sink && p.net == Some(clock_net))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "CLK".to_string());
                sinks.push(format!("{}.{}", canonical(*inst)?, clk_pin_name));
            }
        }
    }

    nets.push(EcoNet {
        name: format!("{}_net", node.name),
        driver: format!("{}.O", node.name),
        sinks,
    });

    Ok(())
}
