//! The gate-level netlist: instances, pins, and the nets connecting them.

use crate::kinds::CellKind;
use fab_common::error::FatalError;
use fab_common::ids::{InstanceId, NetId, PinId};
use fab_common::FabResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a pin drives its net or receives from it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PinRole {
    /// The pin drives the net (there is exactly one driver pin per net).
    Driver,
    /// The pin receives from the net.
    Sink,
}

/// A single pin on an instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pin {
    /// The pin's identity.
    pub id: PinId,
    /// The pin's local name on its instance (e.g. `"Q"`, `"D"`, `"CLK"`).
    pub name: String,
    /// The instance this pin belongs to.
    pub instance: InstanceId,
    /// The net this pin is connected to, if any.
    pub net: Option<NetId>,
    /// Whether this pin drives or sinks its net.
    pub role: PinRole,
}

/// A single netlist instance (a gate, flip-flop, IO pad, or tie cell).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    /// The instance's identity.
    pub id: InstanceId,
    /// The instance's logical name, as it appears in the source design.
    pub name: String,
    /// The cell kind of this instance.
    pub kind: CellKind,
    /// The pins belonging to this instance.
    pub pins: Vec<PinId>,
    /// A pre-placed instance: already bound to `fixed_slot` before the
    /// seeder runs, and never moved by the seeder or SA.
    pub is_fixed: bool,
    /// The slot a fixed instance is bound to. `None` for movable instances.
    pub fixed_slot: Option<fab_common::ids::SlotId>,
}

/// A single net: one driver pin plus one or more sink pins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    /// The net's identity.
    pub id: NetId,
    /// The net's logical name.
    pub name: String,
    /// The pin that drives this net.
    pub driver: PinId,
    /// The pins that receive from this net.
    pub sinks: Vec<PinId>,
}

/// A raw instance description, as read from an external design file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// The instance's logical name.
    pub name: String,
    /// The instance's cell kind.
    pub kind: CellKind,
    /// The instance's pin names.
    pub pins: Vec<String>,
    /// Whether this instance is pre-placed.
    #[serde(default)]
    pub is_fixed: bool,
    /// The slot raw id this instance is pre-placed to, if fixed.
    #[serde(default)]
    pub fixed_slot: Option<u32>,
}

/// A raw net description, as read from an external design file: the
/// instance/pin name of the driver, and of every sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetSpec {
    /// The net's logical name.
    pub name: String,
    /// `(instance name, pin name)` of the driver.
    pub driver: (String, String),
    /// `(instance name, pin name)` of every sink.
    pub sinks: Vec<(String, String)>,
}

/// The gate-level netlist.
///
/// Constructed once from raw instance/net specs and never mutated
/// afterwards. Clock tree synthesis and the ECO rewriter both read a
/// `Netlist` but never write to it; [`crate::eco`] instead produces a new
/// one.
#[derive(Clone, Debug)]
pub struct Netlist {
    instances: Vec<Instance>,
    nets: Vec<Net>,
    pins: Vec<Pin>,
    instance_by_name: HashMap<String, InstanceId>,
    /// `nets_of[instance raw id]` lists every net touching one of that
    /// instance's pins, in declaration order — the adjacency view used by
    /// the cost model and the move generators.
    nets_of: Vec<Vec<NetId>>,
    clock_net: Option<NetId>,
}

impl Netlist {
    /// Builds a netlist from raw instance and net specs.
    ///
    /// Fails with [`FatalError::InvalidNetlist`] on a dangling pin
    /// reference, a duplicate instance name, or a net with no driver.
    pub fn build(
        instance_specs: Vec<InstanceSpec>,
        net_specs: Vec<NetSpec>,
        clock_net_name: Option<&str>,
    ) -> FabResult<Self> {
        let mut instances = Vec::with_capacity(instance_specs.len());
        let mut pins = Vec::new();
        let mut instance_by_name = HashMap::new();
        let mut pin_by_ref: HashMap<(String, String), PinId> = HashMap::new();

        for (idx, spec) in instance_specs.iter().enumerate() {
            let inst_id = InstanceId::from_raw(idx as u32);
            if instance_by_name.insert(spec.name.clone(), inst_id).is_some() {
                return Err(FatalError::InvalidNetlist {
                    detail: format!("duplicate instance name '{}'", spec.name),
                    hint: "instance names must be unique".into(),
                });
            }
            let mut pin_ids = Vec::with_capacity(spec.pins.len());
            for pin_name in &spec.pins {
                let pin_id = PinId::from_raw(pins.len() as u32);
                pin_by_ref.insert((spec.name.clone(), pin_name.clone()), pin_id);
                pins.push(Pin {
                    id: pin_id,
                    name: pin_name.clone(),
                    instance: inst_id,
                    net: None,
                    // Overwritten below once nets are processed; sink is the
                    // safe default for a pin that never appears as a driver.
                    role: PinRole::Sink,
                });
                pin_ids.push(pin_id);
            }
            let fixed_slot = spec
                .fixed_slot
                .map(fab_common::ids::SlotId::from_raw);
            if spec.is_fixed && fixed_slot.is_none() {
                return Err(FatalError::InvalidNetlist {
                    detail: format!("instance '{}' is marked fixed with no fixed_slot", spec.name),
                    hint: "fixed instances must specify fixed_slot".into(),
                });
            }
            instances.push(Instance {
                id: inst_id,
                name: spec.name.clone(),
                kind: spec.kind,
                pins: pin_ids,
                is_fixed: spec.is_fixed,
                fixed_slot,
            });
        }

        let mut nets = Vec::with_capacity(net_specs.len());
        let mut nets_of: Vec<Vec<NetId>> = vec![Vec::new(); instances.len()];
        let mut clock_net = None;

        for (idx, spec) in net_specs.iter().enumerate() {
            let net_id = NetId::from_raw(idx as u32);
            let driver_pin = *pin_by_ref.get(&spec.driver).ok_or_else(|| FatalError::InvalidNetlist {
                detail: format!(
                    "net '{}' references unknown driver pin {}.{}",
                    spec.name, spec.driver.0, spec.driver.1
                ),
                hint: "every pin reference must name a declared instance pin".into(),
            })?;
            if spec.sinks.is_empty() {
                return Err(FatalError::InvalidNetlist {
                    detail: format!("net '{}' has no sink pins", spec.name),
                    hint: "every net needs at least one sink".into(),
                });
            }
            let mut sink_pins = Vec::with_capacity(spec.sinks.len());
            for sink_ref in &spec.sinks {
                let pin_id = *pin_by_ref.get(sink_ref).ok_or_else(|| FatalError::InvalidNetlist {
                    detail: format!(
                        "net '{}' references unknown sink pin {}.{}",
                        spec.name, sink_ref.0, sink_ref.1
                    ),
                    hint: "every pin reference must name a declared instance pin".into(),
                })?;
                sink_pins.push(pin_id);
            }

            pins[driver_pin.as_raw() as usize].net = Some(net_id);
            pins[driver_pin.as_raw() as usize].role = PinRole::Driver;
            let driver_inst = pins[driver_pin.as_raw() as usize].instance;
            nets_of[driver_inst.as_raw() as usize].push(net_id);

            for &sink_pin in &sink_pins {
                pins[sink_pin.as_raw() as usize].net = Some(net_id);
                pins[sink_pin.as_raw() as usize].role = PinRole::Sink;
                let sink_inst = pins[sink_pin.as_raw() as usize].instance;
                nets_of[sink_inst.as_raw() as usize].push(net_id);
            }

            if Some(spec.name.as_str()) == clock_net_name {
                clock_net = Some(net_id);
            }

            nets.push(Net {
                id: net_id,
                name: spec.name.clone(),
                driver: driver_pin,
                sinks: sink_pins,
            });
        }

        Ok(Self {
            instances,
            nets,
            pins,
            instance_by_name,
            nets_of,
            clock_net,
        })
    }

    /// All instances, in declaration order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Looks up an instance by id in O(1).
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.as_raw() as usize]
    }

    /// Looks up an instance by its logical name.
    pub fn instance_by_name(&self, name: &str) -> Option<InstanceId> {
        self.instance_by_name.get(name).copied()
    }

    /// Looks up a net by id in O(1).
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.as_raw() as usize]
    }

    /// All nets, in declaration order.
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Looks up a pin by id in O(1).
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.as_raw() as usize]
    }

    /// The net ids touching any pin of the given instance, in the order
    /// those pins were declared.
    pub fn nets_of(&self, instance: InstanceId) -> &[NetId] {
        &self.nets_of[instance.as_raw() as usize]
    }

    /// The net designated as the clock net, if this design declares one.
    pub fn clock_net(&self) -> Option<NetId> {
        self.clock_net
    }

    /// The fanout of an instance: the total sink count across every net it
    /// drives.
    pub fn fanout(&self, instance: InstanceId) -> usize {
        self.nets_of(instance)
            .iter()
            .filter(|&&n| self.net(n).driver_instance(self) == instance)
            .map(|&n| self.net(n).sinks.len())
            .sum()
    }

    /// Sequential (flip-flop) instances, in declaration order.
    pub fn sequential_instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances
            .iter()
            .filter(|i| i.kind == CellKind::Sequential)
    }
}

impl Net {
    /// The instance driving this net.
    pub fn driver_instance(&self, netlist: &Netlist) -> InstanceId {
        netlist.pin(self.driver).instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(name: &str, kind: CellKind, pins: &[&str]) -> InstanceSpec {
        InstanceSpec {
            name: name.into(),
            kind,
            pins: pins.iter().map(|s| s.to_string()).collect(),
            is_fixed: false,
            fixed_slot: None,
        }
    }

    fn net(name: &str, driver: (&str, &str), sinks: &[(&str, &str)]) -> NetSpec {
        NetSpec {
            name: name.into(),
            driver: (driver.0.into(), driver.1.into()),
            sinks: sinks
                .iter()
                .map(|(i, p)| (i.to_string(), p.to_string()))
                .collect(),
        }
    }

    fn small_netlist() -> Netlist {
        let instances = vec![
            inst("a", CellKind::Combinational, &["Y"]),
            inst("b", CellKind::Combinational, &["A", "Y"]),
            inst("c", CellKind::Combinational, &["A"]),
        ];
        let nets = vec![
            net("n1", ("a", "Y"), &[("b", "A")]),
            net("n2", ("b", "Y"), &[("c", "A")]),
        ];
        Netlist::build(instances, nets, None).unwrap()
    }

    #[test]
    fn builds_adjacency() {
        let nl = small_netlist();
        let a = nl.instance_by_name("a").unwrap();
        let b = nl.instance_by_name("b").unwrap();
        assert_eq!(nl.nets_of(a).len(), 1);
        assert_eq!(nl.nets_of(b).len(), 2);
    }

    #[test]
    fn fanout_counts_sinks_of_driven_nets() {
        let nl = small_netlist();
        let a = nl.instance_by_name("a").unwrap();
        assert_eq!(nl.fanout(a), 1);
    }

    #[test]
    fn dangling_pin_is_invalid_netlist() {
        let instances = vec![inst("a", CellKind::Combinational, &["Y"])];
        let nets = vec![net("n1", ("a", "Y"), &[("ghost", "A")])];
        let err = Netlist::build(instances, nets, None).unwrap_err();
        assert!(matches!(err, FatalError::InvalidNetlist { .. }));
    }

    #[test]
    fn duplicate_instance_name_is_invalid_netlist() {
        let instances = vec![
            inst("a", CellKind::Combinational, &["Y"]),
            inst("a", CellKind::Combinational, &["Y"]),
        ];
        let err = Netlist::build(instances, vec![], None).unwrap_err();
        assert!(matches!(err, FatalError::InvalidNetlist { .. }));
    }

    #[test]
    fn net_with_no_sinks_is_invalid_netlist() {
        let instances = vec![inst("a", CellKind::Combinational, &["Y"])];
        let nets = vec![net("n1", ("a", "Y"), &[])];
        let err = Netlist::build(instances, nets, None).unwrap_err();
        assert!(matches!(err, FatalError::InvalidNetlist { .. }));
    }

    #[test]
    fn clock_net_is_recognized_by_name() {
        let instances = vec![
            inst("clkgen", CellKind::Io, &["Y"]),
            inst("dff0", CellKind::Sequential, &["CLK", "D", "Q"]),
        ];
        let nets = vec![net("clk", ("clkgen", "Y"), &[("dff0", "CLK")])];
        let nl = Netlist::build(instances, nets, Some("clk")).unwrap();
        assert!(nl.clock_net().is_some());
    }

    #[test]
    fn fixed_without_slot_is_invalid_netlist() {
        let instances = vec![InstanceSpec {
            name: "a".into(),
            kind: CellKind::Combinational,
            pins: vec!["Y".into()],
            is_fixed: true,
            fixed_slot: None,
        }];
        let err = Netlist::build(instances, vec![], None).unwrap_err();
        assert!(matches!(err, FatalError::InvalidNetlist { .. }));
    }
}
