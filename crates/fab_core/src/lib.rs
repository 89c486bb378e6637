//! The structured-ASIC placement engine: fabric and netlist models, the
//! HPWL cost model, the greedy seeder, the simulated-annealing refiner,
//! H-tree clock tree synthesis, and the ECO netlist rewriter.

pub mod cts;
pub mod eco;
pub mod fabric;
pub mod kinds;
pub mod netlist;
pub mod params;
pub mod placement;
pub mod report;
pub mod session;

pub use cts::ClockTree;
pub use eco::EcoNetlist;
pub use fabric::{DieBox, Fabric, Slot};
pub use kinds::{CellKind, SlotKind};
pub use netlist::{Instance, InstanceSpec, Net, NetSpec, Netlist, Pin, PinRole};
pub use params::{CtsParams, ParamError, SaParams};
pub use placement::{PlacementState, SaTick};
pub use session::{Session, SessionResult};
