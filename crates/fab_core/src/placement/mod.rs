//! Placement: the instance-to-slot bijection, its cost model, the greedy
//! seeder, and the simulated-annealing refiner.

pub mod anneal;
pub mod cost;
pub mod greedy;
pub mod state;

pub use anneal::{refine, SaTick};
pub use cost::total_cost;
pub use state::PlacementState;
