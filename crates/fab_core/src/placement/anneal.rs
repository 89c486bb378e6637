//! Simulated-annealing placement refiner.

use crate::fabric::Fabric;
use crate::kinds::required_slot_kind;
use crate::netlist::Netlist;
use crate::params::SaParams;
use crate::placement::cost::{affected_nets, delta_for_overrides, total_cost};
use crate::placement::state::PlacementState;
use fab_common::ids::{InstanceId, SlotId};
use fab_diagnostics::{Diagnostic, DiagnosticSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Probability of proposing a relocate-to-free-slot move instead of a
/// swap-with-another-instance move, within the "explore" move class.
const RELOCATE_PROBABILITY: f64 = 0.1;

/// Bounded number of redraws before an unsatisfiable windowed move falls
/// through to an unbounded explore move.
const MAX_REDRAWS: usize = 20;

/// A snapshot reported at every temperature-stage boundary.
#[derive(Clone, Copy, Debug)]
pub struct SaTick {
    /// The temperature just cooled from.
    pub temperature: f64,
    /// Move attempts made during this stage.
    pub attempts: usize,
    /// Moves accepted during this stage.
    pub accepts: usize,
    /// Total placement cost after this stage.
    pub current_cost: i64,
    /// Wall-clock time elapsed since `refine` was called.
    pub elapsed_ms: u128,
}

enum MoveKind {
    Swap(InstanceId, InstanceId),
    Relocate(InstanceId, SlotId),
}

struct Proposal {
    kind: MoveKind,
    delta: i64,
}

/// Runs simulated annealing over `placement`, refining it in place.
///
/// `reporter`, if given, is called once per temperature-stage boundary.
/// `cancel`, if given, is polled at the same boundaries; returning `true`
/// stops the run cleanly, leaving a fully legal (if not fully cooled)
/// placement. Returns the final total cost.
pub fn refine(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &mut PlacementState,
    params: &SaParams,
    sink: &DiagnosticSink,
    mut reporter: Option<&mut dyn FnMut(&SaTick)>,
    mut cancel: Option<&mut dyn FnMut() -> bool>,
) -> i64 {
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(params.seed);

    let movable: Vec<InstanceId> = netlist
        .instances()
        .iter()
        .filter(|i| !i.is_fixed)
        .map(|i| i.id)
        .collect();

    let mut current_cost = total_cost(fabric, netlist, placement);

    if params.moves_per_temp == 0 || movable.len() < 2 {
        return current_cost;
    }

    let diameter = fabric.die().diameter().max(1);
    let mut temperature = params.t0;
    let mut stall = 0usize;

    loop {
        let mut attempts = 0usize;
        let mut accepts = 0usize;

        for _ in 0..params.moves_per_temp {
            attempts += 1;
            let proposal = match propose_move(
                fabric,
                netlist,
                placement,
                &movable,
                &mut rng,
                temperature,
                params.t0,
                params.prob_refine,
                params.window_min,
                diameter,
            ) {
                Some(p) => p,
                None => continue,
            };

            let accept = if proposal.delta <= 0 {
                true
            } else if temperature < 1e-12 {
                false
            } else {
                let exponent = -(proposal.delta as f64) / temperature;
                if exponent < -40.0 {
                    false
                } else {
                    rng.gen::<f64>() < exponent.exp()
                }
            };

            if accept {
                apply_move(placement, &proposal);
                current_cost += proposal.delta;
                accepts += 1;
            }
        }

        let stalled = accepts == 0;

        sink.emit(Diagnostic::note(format!(
            "T={:.4} attempts={} accepts={} cost={}",
            temperature, attempts, accepts, current_cost
        )));

        if let Some(cb) = reporter.as_deref_mut() {
            cb(&SaTick {
                temperature,
                attempts,
                accepts,
                current_cost,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }

        temperature *= params.alpha;
        stall = if stalled { stall + 1 } else { 0 };

        let cancelled = cancel.as_deref_mut().map(|cb| cb()).unwrap_or(false);
        if cancelled || temperature < params.t_min || stall >= params.max_stall_temps {
            break;
        }
    }

    current_cost
}

fn apply_move(placement: &mut PlacementState, proposal: &Proposal) {
    match proposal.kind {
        MoveKind::Swap(a, b) => placement.swap(a, b),
        MoveKind::Relocate(i, s) => placement.relocate(i, s),
    }
}

#[allow(clippy::too_many_arguments)]
fn propose_move(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    movable: &[InstanceId],
    rng: &mut StdRng,
    temperature: f64,
    t0: f64,
    prob_refine: f64,
    window_min: i64,
    diameter: i64,
) -> Option<Proposal> {
    let i = movable[rng.gen_range(0..movable.len())];
    let kind = netlist.instance(i).kind;
    let si = placement.slot_of(i)?;

    let refine_move = rng.gen::<f64>() < prob_refine;

    if refine_move {
        let radius = if t0 > 0.0 {
            ((diameter as f64) * temperature / t0).round().max(window_min as f64) as i64
        } else {
            window_min
        };
        if let Some(j) = pick_windowed_partner(fabric, netlist, placement, movable, rng, i, si, radius) {
            return swap_proposal(fabric, netlist, placement, i, j);
        }
        // No windowed partner in range; fall through to an explore move.
    }

    if rng.gen::<f64>() < RELOCATE_PROBABILITY {
        if let Some(dest) = pick_free_slot(fabric, placement, rng, kind) {
            return relocate_proposal(fabric, netlist, placement, i, dest);
        }
    }

    let j = pick_any_partner(netlist, movable, rng, i)?;
    swap_proposal(fabric, netlist, placement, i, j)
}

fn pick_windowed_partner(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    movable: &[InstanceId],
    rng: &mut StdRng,
    i: InstanceId,
    si: SlotId,
    radius: i64,
) -> Option<InstanceId> {
    let kind = netlist.instance(i).kind;
    let pi = fabric.slot(si);
    for _ in 0..MAX_REDRAWS {
        let j = movable[rng.gen_range(0..movable.len())];
        if j == i || netlist.instance(j).kind != kind {
            continue;
        }
        let Some(sj) = placement.slot_of(j) else {
            continue;
        };
        let pj = fabric.slot(sj);
        let dist = (pi.x - pj.x).abs() + (pi.y - pj.y).abs();
        if dist <= radius {
            return Some(j);
        }
    }
    None
}

fn pick_any_partner(
    netlist: &Netlist,
    movable: &[InstanceId],
    rng: &mut StdRng,
    i: InstanceId,
) -> Option<InstanceId> {
    let kind = netlist.instance(i).kind;
    for _ in 0..MAX_REDRAWS {
        let j = movable[rng.gen_range(0..movable.len())];
        if j != i && netlist.instance(j).kind == kind {
            return Some(j);
        }
    }
    None
}

fn pick_free_slot(
    fabric: &Fabric,
    placement: &PlacementState,
    rng: &mut StdRng,
    kind: crate::kinds::CellKind,
) -> Option<SlotId> {
    let slot_kind = required_slot_kind(kind);
    let free: Vec<SlotId> = fabric
        .slots_of_kind(slot_kind)
        .iter()
        .copied()
        .filter(|&s| placement.is_slot_free(s))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}

fn swap_proposal(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    i: InstanceId,
    j: InstanceId,
) -> Option<Proposal> {
    let si = placement.slot_of(i)?;
    let sj = placement.slot_of(j)?;
    let affected = affected_nets(netlist, i, j);
    let overrides = [(i, Some(sj)), (j, Some(si))];
    let delta = delta_for_overrides(fabric, netlist, placement, &affected, &overrides);
    Some(Proposal {
        kind: MoveKind::Swap(i, j),
        delta,
    })
}

fn relocate_proposal(
    fabric: &Fabric,
    netlist: &Netlist,
    placement: &PlacementState,
    i: InstanceId,
    dest: SlotId,
) -> Option<Proposal> {
    let affected = netlist.nets_of(i).to_vec();
    let overrides = [(i, Some(dest))];
    let delta = delta_for_overrides(fabric, netlist, placement, &affected, &overrides);
    Some(Proposal {
        kind: MoveKind::Relocate(i, dest),
        delta,
    })
}
