//! Fab CLI — the command-line interface for the placement engine.
//!
//! Provides `fab place` for running the full seed/anneal/CTS/ECO pipeline
//! over a fabric description and a gate-level design.

#![warn(missing_docs)]

mod load;

use clap::{Parser, Subcommand};
use fab_core::{CtsParams, SaParams, Session};
use std::path::PathBuf;
use std::process;

/// Fab — a structured-ASIC placement engine.
#[derive(Parser, Debug)]
#[command(name = "fab", version, about = "Structured ASIC placement engine")]
pub struct Cli {
    /// Suppress per-temperature SA trace lines.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place a design onto a fabric and emit the rewritten ECO netlist.
    Place(PlaceArgs),
}

/// Arguments for the `fab place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Path to the fabric description (JSON).
    #[arg(long)]
    pub fabric: PathBuf,

    /// Path to the gate-level design description (JSON).
    #[arg(long)]
    pub design: PathBuf,

    /// Random seed driving every stochastic SA decision.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Initial SA temperature.
    #[arg(long, default_value_t = 100.0)]
    pub t0: f64,

    /// Geometric cooling factor.
    #[arg(long, default_value_t = 0.92)]
    pub alpha: f64,

    /// Move attempts per temperature stage.
    #[arg(long = "moves-per-temp", default_value_t = 200)]
    pub moves_per_temp: usize,

    /// Probability of a windowed "refine" move over an unbounded "explore"
    /// move.
    #[arg(long = "prob-refine", default_value_t = 0.50)]
    pub prob_refine: f64,

    /// Temperature floor; annealing stops once below this.
    #[arg(long = "t-min", default_value_t = 1e-3)]
    pub t_min: f64,

    /// Consecutive all-reject temperature stages before stopping early.
    #[arg(long = "max-stall", default_value_t = 5)]
    pub max_stall: usize,

    /// Maximum DFF sinks a single clock buffer may drive.
    #[arg(long = "max-fanout", default_value_t = 4)]
    pub max_fanout: usize,

    /// Floor on the refine-move window radius.
    #[arg(long = "window-min", default_value_t = 1)]
    pub window_min: i64,

    /// Write the rewritten ECO netlist to this path instead of stderr.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the placement map (`instance_name slot_id x_um y_um`, sorted
    /// by instance name, the primary artefact of a run) to this path
    /// instead of stdout.
    #[arg(long = "placement-map")]
    pub placement_map: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Place(ref args) => run_place(args, cli.quiet),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn run_place(args: &PlaceArgs, quiet: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let fabric = load::load_fabric(&args.fabric)?;
    let netlist = load::load_design(&args.design)?;

    let sa_params = SaParams {
        seed: args.seed,
        t0: args.t0,
        alpha: args.alpha,
        moves_per_temp: args.moves_per_temp,
        prob_refine: args.prob_refine,
        t_min: args.t_min,
        max_stall_temps: args.max_stall,
        window_min: args.window_min,
    };
    sa_params.validate()?;
    let cts_params = CtsParams {
        max_fanout: args.max_fanout,
    };

    let mut session = Session::new(fabric, netlist)?;

    let mut reporter = |tick: &fab_core::SaTick| {
        if !quiet {
            eprintln!(
                "T={:.4} attempts={} accepts={} cost={} elapsed_ms={}",
                tick.temperature, tick.attempts, tick.accepts, tick.current_cost, tick.elapsed_ms
            );
        }
    };

    let result = session.run(&sa_params, &cts_params, Some(&mut reporter), None)?;

    for diag in session.sink().take_all() {
        eprintln!("{}: {}", diag.severity, diag.message);
    }

    let placement_map = result.placement_map.render();
    match &args.placement_map {
        Some(path) => std::fs::write(path, &placement_map)?,
        None => print!("{placement_map}"),
    }

    let rendered = serde_json::to_string_pretty(&result.eco_netlist)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => eprintln!("{rendered}"),
    }

    eprintln!("final cost: {}", result.final_cost);
    Ok(0)
}
