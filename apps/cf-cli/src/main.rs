use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use cf_results::{
    FieldStore, PRESSURE_STREAM, RunManifest, TEMPERATURE_STREAM, VELOCITY_STREAM,
};
use cf_sim::{OutputStreams, RunRecord, SimError, StepProgressEvent, run};
use cf_solver::{DirectStep, NewtonStep, Parameters, State, cavity_space};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "Cavityflow CLI - buoyancy-driven cavity simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the differentially heated cavity benchmark
    Run {
        /// Output directory for the run
        out_dir: PathBuf,
        /// Per-step solve strategy
        #[arg(long, value_enum, default_value_t = Strategy::Direct)]
        strategy: Strategy,
        /// Global mesh bisection levels (cells per side = 2^levels)
        #[arg(long, default_value_t = 4)]
        levels: u32,
        /// Number of time steps
        #[arg(long, default_value_t = 2)]
        steps: usize,
        /// Final simulation time
        #[arg(long, default_value_t = 1e-5)]
        t_final: f64,
    },
    /// Summarize a stored run
    Show {
        /// Directory of a previous run
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    /// Backend nonlinear solve with a consistent tangent
    Direct,
    /// Explicit Newton loop on the hand-linearized system
    Newton,
}

impl Strategy {
    fn label(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Newton => "newton",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            out_dir,
            strategy,
            levels,
            steps,
            t_final,
        } => cmd_run(&out_dir, strategy, levels, steps, t_final),
        Commands::Show { out_dir } => cmd_show(&out_dir),
    }
}

fn cmd_run(
    out_dir: &Path,
    strategy: Strategy,
    levels: u32,
    steps: usize,
    t_final: f64,
) -> Result<(), SimError> {
    let params = Parameters {
        mesh_levels: levels,
        num_steps: steps,
        final_time: t_final,
        ..Parameters::default()
    };
    let space = cavity_space(&params)?;

    println!(
        "Running cavity benchmark: {} strategy, {} cells, dt = {:.3e}",
        strategy.label(),
        space.mesh().cell_count(),
        params.dt()
    );

    let store = FieldStore::new(out_dir.to_path_buf())?;
    store.save_manifest(&RunManifest::new(
        strategy.label(),
        space.mesh().cell_count(),
        params.dt(),
        params.final_time,
        params.num_steps,
    ))?;
    let mut streams = OutputStreams::for_store(&store)?;

    let mut render = |event: &StepProgressEvent| {
        print!(
            "\r[step {}/{}] t={:.3e}  iterations={}  residual={:.3e}  {:>5.1}%",
            event.step + 1,
            steps,
            event.time,
            event.iterations,
            event.residual_norm,
            event.fraction_complete * 100.0
        );
        let _ = io::stdout().flush();
    };

    let record = match strategy {
        Strategy::Direct => {
            let initial = State::rest(&space);
            let mut solver = DirectStep::new(&space, &params, &initial)?;
            run(
                &space,
                &params,
                &mut solver,
                initial,
                &mut streams,
                Some(&mut render),
            )?
        }
        Strategy::Newton => {
            let initial = State::conduction(&space, &params);
            let mut solver = NewtonStep::new(&space, &params, &initial)?;
            run(
                &space,
                &params,
                &mut solver,
                initial,
                &mut streams,
                Some(&mut render),
            )?
        }
    };
    println!();

    print_run_summary(&record, out_dir);
    Ok(())
}

fn print_run_summary(record: &RunRecord, out_dir: &Path) {
    println!(
        "✓ Completed {} time steps into {}",
        record.steps.len(),
        out_dir.display()
    );
    if let Some(last) = record.steps.last() {
        println!(
            "  Final step: {} iterations, residual {:.3e}",
            last.iterations, last.residual_norm
        );
    }
}

fn cmd_show(out_dir: &Path) -> Result<(), SimError> {
    let store = FieldStore::new(out_dir.to_path_buf())?;
    let manifest = store.load_manifest()?;

    println!("Run in {}:", out_dir.display());
    println!(
        "  strategy={}  cells={}  dt={:.3e}  steps={}  recorded {}",
        manifest.strategy, manifest.mesh_cells, manifest.dt, manifest.num_steps, manifest.timestamp
    );

    for stream in [VELOCITY_STREAM, PRESSURE_STREAM, TEMPERATURE_STREAM] {
        let snapshots = store.load_stream(stream)?;
        println!("  {} ({} snapshots):", stream, snapshots.len());
        for s in &snapshots {
            println!(
                "    step {}  t={:.3e}  max |{}| = {:.6e}",
                s.step,
                s.time,
                s.field,
                s.max_magnitude()
            );
        }
    }
    Ok(())
}
