//! Command-line driver for the composite press pipeline.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use composite_press::{EffectiveStiffness, MacroSolution, Pipeline, PipelineConfig, Result, Scenario};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "composite_press")]
#[command(version, about = "Two-scale homogenization of fiber-reinforced pressed blocks")]
struct Cli {
    /// Path to a TOML configuration (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the output directory
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Do not write meshes or fields to disk
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh scenarios and persist meshes plus subdomain tags
    Mesh {
        /// Scenarios to mesh (rve, press, block, coarse, sparse); all when empty
        #[arg(short, long)]
        scenario: Vec<String>,
    },

    /// Homogenize the unit cell and print the effective stiffness
    Homogenize,

    /// Fully resolved two-phase solve
    Direct {
        #[arg(short, long, default_value = "block")]
        scenario: String,
    },

    /// Coarse solve with the homogenized stiffness
    Coarse {
        #[arg(short, long, default_value = "sparse")]
        scenario: String,

        /// Reuse a persisted effective stiffness instead of homogenizing again
        #[arg(long)]
        reuse: bool,
    },

    /// Mesh everything, homogenize, then solve the coarse scale
    Run {
        #[arg(short, long, default_value = "sparse")]
        scenario: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("composite_press=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.output {
        config.output.directory = dir.clone();
    }
    if cli.no_persist {
        config.output.persist = false;
    }
    Ok(config)
}

/// Returns `Ok(false)` when some scenario of a batch failed
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    config.log_summary();
    let pipeline = Pipeline::new(config)?;

    match cli.command {
        Commands::Mesh { scenario } => {
            let scenarios = if scenario.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                scenario.iter().map(|s| s.parse()).collect::<Result<Vec<Scenario>>>()?
            };
            mesh_all(&pipeline, &scenarios)
        }
        Commands::Homogenize => {
            let result = pipeline.homogenize()?;
            print_stiffness(&result.effective);
            Ok(true)
        }
        Commands::Direct { scenario } => {
            let solution = pipeline.solve_direct(scenario.parse()?)?;
            print_solution(&solution);
            Ok(true)
        }
        Commands::Coarse { scenario, reuse } => {
            let effective = effective_stiffness(&pipeline, reuse)?;
            let solution = pipeline.solve_coarse(scenario.parse()?, &effective)?;
            print_solution(&solution);
            Ok(true)
        }
        Commands::Run { scenario } => {
            let meshed = mesh_all(&pipeline, &Scenario::ALL)?;
            let (homogenized, solution) = pipeline.run_two_scale(scenario.parse()?)?;
            print_stiffness(&homogenized.effective);
            print_solution(&solution);
            Ok(meshed)
        }
    }
}

fn mesh_all(pipeline: &Pipeline, scenarios: &[Scenario]) -> Result<bool> {
    let outcomes = pipeline.run_all(scenarios);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    for outcome in &outcomes {
        if let Ok(report) = &outcome.result {
            println!(
                "{:>8}: {:>7} nodes {:>7} cells {:>4} subdomains",
                report.scenario,
                report.stats.num_nodes,
                report.stats.num_cells,
                report.num_subdomains()
            );
        }
    }
    if failed > 0 {
        warn!("{} of {} scenario(s) failed", failed, outcomes.len());
    }
    Ok(failed == 0)
}

fn effective_stiffness(pipeline: &Pipeline, reuse: bool) -> Result<EffectiveStiffness> {
    if reuse {
        if let Some(store) = pipeline.store() {
            if store.stiffness_path(Scenario::Rve.name()).exists() {
                info!("Reusing persisted effective stiffness");
                return store.load_effective_stiffness(Scenario::Rve.name());
            }
        }
        warn!("No persisted effective stiffness, homogenizing");
    }
    Ok(pipeline.homogenize()?.effective)
}

fn print_stiffness(effective: &EffectiveStiffness) {
    println!("Effective stiffness [xx, xy, yy]:");
    let m = effective.matrix();
    for i in 0..3 {
        println!("  {:>12.4e} {:>12.4e} {:>12.4e}", m[(i, 0)], m[(i, 1)], m[(i, 2)]);
    }
    println!("  symmetry defect: {:.2e}", effective.symmetry_defect());
}

fn print_solution(solution: &MacroSolution) {
    println!("{}:", solution.scenario);
    println!("  max |u|:             {:.4e}", solution.max_displacement());
    println!(
        "  applied force:       ({:.4e}, {:.4e})",
        solution.applied_force.x, solution.applied_force.y
    );
    println!(
        "  support reaction:    ({:.4e}, {:.4e})",
        solution.support_force.x, solution.support_force.y
    );
    println!("  equilibrium defect:  {:.2e}", solution.equilibrium_defect());
}
