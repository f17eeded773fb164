//! XIRR CLI
//!
//! Solves the XIRR of cash flow schedules read from CSV.
//! Solver defaults can be set via environment variables:
//!   XIRR_GUESS, XIRR_MAX_ITERATIONS, XIRR_TOLERANCE
//! Command-line flags override the environment.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use xirr_solver::schedule::{load_schedule, load_schedules};
use xirr_solver::{solve_with_config, BatchSolver, Schedule, SolverConfig, XirrSolution};

#[derive(Parser, Debug)]
#[command(
    name = "xirr",
    version,
    about = "Annualized internal rate of return for dated cash flows"
)]
struct Args {
    /// CSV file with `date,amount` columns (plus `schedule_id` with --grouped)
    file: PathBuf,

    /// Treat the file as several schedules keyed by `schedule_id`
    #[arg(long)]
    grouped: bool,

    /// Starting annual rate
    #[arg(long)]
    guess: Option<f64>,

    /// Maximum Newton iterations
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Convergence threshold on |NPV|, in currency units
    #[arg(long)]
    tolerance: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::from_env();
        if let Some(guess) = self.guess {
            config = config.with_guess(guess);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        config
    }
}

#[derive(Serialize)]
struct SingleResponse<'a> {
    cashflow_count: usize,
    origin: String,
    span_days: i64,
    #[serde(flatten)]
    solution: &'a XirrSolution,
    rate_pct: f64,
    execution_time_us: u64,
}

fn run_single(args: &Args, config: &SolverConfig) -> Result<()> {
    let start = Instant::now();
    let schedule: Schedule = load_schedule(&args.file)
        .with_context(|| format!("Failed to load schedule from {}", args.file.display()))?;

    let solution = solve_with_config(&schedule, config).context("XIRR calculation failed")?;

    if args.json {
        let response = SingleResponse {
            cashflow_count: schedule.len(),
            origin: schedule.origin().to_string(),
            span_days: schedule.span_days(),
            solution: &solution,
            rate_pct: solution.as_percent(),
            execution_time_us: start.elapsed().as_micros() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Cash flows:  {}", schedule.len());
        println!("Span:        {} days from {}", schedule.span_days(), schedule.origin());
        println!("Iterations:  {}", solution.iterations);
        println!("XIRR:        {:.4}%", solution.as_percent());
    }
    Ok(())
}

fn run_grouped(args: &Args, config: &SolverConfig) -> Result<()> {
    let schedules = load_schedules(&args.file)
        .with_context(|| format!("Failed to load schedules from {}", args.file.display()))?;

    let outcomes = BatchSolver::new(*config).solve_keyed(&schedules);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        println!("{:<20} {:>6} {:>12}  {}", "Schedule", "Flows", "XIRR", "Status");
        println!("{}", "-".repeat(60));
        for outcome in &outcomes {
            let rate = outcome
                .rate_pct
                .map(|pct| format!("{:.4}%", pct))
                .unwrap_or_else(|| "-".to_string());
            let status = outcome.error.as_deref().unwrap_or("ok");
            println!(
                "{:<20} {:>6} {:>12}  {}",
                outcome.schedule_id, outcome.cashflow_count, rate, status
            );
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} schedules could not be solved", failed, outcomes.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.solver_config();
    log::debug!("Solver config: {:?}", config);

    if args.grouped {
        run_grouped(&args, &config)
    } else {
        run_single(&args, &config)
    }
}
