//! XIRR Solver - annualized rate of return for irregularly dated cash flows
//!
//! This library provides:
//! - Validated, immutable cash flow schedules
//! - XNPV at a given annual rate (actual/365 time fractions)
//! - XIRR via Newton-Raphson with convergence and divergence safeguards
//! - Parallel batch solving of independent schedules
//! - CSV loading of single or grouped schedules

pub mod error;
pub mod schedule;
pub mod solver;
pub mod batch;

// Re-export commonly used types
pub use error::{DivergenceReason, ErrorKind, LoadError, XirrError, XirrResult};
pub use schedule::{CashFlow, Schedule};
pub use solver::{solve, solve_with_config, xnpv, SolverConfig, XirrSolution};
pub use batch::{BatchOutcome, BatchSolver};
