//! XIRR solving for dated cash flow schedules

mod config;
mod npv;
mod xirr;

pub use config::{
    SolverConfig, DEFAULT_GUESS, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_DERIVATIVE,
    DEFAULT_TOLERANCE,
};
pub use npv::{npv_and_derivative, xnpv};
pub use xirr::{solve, solve_with_config, XirrSolution};
