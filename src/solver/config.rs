//! Solver configuration

use serde::Deserialize;
use std::env;

use crate::error::{XirrError, XirrResult};

/// Default starting rate for Newton iteration (10%)
pub const DEFAULT_GUESS: f64 = 0.1;

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Default convergence threshold on |NPV|
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Default smallest usable |NPV'(r)|
pub const DEFAULT_MIN_DERIVATIVE: f64 = 1e-10;

fn default_guess() -> f64 {
    DEFAULT_GUESS
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_min_derivative() -> f64 {
    DEFAULT_MIN_DERIVATIVE
}

/// Configuration for a single XIRR solve
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SolverConfig {
    /// Starting annual rate (0.1 = 10%)
    #[serde(default = "default_guess")]
    pub initial_guess: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Converged once |NPV(r)| falls below this
    ///
    /// Absolute, in the schedule's currency units. Scale it with the notional:
    /// a schedule in the billions cannot reach 1e-7 in f64 and will end in a
    /// convergence error even at the exact rate.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Derivatives smaller than this in magnitude abort the solve
    #[serde(default = "default_min_derivative")]
    pub min_derivative: f64,
}

impl SolverConfig {
    pub fn with_guess(mut self, guess: f64) -> Self {
        self.initial_guess = guess;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Read overrides from the environment:
    ///   XIRR_GUESS, XIRR_MAX_ITERATIONS, XIRR_TOLERANCE
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let initial_guess: f64 = env::var("XIRR_GUESS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.initial_guess);

        let max_iterations: u32 = env::var("XIRR_MAX_ITERATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_iterations);

        let tolerance: f64 = env::var("XIRR_TOLERANCE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.tolerance);

        Self {
            initial_guess,
            max_iterations,
            tolerance,
            ..defaults
        }
    }

    /// Reject configurations that cannot start an iteration
    pub fn validate(&self) -> XirrResult<()> {
        if !self.initial_guess.is_finite() || self.initial_guess <= -1.0 {
            return Err(XirrError::validation(format!(
                "initial guess must be finite and greater than -1, got {}",
                self.initial_guess
            )));
        }
        if self.max_iterations == 0 {
            return Err(XirrError::validation("max_iterations must be at least 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(XirrError::validation(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !self.min_derivative.is_finite() || self.min_derivative < 0.0 {
            return Err(XirrError::validation(format!(
                "min_derivative must be non-negative, got {}",
                self.min_derivative
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_GUESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            min_derivative: DEFAULT_MIN_DERIVATIVE,
        }
    }
}
