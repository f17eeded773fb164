//! Extended Internal Rate of Return (XIRR) calculation
//!
//! Finds the annual rate that zeroes the NPV of a dated cash flow schedule
//! using the Newton-Raphson method.

use serde::Serialize;

use super::config::SolverConfig;
use super::npv::npv_and_derivative;
use crate::error::{DivergenceReason, XirrError, XirrResult};
use crate::schedule::Schedule;

/// A converged XIRR
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XirrSolution {
    /// Annual rate as a decimal (e.g., 0.1534 for 15.34%)
    pub rate: f64,
    /// Newton steps taken
    pub iterations: u32,
    /// NPV at `rate`, below tolerance in magnitude
    pub npv: f64,
}

impl XirrSolution {
    pub fn as_percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Calculate the XIRR of a schedule starting from `guess`,
/// with default tolerance and iteration cap.
///
/// # Arguments
/// * `schedule` - Validated cash flows (positive = inflow, negative = outflow)
/// * `guess` - Starting annual rate, typically 0.1
///
/// # Returns
/// * `XirrResult<XirrSolution>` - Annual rate, or the reason no rate was found
pub fn solve(schedule: &Schedule, guess: f64) -> XirrResult<XirrSolution> {
    solve_with_config(schedule, &SolverConfig::default().with_guess(guess))
}

/// Calculate the XIRR of a schedule with explicit solver settings
///
/// Stops with:
/// - `Ok` once |NPV(r)| < tolerance
/// - `XirrError::Convergence` after `max_iterations` steps without meeting tolerance
/// - `XirrError::Divergence` as soon as 1 + r <= 0, the derivative is flat,
///   or any intermediate value is non-finite
pub fn solve_with_config(schedule: &Schedule, config: &SolverConfig) -> XirrResult<XirrSolution> {
    config.validate()?;

    let mut rate = config.initial_guess;
    let mut iteration: u32 = 0;

    loop {
        if 1.0 + rate <= 0.0 {
            return Err(divergence(iteration, rate, DivergenceReason::RateBelowDomain));
        }

        let (npv, dnpv) = npv_and_derivative(schedule, rate);
        if !npv.is_finite() || !dnpv.is_finite() {
            return Err(divergence(iteration, rate, DivergenceReason::NonFinite));
        }

        log::trace!(
            "xirr iteration {}: rate={:.10} npv={:.3e} dnpv={:.3e}",
            iteration,
            rate,
            npv,
            dnpv
        );

        if npv.abs() < config.tolerance {
            log::debug!("xirr converged to {:.8} after {} iterations", rate, iteration);
            return Ok(XirrSolution {
                rate,
                iterations: iteration,
                npv,
            });
        }

        if iteration == config.max_iterations {
            log::debug!(
                "xirr gave up after {} iterations (rate={:.8}, npv={:.3e})",
                iteration,
                rate,
                npv
            );
            return Err(XirrError::Convergence {
                iterations: iteration,
                rate,
                npv,
            });
        }

        if dnpv.abs() < config.min_derivative {
            return Err(divergence(iteration, rate, DivergenceReason::FlatDerivative));
        }

        let next = rate - npv / dnpv;
        if !next.is_finite() {
            return Err(divergence(iteration, rate, DivergenceReason::NonFinite));
        }
        rate = next;
        iteration += 1;
    }
}

fn divergence(iteration: u32, rate: f64, reason: DivergenceReason) -> XirrError {
    log::debug!("xirr diverged at iteration {} (rate={}): {}", iteration, rate, reason);
    XirrError::Divergence {
        iteration,
        rate,
        reason,
    }
}
