//! Batch solver for many independent schedules
//!
//! Holds one solver configuration and solves schedules in parallel.
//! Each schedule gets its own result; one failure never affects another.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{ErrorKind, XirrResult};
use crate::schedule::Schedule;
use crate::solver::{solve_with_config, SolverConfig, XirrSolution};

/// Outcome for one keyed schedule, in a serializable shape
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub schedule_id: String,
    pub cashflow_count: usize,
    /// Annual rate as a decimal
    pub rate: Option<f64>,
    pub rate_pct: Option<f64>,
    pub iterations: Option<u32>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
}

impl BatchOutcome {
    fn new(schedule_id: String, schedule: &Schedule, result: &XirrResult<XirrSolution>) -> Self {
        match result {
            Ok(solution) => Self {
                schedule_id,
                cashflow_count: schedule.len(),
                rate: Some(solution.rate),
                rate_pct: Some(solution.as_percent()),
                iterations: Some(solution.iterations),
                error_kind: None,
                error: None,
            },
            Err(e) => Self {
                schedule_id,
                cashflow_count: schedule.len(),
                rate: None,
                rate_pct: None,
                iterations: None,
                error_kind: Some(e.kind()),
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_kind.is_none()
    }
}

/// Parallel XIRR runner
///
/// # Example
/// ```ignore
/// let solver = BatchSolver::new(SolverConfig::default().with_max_iterations(100));
/// let results = solver.solve_all(&schedules);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchSolver {
    config: SolverConfig,
}

impl BatchSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve one schedule with this runner's configuration
    pub fn solve(&self, schedule: &Schedule) -> XirrResult<XirrSolution> {
        solve_with_config(schedule, &self.config)
    }

    /// Solve every schedule in parallel; results keep input order
    pub fn solve_all(&self, schedules: &[Schedule]) -> Vec<XirrResult<XirrSolution>> {
        let results: Vec<_> = schedules
            .par_iter()
            .map(|schedule| solve_with_config(schedule, &self.config))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        log::info!("Solved {} schedules ({} failed)", results.len(), failed);
        results
    }

    /// Solve keyed schedules in parallel into serializable outcomes
    pub fn solve_keyed(&self, schedules: &[(String, Schedule)]) -> Vec<BatchOutcome> {
        let outcomes: Vec<BatchOutcome> = schedules
            .par_iter()
            .map(|(id, schedule)| {
                let result = solve_with_config(schedule, &self.config);
                BatchOutcome::new(id.clone(), schedule, &result)
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        log::info!("Solved {} keyed schedules ({} failed)", outcomes.len(), failed);
        outcomes
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn one_year_at(rate: f64) -> Schedule {
        Schedule::from_pairs([
            (d(2023, 1, 1), -1000.0),
            (d(2024, 1, 1), 1000.0 * (1.0 + rate)),
        ])
        .unwrap()
    }

    #[test]
    fn test_solve_all_keeps_order() {
        let rates = [0.03, 0.07, 0.15, 0.40, 1.25];
        let schedules: Vec<Schedule> = rates.iter().map(|&r| one_year_at(r)).collect();

        let results = BatchSolver::default().solve_all(&schedules);
        assert_eq!(results.len(), rates.len());
        for (result, &r) in results.iter().zip(rates.iter()) {
            let rate = result.as_ref().unwrap().rate;
            assert!((rate - r).abs() < 1e-6, "Expected {} got {}", r, rate);
        }
    }

    #[test]
    fn test_matches_sequential() {
        let schedules: Vec<Schedule> = (1..20).map(|i| one_year_at(i as f64 * 0.05)).collect();
        let solver = BatchSolver::default();

        let parallel = solver.solve_all(&schedules);
        let sequential: Vec<_> = schedules.iter().map(|s| solver.solve(s)).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_failures_are_isolated() {
        let diverging = Schedule::from_pairs([(d(2023, 1, 1), -1000.0), (d(2024, 1, 1), 10.0)])
            .unwrap();
        let keyed = vec![
            ("good".to_string(), one_year_at(0.1)),
            ("bad".to_string(), diverging),
            ("also_good".to_string(), one_year_at(0.2)),
        ];

        let outcomes = BatchSolver::default().solve_keyed(&keyed);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert_eq!(outcomes[1].schedule_id, "bad");
        assert_eq!(outcomes[1].error_kind, Some(ErrorKind::Divergence));
        assert!(outcomes[1].rate.is_none());
        assert!(outcomes[2].is_ok());
        assert!((outcomes[2].rate_pct.unwrap() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_config_is_applied() {
        let solver = BatchSolver::new(SolverConfig::default().with_max_iterations(1));
        let results = solver.solve_all(&[one_year_at(0.5)]);
        assert_eq!(results[0].as_ref().unwrap_err().kind(), ErrorKind::Convergence);
    }
}
