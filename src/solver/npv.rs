//! Net present value of dated cash flows (XNPV)

use crate::error::{XirrError, XirrResult};
use crate::schedule::Schedule;

/// Calculate NPV and its derivative with respect to the annual rate
///
/// NPV(r)  = Σ a_i / (1 + r)^t_i
/// NPV'(r) = Σ -t_i * a_i / (1 + r)^(t_i + 1)
///
/// Caller guarantees 1 + rate > 0.
pub fn npv_and_derivative(schedule: &Schedule, rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, amount) in schedule.timed_amounts() {
        let discount = base.powf(t);
        npv += amount / discount;
        if t > 0.0 {
            dnpv -= t * amount / (discount * base);
        }
    }

    (npv, dnpv)
}

/// Net present value of a schedule at an annual rate, discounted to its earliest date
pub fn xnpv(schedule: &Schedule, rate: f64) -> XirrResult<f64> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(XirrError::validation(format!(
            "rate must be finite and greater than -1, got {}",
            rate
        )));
    }
    Ok(npv_and_derivative(schedule, rate).0)
}
