//! Rolling-cycle feasibility check.
//!
//! Before a logbook is drawn, the trip's estimated on-duty time is compared
//! against what is left of the driver's rolling cycle budget.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::TripParameters;
use super::rules::HosRules;

/// Cycle check error types.
#[derive(Debug, Error, PartialEq)]
pub enum CycleError {
    #[error("hours already used in the cycle must be a non-negative number")]
    InvalidHoursUsed,
    #[error(
        "You do not have enough cycle hours to complete this trip \
         (needs {required_hours:.1}h, {remaining_hours:.1}h remaining)"
    )]
    Exhausted {
        required_hours: f64,
        remaining_hours: f64,
    },
}

/// Estimated on-duty time against the remaining cycle budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleEstimate {
    pub on_duty_hours: f64,
    pub remaining_hours: f64,
}

/// Check that `hours_used` leaves room in the cycle for `trip`.
pub fn check_cycle(
    hours_used: f64,
    trip: &TripParameters,
    rules: &HosRules,
) -> Result<CycleEstimate, CycleError> {
    if !hours_used.is_finite() || hours_used < 0.0 {
        return Err(CycleError::InvalidHoursUsed);
    }

    let remaining_minutes = (rules.cycle_limit_hours - hours_used) * 60.0;
    let on_duty_minutes = estimate_on_duty_minutes(trip, rules);

    let estimate = CycleEstimate {
        on_duty_hours: on_duty_minutes / 60.0,
        remaining_hours: remaining_minutes / 60.0,
    };
    if remaining_minutes < on_duty_minutes {
        return Err(CycleError::Exhausted {
            required_hours: estimate.on_duty_hours,
            remaining_hours: estimate.remaining_hours,
        });
    }
    Ok(estimate)
}

/// Driving plus refueling stops, pickup, drop-off and mandatory breaks.
fn estimate_on_duty_minutes(trip: &TripParameters, rules: &HosRules) -> f64 {
    let stop_minutes = rules.stop_hours * 60.0;
    let refuel_stops = (trip.total_distance_miles / rules.refuel_miles).floor();
    let breaks = (trip.total_driving_minutes / rules.break_after_driving_minutes).floor();

    trip.total_driving_minutes
        + refuel_stops * stop_minutes
        + 2.0 * stop_minutes
        + breaks * rules.break_hours * 60.0
}
