//! Logbook generation for a single request.

use chrono::Days;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

use super::cycle::check_cycle;
use super::models::{GenerateLogbookRequest, LogbookResponse, TripSummary};
use super::rules::HosRules;
use super::simulator::{simulate_trip, validate};

/// Compute SHA256 hash of input string.
pub fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let digest = hasher.finalize();
    format!("sha256:{}", hex::encode(digest))
}

/// Validate the trip, check the cycle budget and simulate the logbook.
pub fn generate_logbook(
    request: &GenerateLogbookRequest,
    rules: &HosRules,
    input_hash: String,
) -> Result<LogbookResponse> {
    // The planner always routes to a pickup, so zero is rejected here even
    // though the simulator accepts a pickup at the origin
    if request.pickup_time.is_nan() || request.pickup_time <= 0.0 {
        return Err(AppError::InvalidInput(
            "All fields must be greater than zero.".to_string(),
        ));
    }

    let trip = request.trip();
    let initial = request.initial_state();

    // Bad input is reported ahead of the cycle check
    validate(&trip, &initial)?;
    let cycle = check_cycle(request.current_cycle_hour, &trip, rules)?;

    let mut logbooks = simulate_trip(&trip, initial, rules)?;
    if let Some(start) = request.start_date {
        for log in &mut logbooks {
            log.date = start.checked_add_days(Days::new(u64::from(log.day - 1)));
        }
    }

    let summary = TripSummary::from_logs(&logbooks, &trip, cycle);
    tracing::info!(
        days = summary.days,
        driving_hours = summary.driving_hours,
        "Generated logbook {}",
        input_hash
    );

    Ok(LogbookResponse {
        logbooks,
        summary,
        input_hash,
    })
}
