//! Driver logbook module.
//!
//! Splits a trip into per-day hours-of-service timelines and serves them as
//! HTTP endpoints for the Django trip planner.

mod cycle;
mod models;
mod routes;
mod rules;
mod service;
mod simulator;

pub use cycle::{check_cycle, CycleError, CycleEstimate};
pub use models::{
    DailyLog, DayState, DutySegment, DutyStatus, GenerateLogbookRequest, LogbookResponse,
    SegmentLabel, TripParameters, TripSummary,
};
pub use routes::router;
pub use rules::HosRules;
pub use simulator::{simulate_day, simulate_trip, DayOutcome, DayStep, SimulationError};
