//! Duty-cycle simulation.
//!
//! A trip is simulated one calendar day at a time. [`simulate_day`] runs the
//! per-day state machine and hands back the [`DayState`] to carry into the
//! next day; [`simulate_trip`] loops over days until the trip completes.

use thiserror::Error;

use super::models::{DailyLog, DayState, DutySegment, DutyStatus, SegmentLabel, TripParameters};
use super::rules::{HosRules, HOURS_PER_DAY, TICK_HOURS, TICK_MINUTES};

const EPSILON: f64 = 1e-9;

/// Simulation error types.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Trip parameters or carried-in state rejected before simulating.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The engine produced an inconsistent logbook.
    #[error("simulation invariant violated: {0}")]
    InvariantViolation(String),
}

/// How a simulated day ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayOutcome {
    /// Duty period ended in the sleeper berth; the trip resumes the next day.
    Continue(DayState),
    /// Drop-off reached.
    Complete,
}

/// One day of simulation.
#[derive(Debug, Clone)]
pub struct DayStep {
    pub log: DailyLog,
    pub outcome: DayOutcome,
}

/// Simulate a whole trip and return one log per calendar day.
pub fn simulate_trip(
    trip: &TripParameters,
    initial: DayState,
    rules: &HosRules,
) -> Result<Vec<DailyLog>, SimulationError> {
    validate(trip, &initial)?;

    let mut logs = Vec::new();
    let mut state = initial;
    loop {
        let day = logs.len() as u32 + 1;
        if day > rules.max_days {
            return Err(SimulationError::InvariantViolation(format!(
                "trip did not complete within {} days",
                rules.max_days
            )));
        }

        let step = simulate_day(trip, state, rules, day)?;
        logs.push(step.log);
        match step.outcome {
            DayOutcome::Continue(next) => state = next,
            DayOutcome::Complete => break,
        }
    }

    tracing::debug!(days = logs.len(), "trip simulated");
    Ok(logs)
}

/// Simulate day number `day` starting from `state`.
///
/// Assumes `trip` and `state` already passed [`validate`].
pub fn simulate_day(
    trip: &TripParameters,
    state: DayState,
    rules: &HosRules,
    day: u32,
) -> Result<DayStep, SimulationError> {
    DaySimulator::new(trip, rules, state, day).run()
}

/// Reject trip parameters and carried-in state the simulator cannot handle.
pub fn validate(trip: &TripParameters, state: &DayState) -> Result<(), SimulationError> {
    let invalid = |msg: &str| Err(SimulationError::InvalidInput(msg.to_string()));

    if !trip.total_driving_minutes.is_finite() || trip.total_driving_minutes <= 0.0 {
        return invalid("total driving time must be greater than zero");
    }
    if !trip.total_distance_miles.is_finite() || trip.total_distance_miles <= 0.0 {
        return invalid("total distance must be greater than zero");
    }
    if !trip.time_to_pickup_minutes.is_finite() || trip.time_to_pickup_minutes < 0.0 {
        return invalid("pickup time must not be negative");
    }
    if trip.time_to_pickup_minutes > trip.total_driving_minutes {
        return invalid("pickup time exceeds total driving time");
    }

    let traveled = state.total_time_traveled_minutes;
    if !traveled.is_finite() || traveled < 0.0 {
        return invalid("time already traveled must not be negative");
    }
    if traveled >= trip.total_driving_minutes {
        return invalid("time already traveled covers the whole trip");
    }
    if !state.miles_since_refuel.is_finite() || state.miles_since_refuel < 0.0 {
        return invalid("miles since refuel must not be negative");
    }
    if !(0.0..=HOURS_PER_DAY).contains(&state.prior_sleeper_berth_hours) {
        return invalid("prior sleeper berth hours must be between 0 and 24");
    }
    Ok(())
}

/// Per-day state machine. Counters other than `state` live only for one day.
struct DaySimulator<'a> {
    trip: &'a TripParameters,
    rules: &'a HosRules,
    state: DayState,
    log: DailyLog,
    current_hour: f64,
    driving_hours: f64,
    on_duty_hours: f64,
    driving_minutes_since_break: f64,
}

impl<'a> DaySimulator<'a> {
    fn new(trip: &'a TripParameters, rules: &'a HosRules, state: DayState, day: u32) -> Self {
        Self {
            trip,
            rules,
            state,
            log: DailyLog::new(day, state.total_time_traveled_minutes),
            current_hour: 0.0,
            driving_hours: 0.0,
            on_duty_hours: 0.0,
            driving_minutes_since_break: 0.0,
        }
    }

    fn run(mut self) -> Result<DayStep, SimulationError> {
        self.open_day()?;

        if !self.state.has_arrived_at_pickup {
            while self.state.total_time_traveled_minutes < self.trip.time_to_pickup_minutes {
                if let Some(next) = self.drive_and_apply_rules()? {
                    return self.finish(DayOutcome::Continue(next));
                }
            }

            self.push(DutyStatus::OnDutyNotDriving, self.rules.stop_hours, Some(SegmentLabel::Pickup))?;
            self.state.has_arrived_at_pickup = true;
            self.driving_minutes_since_break = 0.0;
            self.resume_driving()?;
        }

        while self.state.total_time_traveled_minutes < self.trip.total_driving_minutes {
            if let Some(next) = self.drive_and_apply_rules()? {
                return self.finish(DayOutcome::Continue(next));
            }
        }

        self.push(DutyStatus::OnDutyNotDriving, self.rules.stop_hours, Some(SegmentLabel::DropOff))?;
        self.push(DutyStatus::OffDuty, HOURS_PER_DAY - self.current_hour, None)?;
        self.finish(DayOutcome::Complete)
    }

    /// Rest owed from the previous day, pre-trip inspection, first tick.
    fn open_day(&mut self) -> Result<(), SimulationError> {
        let prior = self.state.prior_sleeper_berth_hours;
        let reset = self.rules.sleeper_berth_reset_hours;

        if prior <= 0.0 {
            self.push(DutyStatus::OffDuty, self.rules.resumption_hours, None)?;
        } else if prior < reset {
            self.push(DutyStatus::SleeperBerth, reset - prior, None)?;
        }

        self.push(DutyStatus::OnDutyNotDriving, self.rules.stop_hours, Some(SegmentLabel::PreTrip))?;
        self.resume_driving()
    }

    /// One loop iteration: a tick, then break, refuel and duty-limit rules in
    /// that order. Returns the next day's state when the duty period ends.
    fn drive_and_apply_rules(&mut self) -> Result<Option<DayState>, SimulationError> {
        self.drive_tick()?;

        if self.driving_minutes_since_break >= self.rules.break_after_driving_minutes {
            tracing::trace!(day = self.log.day, hour = self.current_hour, "mandatory break");
            self.push(DutyStatus::OffDuty, self.rules.break_hours, Some(SegmentLabel::Break))?;
            self.driving_minutes_since_break = 0.0;
            self.resume_driving()?;
        }

        if self.state.miles_since_refuel >= self.rules.refuel_miles {
            tracing::trace!(day = self.log.day, hour = self.current_hour, "refueling");
            self.push(DutyStatus::OnDutyNotDriving, self.rules.stop_hours, Some(SegmentLabel::Refueling))?;
            self.state.miles_since_refuel = 0.0;
            self.driving_minutes_since_break = 0.0;
            self.resume_driving()?;
        }

        if self.duty_limit_reached() || self.day_is_full() {
            return self.end_duty_period().map(Some);
        }
        Ok(None)
    }

    fn duty_limit_reached(&self) -> bool {
        self.driving_hours >= self.rules.max_driving_hours
            || self.on_duty_hours >= self.rules.max_on_duty_hours
    }

    fn day_is_full(&self) -> bool {
        self.current_hour + self.rules.day_end_reserve_hours() >= HOURS_PER_DAY
    }

    /// Sleeper berth until midnight; the hours spent there carry over.
    fn end_duty_period(&mut self) -> Result<DayState, SimulationError> {
        let sleeper_hours = HOURS_PER_DAY - self.current_hour;
        tracing::trace!(
            day = self.log.day,
            hour = self.current_hour,
            driving_hours = self.driving_hours,
            on_duty_hours = self.on_duty_hours,
            "duty period ended"
        );
        self.push(DutyStatus::SleeperBerth, sleeper_hours, None)?;
        self.driving_hours = 0.0;
        self.on_duty_hours = 0.0;

        Ok(DayState {
            prior_sleeper_berth_hours: sleeper_hours,
            ..self.state
        })
    }

    /// Tick after an interruption, unless the trip's driving is already done.
    fn resume_driving(&mut self) -> Result<(), SimulationError> {
        if self.state.total_time_traveled_minutes < self.trip.total_driving_minutes {
            self.drive_tick()?;
        }
        Ok(())
    }

    fn drive_tick(&mut self) -> Result<(), SimulationError> {
        self.push(DutyStatus::Driving, TICK_HOURS, None)?;
        self.state.total_time_traveled_minutes += TICK_MINUTES;
        self.state.miles_since_refuel += self.trip.miles_per_tick(TICK_MINUTES);
        self.driving_minutes_since_break += TICK_MINUTES;
        self.driving_hours += TICK_HOURS;
        Ok(())
    }

    /// Append `hours` of `status`, merging into the previous segment when
    /// both are unlabeled and share a status.
    fn push(
        &mut self,
        status: DutyStatus,
        hours: f64,
        label: Option<SegmentLabel>,
    ) -> Result<(), SimulationError> {
        if hours < 0.0 {
            return Err(self.violation(format!("negative {status:?} duration {hours}")));
        }
        if hours < EPSILON {
            return Ok(());
        }

        let end = self.current_hour + hours;
        if end > HOURS_PER_DAY + EPSILON {
            return Err(self.violation(format!("{status:?} segment would end at hour {end}")));
        }
        let end = end.min(HOURS_PER_DAY);

        match self.log.segments.last_mut() {
            Some(last) if last.status == status && last.label.is_none() && label.is_none() => {
                last.end_hour = end;
            }
            _ => self.log.segments.push(DutySegment {
                start_hour: self.current_hour,
                end_hour: end,
                status,
                label,
            }),
        }

        if matches!(status, DutyStatus::Driving | DutyStatus::OnDutyNotDriving) {
            self.on_duty_hours += hours;
        }
        self.current_hour = end;
        Ok(())
    }

    fn finish(mut self, outcome: DayOutcome) -> Result<DayStep, SimulationError> {
        self.check_timeline()?;
        self.log.tally();

        let total = self.log.total_hours();
        if (total - HOURS_PER_DAY).abs() > EPSILON {
            return Err(self.violation(format!("day totals {total} hours")));
        }

        tracing::debug!(
            day = self.log.day,
            driving_hours = self.log.driving_hours,
            time_traveled = self.state.total_time_traveled_minutes,
            complete = matches!(outcome, DayOutcome::Complete),
            "day simulated"
        );
        Ok(DayStep { log: self.log, outcome })
    }

    /// Segments must tile `[0, 24]` without gaps or overlaps.
    fn check_timeline(&self) -> Result<(), SimulationError> {
        let segments = &self.log.segments;
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(self.violation("day has no segments".to_string()));
        };
        if first.start_hour.abs() > EPSILON || (last.end_hour - HOURS_PER_DAY).abs() > EPSILON {
            return Err(self.violation(format!(
                "timeline spans {} to {}",
                first.start_hour, last.end_hour
            )));
        }
        for pair in segments.windows(2) {
            if (pair[0].end_hour - pair[1].start_hour).abs() > EPSILON {
                return Err(self.violation(format!(
                    "gap between hour {} and {}",
                    pair[0].end_hour, pair[1].start_hour
                )));
            }
        }
        if let Some(bad) = segments.iter().find(|s| s.end_hour <= s.start_hour) {
            return Err(self.violation(format!("empty segment at hour {}", bad.start_hour)));
        }
        Ok(())
    }

    fn violation(&self, detail: String) -> SimulationError {
        SimulationError::InvariantViolation(format!("day {}: {detail}", self.log.day))
    }
}
