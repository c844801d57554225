//! Hours-of-service limits used by the simulator.
//!
//! Values are simplified approximations of property-carrying driver rules,
//! not a certified compliance table. Every value can be overridden through
//! configuration except the tick length, which fixes the 30-minute grid the
//! logbook is drawn on.

use serde::Serialize;

use crate::config::ConfigError;

/// Hours in one logbook day.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Length of one driving tick in minutes.
pub const TICK_MINUTES: f64 = 30.0;

/// Length of one driving tick in hours.
pub const TICK_HOURS: f64 = TICK_MINUTES / 60.0;

/// Configurable duty limits and fixed stop durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HosRules {
    /// Sleeper berth hours that complete a rest period
    pub sleeper_berth_reset_hours: f64,
    /// Off-duty stretch that opens the first day of a trip
    pub resumption_hours: f64,
    /// Duration of pre-trip, pickup, drop-off and refueling stops
    pub stop_hours: f64,
    /// Duration of the mandatory driving break
    pub break_hours: f64,
    /// Driving minutes allowed before the mandatory break
    pub break_after_driving_minutes: f64,
    pub max_driving_hours: f64,
    pub max_on_duty_hours: f64,
    pub refuel_miles: f64,
    /// Rolling cycle budget checked before a trip starts
    pub cycle_limit_hours: f64,
    /// Safety valve on the number of simulated days
    pub max_days: u32,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            sleeper_berth_reset_hours: 10.0,
            resumption_hours: 6.5,
            stop_hours: 0.5,
            break_hours: 0.5,
            break_after_driving_minutes: 8.0 * 60.0,
            max_driving_hours: 10.5,
            max_on_duty_hours: 13.5,
            refuel_miles: 1000.0,
            cycle_limit_hours: 70.0,
            max_days: 60,
        }
    }
}

impl HosRules {
    /// Hours that must remain before midnight to keep driving.
    ///
    /// Covers the most that can be appended between two duty-limit checks:
    /// a pickup stop with its resume tick, then one tick followed by both a
    /// break and a refuel, each with its own resume tick.
    pub fn day_end_reserve_hours(&self) -> f64 {
        2.0 * self.stop_hours + self.break_hours + 4.0 * TICK_HOURS
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("sleeper_berth_reset_hours", self.sleeper_berth_reset_hours),
            ("stop_hours", self.stop_hours),
            ("break_hours", self.break_hours),
            ("break_after_driving_minutes", self.break_after_driving_minutes),
            ("max_driving_hours", self.max_driving_hours),
            ("max_on_duty_hours", self.max_on_duty_hours),
            ("refuel_miles", self.refuel_miles),
            ("cycle_limit_hours", self.cycle_limit_hours),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    name,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        if !(0.0..HOURS_PER_DAY).contains(&self.resumption_hours) {
            return Err(ConfigError::Invalid {
                name: "resumption_hours",
                reason: format!("must be within a day, got {}", self.resumption_hours),
            });
        }
        // opening rest, pre-trip, opening tick and the first loop tick
        let opening_rest = self.resumption_hours.max(self.sleeper_berth_reset_hours);
        if opening_rest + self.stop_hours + 2.0 * TICK_HOURS > HOURS_PER_DAY {
            let name = if self.resumption_hours >= self.sleeper_berth_reset_hours {
                "resumption_hours"
            } else {
                "sleeper_berth_reset_hours"
            };
            return Err(ConfigError::Invalid {
                name,
                reason: "opening rest and first driving ticks must fit in one day".to_string(),
            });
        }
        if self.max_days == 0 {
            return Err(ConfigError::Invalid {
                name: "max_days",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
