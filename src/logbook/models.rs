//! Data types for logbook generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cycle::CycleEstimate;

/// Duty status a driver occupies at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OffDuty,
    SleeperBerth,
    OnDutyNotDriving,
    Driving,
}

/// Annotation attached to a non-driving stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLabel {
    PreTrip,
    Break,
    Refueling,
    Pickup,
    DropOff,
}

impl SegmentLabel {
    pub const ALL: [SegmentLabel; 5] = [
        Self::PreTrip,
        Self::Break,
        Self::Refueling,
        Self::Pickup,
        Self::DropOff,
    ];

    /// Text shown on the logbook grid.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreTrip => "Pre-trip/TIV",
            Self::Break => "30-minute break",
            Self::Refueling => "Refueling",
            Self::Pickup => "Pickup",
            Self::DropOff => "Drop-off",
        }
    }
}

impl std::fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SegmentLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SegmentLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == text)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown segment label {text:?}")))
    }
}

/// One contiguous stretch of a single duty status within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutySegment {
    /// Hours since midnight (0.0-24.0)
    pub start_hour: f64,
    /// Hours since midnight (0.0-24.0)
    pub end_hour: f64,
    pub status: DutyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SegmentLabel>,
}

impl DutySegment {
    pub fn duration(&self) -> f64 {
        self.end_hour - self.start_hour
    }
}

/// Immutable description of the trip being logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripParameters {
    /// Driving time required for the whole trip, in minutes
    pub total_driving_minutes: f64,
    /// Total trip distance in miles
    pub total_distance_miles: f64,
    /// Driving time from trip start to pickup, in minutes
    pub time_to_pickup_minutes: f64,
}

impl TripParameters {
    /// Miles covered during one driving tick of `tick_minutes`.
    pub fn miles_per_tick(&self, tick_minutes: f64) -> f64 {
        self.total_distance_miles / self.total_driving_minutes * tick_minutes
    }
}

/// State carried across a day boundary.
///
/// This is the only information a day inherits from the previous one; every
/// other counter is re-derived when the day starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DayState {
    /// Trip driving time elapsed so far, in minutes
    pub total_time_traveled_minutes: f64,
    pub miles_since_refuel: f64,
    /// Sleeper berth hours already accrued when the day begins
    pub prior_sleeper_berth_hours: f64,
    pub has_arrived_at_pickup: bool,
}

/// One calendar day of the logbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    /// 1-based day index within the trip
    pub day: u32,
    /// Calendar date, when the trip start date is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub segments: Vec<DutySegment>,
    /// Trip driving minutes elapsed when this day started
    pub total_time_traveled_at_day_start: f64,
    pub off_duty_hours: f64,
    pub on_duty_hours: f64,
    pub driving_hours: f64,
    pub sleeper_berth_hours: f64,
}

impl DailyLog {
    pub(crate) fn new(day: u32, total_time_traveled_at_day_start: f64) -> Self {
        Self {
            day,
            date: None,
            segments: Vec::new(),
            total_time_traveled_at_day_start,
            off_duty_hours: 0.0,
            on_duty_hours: 0.0,
            driving_hours: 0.0,
            sleeper_berth_hours: 0.0,
        }
    }

    /// Sum of the four per-status aggregates.
    pub fn total_hours(&self) -> f64 {
        self.off_duty_hours + self.on_duty_hours + self.driving_hours + self.sleeper_berth_hours
    }

    /// Recompute the per-status aggregates from the segments.
    pub(crate) fn tally(&mut self) {
        self.off_duty_hours = self.hours_in(DutyStatus::OffDuty);
        self.on_duty_hours = self.hours_in(DutyStatus::OnDutyNotDriving);
        self.driving_hours = self.hours_in(DutyStatus::Driving);
        self.sleeper_berth_hours = self.hours_in(DutyStatus::SleeperBerth);
    }

    fn hours_in(&self, status: DutyStatus) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.status == status)
            .map(DutySegment::duration)
            .sum()
    }

    /// Segments carrying the given label.
    pub fn labeled(&self, label: SegmentLabel) -> impl Iterator<Item = &DutySegment> {
        self.segments.iter().filter(move |s| s.label == Some(label))
    }
}

/// Trip-wide totals across all daily logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub days: usize,
    pub driving_hours: f64,
    pub on_duty_hours: f64,
    pub off_duty_hours: f64,
    pub sleeper_berth_hours: f64,
    pub refueling_stops: usize,
    pub breaks: usize,
    pub total_distance_miles: f64,
    pub cycle: CycleEstimate,
}

impl TripSummary {
    pub fn from_logs(logs: &[DailyLog], trip: &TripParameters, cycle: CycleEstimate) -> Self {
        let total = |f: fn(&DailyLog) -> f64| logs.iter().map(f).sum::<f64>();
        let count = |label: SegmentLabel| logs.iter().map(|l| l.labeled(label).count()).sum::<usize>();

        Self {
            days: logs.len(),
            driving_hours: total(|l| l.driving_hours),
            on_duty_hours: total(|l| l.on_duty_hours),
            off_duty_hours: total(|l| l.off_duty_hours),
            sleeper_berth_hours: total(|l| l.sleeper_berth_hours),
            refueling_stops: count(SegmentLabel::Refueling),
            breaks: count(SegmentLabel::Break),
            total_distance_miles: trip.total_distance_miles,
            cycle,
        }
    }
}

/// Request payload for logbook generation.
///
/// Field names follow the Django form that posts to this endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateLogbookRequest {
    /// Hours already used in the rolling cycle
    #[serde(default)]
    pub current_cycle_hour: f64,
    /// Total driving time in minutes
    pub total_driving_time: f64,
    /// Driving time to pickup in minutes
    pub pickup_time: f64,
    pub total_distance_miles: f64,
    /// Calendar date of the first day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    // Carried-in state from a previous logbook
    #[serde(default)]
    pub miles_since_refuel: f64,
    #[serde(default)]
    pub prior_sleeper_berth_hours: f64,
    #[serde(default)]
    pub time_traveled_minutes: f64,
    #[serde(default)]
    pub has_arrived_at_pickup: bool,
}

impl GenerateLogbookRequest {
    pub fn trip(&self) -> TripParameters {
        TripParameters {
            total_driving_minutes: self.total_driving_time,
            total_distance_miles: self.total_distance_miles,
            time_to_pickup_minutes: self.pickup_time,
        }
    }

    pub fn initial_state(&self) -> DayState {
        DayState {
            total_time_traveled_minutes: self.time_traveled_minutes,
            miles_since_refuel: self.miles_since_refuel,
            prior_sleeper_berth_hours: self.prior_sleeper_berth_hours,
            has_arrived_at_pickup: self.has_arrived_at_pickup,
        }
    }
}

/// Response payload from logbook generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogbookResponse {
    pub logbooks: Vec<DailyLog>,
    pub summary: TripSummary,
    /// SHA256 hash of input
    pub input_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, status: DutyStatus, label: Option<SegmentLabel>) -> DutySegment {
        DutySegment { start_hour: start, end_hour: end, status, label }
    }

    #[test]
    fn test_tally_sums_each_status() {
        let mut log = DailyLog::new(1, 0.0);
        log.segments = vec![
            segment(0.0, 6.5, DutyStatus::OffDuty, None),
            segment(6.5, 7.0, DutyStatus::OnDutyNotDriving, Some(SegmentLabel::PreTrip)),
            segment(7.0, 12.0, DutyStatus::Driving, None),
            segment(12.0, 24.0, DutyStatus::SleeperBerth, None),
        ];
        log.tally();

        assert_eq!(log.off_duty_hours, 6.5);
        assert_eq!(log.on_duty_hours, 0.5);
        assert_eq!(log.driving_hours, 5.0);
        assert_eq!(log.sleeper_berth_hours, 12.0);
        assert_eq!(log.total_hours(), 24.0);
    }

    #[test]
    fn test_labels_serialize_as_text() {
        let json = serde_json::to_string(&SegmentLabel::Break).unwrap();
        assert_eq!(json, "\"30-minute break\"");
        assert_eq!(SegmentLabel::PreTrip.to_string(), "Pre-trip/TIV");

        let status = serde_json::to_string(&DutyStatus::OnDutyNotDriving).unwrap();
        assert_eq!(status, "\"on_duty_not_driving\"");
    }

    #[test]
    fn test_labels_round_trip_through_json() {
        for label in SegmentLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{label}\""));
            assert_eq!(serde_json::from_str::<SegmentLabel>(&json).unwrap(), label);
        }
        assert!(serde_json::from_str::<SegmentLabel>("\"Lunch\"").is_err());
    }

    #[test]
    fn test_unlabeled_segment_omits_label() {
        let json = serde_json::to_value(segment(0.0, 1.0, DutyStatus::Driving, None)).unwrap();
        assert!(json.get("label").is_none());
    }

    #[test]
    fn test_request_defaults() {
        let request: GenerateLogbookRequest = serde_json::from_str(
            r#"{"total_driving_time": 600, "pickup_time": 60, "total_distance_miles": 550}"#,
        )
        .unwrap();

        assert_eq!(request.current_cycle_hour, 0.0);
        assert!(request.start_date.is_none());
        assert_eq!(request.initial_state(), DayState::default());
        assert_eq!(request.trip().time_to_pickup_minutes, 60.0);
    }
}
