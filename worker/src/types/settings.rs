//! Schedule settings types

use std::collections::HashMap;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults;
use crate::types::client::weekday_name;

/// Parse a day-time string ("08:00" or "08:00:00") into minutes from midnight.
pub fn time_to_minutes(s: &str) -> Option<i32> {
    let mut parts = s.trim().split(':');
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = parts.next()?.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes from midnight, clamped into the day, as a wall-clock time.
pub fn minutes_to_time(minutes: i32) -> NaiveTime {
    let clamped = minutes.clamp(0, 23 * 60 + 59);
    NaiveTime::from_hms_opt((clamped / 60) as u32, (clamped % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Minutes from midnight for a wall-clock time.
pub fn minutes_of(t: NaiveTime) -> i32 {
    use chrono::Timelike;
    (t.num_seconds_from_midnight() / 60) as i32
}

/// A cleaning team jobs can be assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Working-day shape shared by every team.
///
/// Times are "HH:MM" strings, the format the frontend sends. The minute
/// accessors fall back to the stock day when a string is garbled so the
/// packer always has a usable window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
    pub break_duration_minutes: i32,
    pub travel_buffer_minutes: i32,
    pub break_earliest_start: String,
    pub break_overrun_cutoff: String,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: defaults::DEFAULT_WORK_START.to_string(),
            end: defaults::DEFAULT_WORK_END.to_string(),
            break_duration_minutes: defaults::DEFAULT_BREAK_DURATION_MINUTES,
            travel_buffer_minutes: defaults::DEFAULT_TRAVEL_BUFFER_MINUTES,
            break_earliest_start: defaults::DEFAULT_BREAK_EARLIEST_START.to_string(),
            break_overrun_cutoff: defaults::DEFAULT_BREAK_OVERRUN_CUTOFF.to_string(),
        }
    }
}

impl WorkingHours {
    pub fn start_minutes(&self) -> i32 {
        time_to_minutes(&self.start)
            .unwrap_or_else(|| time_to_minutes(defaults::DEFAULT_WORK_START).unwrap_or(480))
    }

    pub fn end_minutes(&self) -> i32 {
        time_to_minutes(&self.end)
            .unwrap_or_else(|| time_to_minutes(defaults::DEFAULT_WORK_END).unwrap_or(1020))
    }

    pub fn break_earliest_minutes(&self) -> i32 {
        time_to_minutes(&self.break_earliest_start).unwrap_or(660)
    }

    pub fn break_cutoff_minutes(&self) -> i32 {
        time_to_minutes(&self.break_overrun_cutoff).unwrap_or(780)
    }
}

/// Per-room duration weights for visit estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationEstimates {
    pub base_minutes: i32,
    pub per_bedroom: i32,
    pub per_bathroom: i32,
    pub per_living_area: i32,
    pub per_kitchen: i32,
}

impl Default for DurationEstimates {
    fn default() -> Self {
        Self {
            base_minutes: defaults::DEFAULT_BASE_MINUTES,
            per_bedroom: defaults::DEFAULT_MINUTES_PER_BEDROOM,
            per_bathroom: defaults::DEFAULT_MINUTES_PER_BATHROOM,
            per_living_area: defaults::DEFAULT_MINUTES_PER_LIVING_AREA,
            per_kitchen: defaults::DEFAULT_MINUTES_PER_KITCHEN,
        }
    }
}

/// Tunable scheduling configuration, stored as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    #[serde(default = "default_teams")]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub duration_estimates: DurationEstimates,
    /// Lowercase weekday name -> suburbs serviced that day
    #[serde(default = "defaults::default_area_schedule")]
    pub area_schedule: HashMap<String, Vec<String>>,
    #[serde(default = "default_job_cap")]
    pub max_jobs_per_team_per_day: i32,
}

fn default_teams() -> Vec<Team> {
    vec![
        Team {
            id: "team-1".to_string(),
            name: "Team 1".to_string(),
            color: Some("#4F9DDE".to_string()),
        },
        Team {
            id: "team-2".to_string(),
            name: "Team 2".to_string(),
            color: Some("#E8A33D".to_string()),
        },
    ]
}

fn default_job_cap() -> i32 {
    defaults::DEFAULT_JOBS_PER_TEAM_PER_DAY
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            teams: default_teams(),
            working_hours: WorkingHours::default(),
            duration_estimates: DurationEstimates::default(),
            area_schedule: defaults::default_area_schedule(),
            max_jobs_per_team_per_day: default_job_cap(),
        }
    }
}

/// Settings rejected at the write boundary
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("working hours end ({end}) must be after start ({start})")]
    WorkingHoursOrder { start: String, end: String },
    #[error("unparseable working hours time: {0:?}")]
    UnparseableTime(String),
    #[error("jobs per team per day must be between 1 and {max}, got {got}")]
    JobCapOutOfRange { got: i32, max: i32 },
    #[error("at least one team must be configured")]
    NoTeams,
    #[error("{field} must not be negative, got {got}")]
    NegativeMinutes { field: &'static str, got: i32 },
}

impl ScheduleSettings {
    /// Validate before persisting. Reads are tolerant; writes are not.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let wh = &self.working_hours;
        let start = time_to_minutes(&wh.start)
            .ok_or_else(|| SettingsError::UnparseableTime(wh.start.clone()))?;
        let end = time_to_minutes(&wh.end)
            .ok_or_else(|| SettingsError::UnparseableTime(wh.end.clone()))?;
        if end <= start {
            return Err(SettingsError::WorkingHoursOrder {
                start: wh.start.clone(),
                end: wh.end.clone(),
            });
        }
        if time_to_minutes(&wh.break_earliest_start).is_none() {
            return Err(SettingsError::UnparseableTime(wh.break_earliest_start.clone()));
        }
        if time_to_minutes(&wh.break_overrun_cutoff).is_none() {
            return Err(SettingsError::UnparseableTime(wh.break_overrun_cutoff.clone()));
        }
        if wh.break_duration_minutes < 0 {
            return Err(SettingsError::NegativeMinutes {
                field: "breakDurationMinutes",
                got: wh.break_duration_minutes,
            });
        }
        if wh.travel_buffer_minutes < 0 {
            return Err(SettingsError::NegativeMinutes {
                field: "travelBufferMinutes",
                got: wh.travel_buffer_minutes,
            });
        }
        if self.max_jobs_per_team_per_day < 1
            || self.max_jobs_per_team_per_day > defaults::MAX_JOBS_PER_TEAM_PER_DAY
        {
            return Err(SettingsError::JobCapOutOfRange {
                got: self.max_jobs_per_team_per_day,
                max: defaults::MAX_JOBS_PER_TEAM_PER_DAY,
            });
        }
        if self.teams.is_empty() {
            return Err(SettingsError::NoTeams);
        }
        Ok(())
    }

    /// Weekday a suburb is serviced on, if the area schedule maps it.
    /// Days are checked Monday first so a suburb listed twice resolves
    /// the same way every run.
    pub fn weekday_for_suburb(&self, suburb: &str) -> Option<Weekday> {
        let needle = suburb.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            if let Some(suburbs) = self.area_schedule.get(weekday_name(day)) {
                if suburbs.iter().any(|s| s.trim().to_lowercase() == needle) {
                    return Some(day);
                }
            }
        }
        None
    }

    /// Teams in configured order; packing and routing follow this order.
    pub fn team_ids(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_minutes_parses_hhmm_and_hhmmss() {
        assert_eq!(time_to_minutes("08:00"), Some(480));
        assert_eq!(time_to_minutes("17:30"), Some(1050));
        assert_eq!(time_to_minutes("09:15:00"), Some(555));
        assert_eq!(time_to_minutes(" 11:00 "), Some(660));
    }

    #[test]
    fn test_time_to_minutes_rejects_garbage() {
        assert_eq!(time_to_minutes("25:00"), None);
        assert_eq!(time_to_minutes("8"), None);
        assert_eq!(time_to_minutes("soonish"), None);
        assert_eq!(time_to_minutes("10:75"), None);
    }

    #[test]
    fn test_minutes_to_time_clamps_into_day() {
        assert_eq!(minutes_to_time(480), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(minutes_to_time(-10), NaiveTime::MIN);
        assert_eq!(
            minutes_to_time(24 * 60 + 30),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ScheduleSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.working_hours.start_minutes(), 480);
        assert_eq!(settings.working_hours.end_minutes(), 1020);
        assert_eq!(settings.max_jobs_per_team_per_day, 5);
        assert_eq!(settings.teams.len(), 2);
    }

    #[test]
    fn test_validate_rejects_inverted_working_hours() {
        let mut settings = ScheduleSettings::default();
        settings.working_hours.start = "17:00".to_string();
        settings.working_hours.end = "08:00".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::WorkingHoursOrder { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_job_cap_out_of_range() {
        let mut settings = ScheduleSettings::default();
        settings.max_jobs_per_team_per_day = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::JobCapOutOfRange { .. })
        ));
        settings.max_jobs_per_team_per_day = 7;
        assert!(settings.validate().is_err());
        settings.max_jobs_per_team_per_day = 6;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_garbled_working_hours_fall_back_on_read() {
        let mut settings = ScheduleSettings::default();
        settings.working_hours.start = "late".to_string();
        assert_eq!(settings.working_hours.start_minutes(), 480);
    }

    #[test]
    fn test_weekday_for_suburb_is_case_insensitive() {
        let settings = ScheduleSettings::default();
        assert_eq!(settings.weekday_for_suburb("buderim"), Some(Weekday::Mon));
        assert_eq!(settings.weekday_for_suburb("BUDERIM"), Some(Weekday::Mon));
        assert_eq!(settings.weekday_for_suburb("Atlantis"), None);
        assert_eq!(settings.weekday_for_suburb(""), None);
    }

    #[test]
    fn test_weekday_for_suburb_resolves_duplicates_monday_first() {
        let mut settings = ScheduleSettings::default();
        settings
            .area_schedule
            .entry("friday".to_string())
            .or_default()
            .push("Buderim".to_string());
        assert_eq!(settings.weekday_for_suburb("Buderim"), Some(Weekday::Mon));
    }

    #[test]
    fn test_settings_round_trip_with_missing_fields() {
        // A partial document from an older frontend still deserializes.
        let json = r#"{"teams":[{"id":"t1","name":"Crew"}]}"#;
        let settings: ScheduleSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.teams.len(), 1);
        assert_eq!(settings.working_hours.start, "08:00");
        assert_eq!(settings.max_jobs_per_team_per_day, 5);
        assert!(!settings.area_schedule.is_empty());
    }
}
