//! Team-day capacity packing
//!
//! Places jobs one at a time into a team's working day, keeping the travel
//! buffer between visits and wedging in the single lunch break ahead of the
//! third visit once the morning has run long.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::types::settings::{minutes_to_time, ScheduleSettings};

/// What occupies an interval in a team's day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Job,
    Break,
}

/// One occupied interval, minutes from midnight
#[derive(Debug, Clone, Copy)]
pub struct Occupied {
    pub kind: SlotKind,
    pub start_minutes: i32,
    pub end_minutes: i32,
}

/// A committed reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedSlot {
    pub start_minutes: i32,
    pub end_minutes: i32,
    /// Break committed together with this job, when the rule fired
    pub break_slot: Option<(i32, i32)>,
}

impl ReservedSlot {
    pub fn start_time(&self) -> NaiveTime {
        minutes_to_time(self.start_minutes)
    }

    pub fn end_time(&self) -> NaiveTime {
        minutes_to_time(self.end_minutes)
    }
}

/// Mutable packing state for one scheduling run.
///
/// Every placement lives in the plan and the plan is passed explicitly, so
/// two runs never observe each other's placements.
#[derive(Debug, Default)]
pub struct DayPlan {
    occupied: HashMap<(NaiveDate, String), Vec<Occupied>>,
}

impl DayPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load an interval (typically a locked job) so later reservations
    /// pack around it.
    pub fn seed(
        &mut self,
        date: NaiveDate,
        team_id: &str,
        kind: SlotKind,
        start_minutes: i32,
        end_minutes: i32,
    ) {
        self.occupied
            .entry((date, team_id.to_string()))
            .or_default()
            .push(Occupied {
                kind,
                start_minutes,
                end_minutes,
            });
    }

    /// Jobs already on the team's day (breaks excluded).
    pub fn job_count(&self, date: NaiveDate, team_id: &str) -> usize {
        self.occupied
            .get(&(date, team_id.to_string()))
            .map(|entries| entries.iter().filter(|o| o.kind == SlotKind::Job).count())
            .unwrap_or(0)
    }

    /// Try to fit a job of `duration_minutes` onto the team's day.
    ///
    /// The candidate start is the working-day start for the first visit,
    /// otherwise the latest occupied end plus the travel buffer. Before the
    /// third visit, if the candidate has reached the break threshold or the
    /// visit would run past the overrun cutoff, the lunch break goes in
    /// first and the visit shifts behind it.
    ///
    /// Commits the slot (and its break) only on success; a failed attempt
    /// leaves the plan untouched.
    pub fn reserve_slot(
        &mut self,
        date: NaiveDate,
        team_id: &str,
        duration_minutes: i32,
        settings: &ScheduleSettings,
    ) -> Option<ReservedSlot> {
        let hours = &settings.working_hours;
        let key = (date, team_id.to_string());

        let (job_count, has_break, latest_end) = match self.occupied.get(&key) {
            Some(entries) => (
                entries.iter().filter(|o| o.kind == SlotKind::Job).count(),
                entries.iter().any(|o| o.kind == SlotKind::Break),
                entries.iter().map(|o| o.end_minutes).max(),
            ),
            None => (0, false, None),
        };

        if job_count >= settings.max_jobs_per_team_per_day.max(0) as usize {
            return None;
        }

        let mut candidate = match latest_end {
            Some(end) => end + hours.travel_buffer_minutes,
            None => hours.start_minutes(),
        };

        let mut break_slot = None;
        if job_count == 2 && !has_break {
            let would_end = candidate + duration_minutes;
            if candidate >= hours.break_earliest_minutes()
                || would_end > hours.break_cutoff_minutes()
            {
                let break_start = candidate;
                let break_end = break_start + hours.break_duration_minutes;
                candidate = break_end + hours.travel_buffer_minutes;
                break_slot = Some((break_start, break_end));
            }
        }

        let end = candidate + duration_minutes;
        if end > hours.end_minutes() {
            return None;
        }

        let entries = self.occupied.entry(key).or_default();
        if let Some((break_start, break_end)) = break_slot {
            entries.push(Occupied {
                kind: SlotKind::Break,
                start_minutes: break_start,
                end_minutes: break_end,
            });
        }
        entries.push(Occupied {
            kind: SlotKind::Job,
            start_minutes: candidate,
            end_minutes: end,
        });

        Some(ReservedSlot {
            start_minutes: candidate,
            end_minutes: end,
            break_slot,
        })
    }
}
