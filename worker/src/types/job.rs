//! Scheduled job types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::defaults::MIN_JOB_DURATION_MINUTES;
use crate::types::client::{Client, Frequency, PreferredTime};
use crate::types::settings::{minutes_of, minutes_to_time, time_to_minutes};

/// Job status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Normalize a free-form status string. Unrecognized values fall back
    /// to scheduled.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "in_progress" | "in progress" | "started" => JobStatus::InProgress,
            "completed" | "done" => JobStatus::Completed,
            "cancelled" | "canceled" | "skipped" => JobStatus::Cancelled,
            _ => JobStatus::Scheduled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Locked jobs reflect real-world work and are never rewritten or
    /// deleted by schedule regeneration.
    pub fn is_locked(&self) -> bool {
        matches!(self, JobStatus::InProgress | JobStatus::Completed)
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Scheduled
    }
}

/// One scheduled visit (or a break placeholder) on the rota.
///
/// Client details are denormalized onto the row so the rota stays readable
/// even when the client record changes or disappears. `client_id` is a raw
/// string because rows imported from the old system carry references that
/// do not always parse as UUIDs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJob {
    pub id: Uuid,
    pub date: NaiveDate,
    pub client_id: Option<String>,

    // Denormalized client snapshot
    pub client_name: Option<String>,
    pub suburb: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_areas: Option<i32>,
    pub kitchens: Option<i32>,
    pub frequency: Option<Frequency>,
    pub preferred_time: Option<PreferredTime>,
    pub access_notes: Option<String>,
    pub special_instructions: Option<String>,

    // Placement on the day
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,

    pub status: JobStatus,
    pub assigned_teams: Vec<String>,
    pub published: bool,
    pub is_demo: bool,
    pub is_break: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledJob {
    /// Fresh occurrence for a client with the snapshot filled in.
    /// `start_minutes` counts from midnight; the end time follows from the
    /// duration, floored at the minimum visit length.
    pub fn for_client(
        client: &Client,
        date: NaiveDate,
        start_minutes: i32,
        duration_minutes: i32,
    ) -> Self {
        let now = Utc::now();
        let duration = duration_minutes.max(MIN_JOB_DURATION_MINUTES);
        let mut job = Self {
            id: Uuid::new_v4(),
            date,
            client_id: None,
            client_name: None,
            suburb: None,
            address: None,
            email: None,
            phone: None,
            bedrooms: None,
            bathrooms: None,
            living_areas: None,
            kitchens: None,
            frequency: None,
            preferred_time: None,
            access_notes: None,
            special_instructions: None,
            start_time: Some(minutes_to_time(start_minutes)),
            end_time: Some(minutes_to_time(start_minutes + duration)),
            duration_minutes: Some(duration),
            status: JobStatus::Scheduled,
            assigned_teams: Vec::new(),
            published: false,
            is_demo: client.is_demo,
            is_break: false,
            created_at: now,
            updated_at: now,
        };
        job.apply_client_snapshot(client);
        job
    }

    /// Break placeholder for a team's day.
    pub fn break_for(
        date: NaiveDate,
        team_id: &str,
        start_minutes: i32,
        duration_minutes: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            client_id: None,
            client_name: Some("Break".to_string()),
            suburb: None,
            address: None,
            email: None,
            phone: None,
            bedrooms: None,
            bathrooms: None,
            living_areas: None,
            kitchens: None,
            frequency: None,
            preferred_time: None,
            access_notes: None,
            special_instructions: None,
            start_time: Some(minutes_to_time(start_minutes)),
            end_time: Some(minutes_to_time(start_minutes + duration_minutes)),
            duration_minutes: Some(duration_minutes),
            status: JobStatus::Scheduled,
            assigned_teams: vec![team_id.to_string()],
            published: false,
            is_demo: false,
            is_break: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Manually added visit with no client record behind it. Snapshot
    /// fields start empty and are filled in by the caller.
    pub fn manual(date: NaiveDate, start_minutes: i32, duration_minutes: i32) -> Self {
        let now = Utc::now();
        let duration = duration_minutes.max(MIN_JOB_DURATION_MINUTES);
        Self {
            id: Uuid::new_v4(),
            date,
            client_id: None,
            client_name: None,
            suburb: None,
            address: None,
            email: None,
            phone: None,
            bedrooms: None,
            bathrooms: None,
            living_areas: None,
            kitchens: None,
            frequency: None,
            preferred_time: None,
            access_notes: None,
            special_instructions: None,
            start_time: Some(minutes_to_time(start_minutes)),
            end_time: Some(minutes_to_time(start_minutes + duration)),
            duration_minutes: Some(duration),
            status: JobStatus::Scheduled,
            assigned_teams: Vec::new(),
            published: false,
            is_demo: false,
            is_break: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the client's current details onto the job. Fields the client
    /// lacks keep whatever the job already holds.
    pub fn apply_client_snapshot(&mut self, client: &Client) {
        self.client_id = Some(client.id.to_string());
        self.client_name = Some(client.name.clone());
        self.suburb = client.suburb.clone().or_else(|| self.suburb.take());
        self.address = client.address.clone().or_else(|| self.address.take());
        self.email = client.email.clone().or_else(|| self.email.take());
        self.phone = client.phone.clone().or_else(|| self.phone.take());
        self.bedrooms = client.bedrooms.or(self.bedrooms);
        self.bathrooms = client.bathrooms.or(self.bathrooms);
        self.living_areas = client.living_areas.or(self.living_areas);
        self.kitchens = client.kitchens.or(self.kitchens);
        self.frequency = Some(client.frequency);
        self.preferred_time = Some(client.preferred_time);
        self.access_notes = client.access_notes.clone().or_else(|| self.access_notes.take());
        self.special_instructions = client
            .special_instructions
            .clone()
            .or_else(|| self.special_instructions.take());
    }

    /// Apply an update request. Absent fields keep their current value.
    /// A new start without an explicit end recomputes the end from the
    /// job's duration.
    pub fn apply_update(&mut self, req: &UpdateJobRequest) {
        if let Some(date) = req.date {
            self.date = date;
        }
        if let Some(start) = req.start_time.as_deref().and_then(time_to_minutes) {
            self.start_time = Some(minutes_to_time(start));
            if req.end_time.is_none() {
                let duration = self
                    .duration_minutes
                    .unwrap_or(MIN_JOB_DURATION_MINUTES)
                    .max(MIN_JOB_DURATION_MINUTES);
                self.end_time = Some(minutes_to_time(start + duration));
            }
        }
        if let Some(end) = req.end_time.as_deref().and_then(time_to_minutes) {
            self.end_time = Some(minutes_to_time(end));
        }
        if let Some(duration) = req.duration_minutes {
            self.duration_minutes = Some(duration);
            if req.end_time.is_none() {
                if let Some(start) = self.start_time {
                    self.end_time = Some(minutes_to_time(
                        minutes_of(start) + duration.max(MIN_JOB_DURATION_MINUTES),
                    ));
                }
            }
        }
        if let Some(status) = &req.status {
            self.status = JobStatus::parse(status);
        }
        if let Some(teams) = &req.assigned_teams {
            self.assigned_teams = teams.clone();
        }
        if let Some(published) = req.published {
            self.published = published;
        }
        self.updated_at = Utc::now();
    }

    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Start of the visit in minutes from midnight.
    pub fn start_minutes(&self) -> Option<i32> {
        self.start_time.map(minutes_of)
    }

    /// End of the visit in minutes from midnight.
    pub fn end_minutes(&self) -> Option<i32> {
        self.end_time.map(minutes_of)
    }

    /// The client reference, when it parses as a UUID.
    pub fn parsed_client_id(&self) -> Option<Uuid> {
        self.client_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
    }
}

/// Request to create a job by hand, outside schedule generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub suburb: Option<String>,
    pub address: Option<String>,
    pub start_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub assigned_teams: Option<Vec<String>>,
    pub is_break: Option<bool>,
}

/// Request to update a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub status: Option<String>,
    pub assigned_teams: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// Filter for listing jobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsRequest {
    pub client_id: Option<Uuid>,
    pub on_date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub team_id: Option<String>,
    #[serde(default)]
    pub include_breaks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::client::CreateClientRequest;

    fn sample_client() -> Client {
        Client::from_request(CreateClientRequest {
            name: "Megan Riley".to_string(),
            email: Some("megan@example.com".to_string()),
            phone: None,
            address: Some("12 Mooloolaba Esplanade".to_string()),
            suburb: Some("Mooloolaba".to_string()),
            lat: None,
            lng: None,
            bedrooms: Some(3),
            bathrooms: Some(2),
            living_areas: None,
            kitchens: Some(1),
            frequency: Some("weekly".to_string()),
            preferred_day: Some("tuesday".to_string()),
            preferred_time: Some("morning".to_string()),
            duration_override_minutes: None,
            access_notes: Some("Key under the pot".to_string()),
            special_instructions: None,
            status: None,
            is_demo: None,
        })
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parse_and_locking() {
        assert_eq!(JobStatus::parse("In Progress"), JobStatus::InProgress);
        assert_eq!(JobStatus::parse("done"), JobStatus::Completed);
        assert_eq!(JobStatus::parse("unknown"), JobStatus::Scheduled);
        assert!(JobStatus::InProgress.is_locked());
        assert!(JobStatus::Completed.is_locked());
        assert!(!JobStatus::Scheduled.is_locked());
        assert!(!JobStatus::Cancelled.is_locked());
    }

    #[test]
    fn test_for_client_fills_snapshot_and_times() {
        let client = sample_client();
        let job = ScheduledJob::for_client(&client, date(2024, 3, 5), 480, 90);

        assert_eq!(job.client_id.as_deref(), Some(client.id.to_string().as_str()));
        assert_eq!(job.client_name.as_deref(), Some("Megan Riley"));
        assert_eq!(job.suburb.as_deref(), Some("Mooloolaba"));
        assert_eq!(job.bedrooms, Some(3));
        assert_eq!(job.frequency, Some(Frequency::Weekly));
        assert_eq!(job.start_time, Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
        assert_eq!(job.end_time, Some(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
        assert_eq!(job.duration_minutes, Some(90));
        assert!(!job.published);
        assert!(!job.is_break);
    }

    #[test]
    fn test_for_client_floors_duration_at_minimum() {
        let client = sample_client();
        let job = ScheduledJob::for_client(&client, date(2024, 3, 5), 480, 5);
        assert_eq!(job.duration_minutes, Some(MIN_JOB_DURATION_MINUTES));
        assert_eq!(job.end_time, Some(NaiveTime::from_hms_opt(8, 15, 0).unwrap()));
    }

    #[test]
    fn test_snapshot_preserves_job_fields_the_client_lacks() {
        let mut client = sample_client();
        client.suburb = None;
        client.bedrooms = None;

        let mut job = ScheduledJob::for_client(&sample_client(), date(2024, 3, 5), 480, 60);
        job.suburb = Some("Buderim".to_string());
        job.bedrooms = Some(5);
        job.apply_client_snapshot(&client);

        assert_eq!(job.suburb.as_deref(), Some("Buderim"));
        assert_eq!(job.bedrooms, Some(5));
        assert_eq!(job.client_name.as_deref(), Some("Megan Riley"));
    }

    #[test]
    fn test_apply_update_recomputes_end_from_duration() {
        let client = sample_client();
        let mut job = ScheduledJob::for_client(&client, date(2024, 3, 5), 480, 60);

        let update = UpdateJobRequest {
            id: job.id,
            date: None,
            start_time: Some("10:30".to_string()),
            end_time: None,
            duration_minutes: None,
            status: None,
            assigned_teams: None,
            published: None,
        };
        job.apply_update(&update);

        assert_eq!(job.start_time, Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()));
        assert_eq!(job.end_time, Some(NaiveTime::from_hms_opt(11, 30, 0).unwrap()));
    }

    #[test]
    fn test_parsed_client_id_tolerates_whitespace_and_garbage() {
        let client = sample_client();
        let mut job = ScheduledJob::for_client(&client, date(2024, 3, 5), 480, 60);

        job.client_id = Some(format!("  {}  ", client.id));
        assert_eq!(job.parsed_client_id(), Some(client.id));

        job.client_id = Some("client_0042".to_string());
        assert_eq!(job.parsed_client_id(), None);

        job.client_id = None;
        assert_eq!(job.parsed_client_id(), None);
    }

    #[test]
    fn test_job_serializes_to_camel_case() {
        let client = sample_client();
        let job = ScheduledJob::for_client(&client, date(2024, 3, 5), 480, 60);
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("clientName").is_some());
        assert!(json.get("assignedTeams").is_some());
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["isBreak"], false);
    }

    #[test]
    fn test_break_placeholder() {
        let job = ScheduledJob::break_for(date(2024, 3, 5), "team-1", 670, 30);
        assert!(job.is_break);
        assert_eq!(job.assigned_teams, vec!["team-1".to_string()]);
        assert_eq!(job.start_time, Some(NaiveTime::from_hms_opt(11, 10, 0).unwrap()));
        assert_eq!(job.end_time, Some(NaiveTime::from_hms_opt(11, 40, 0).unwrap()));
    }
}
