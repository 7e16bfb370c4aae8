//! Persistence interface consumed by the scheduling core
//!
//! The reconciler and its helpers only see the `Store` trait; production
//! wires in Postgres while tests run against the in-memory store.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{Client, ListJobsRequest, ScheduleSettings, ScheduledJob};

/// Filter for job listings.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Jobs whose client reference parses to this id
    pub client_id: Option<Uuid>,
    pub on_date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Jobs assigned to this team
    pub team_id: Option<String>,
    /// Break placeholders are excluded unless set
    pub include_breaks: bool,
}

impl JobFilter {
    pub fn for_client(client_id: Uuid) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            on_date: Some(date),
            ..Self::default()
        }
    }

    pub fn since(date: NaiveDate) -> Self {
        Self {
            from_date: Some(date),
            ..Self::default()
        }
    }
}

impl From<ListJobsRequest> for JobFilter {
    fn from(req: ListJobsRequest) -> Self {
        Self {
            client_id: req.client_id,
            on_date: req.on_date,
            from_date: req.from_date,
            to_date: req.to_date,
            team_id: req.team_id,
            include_breaks: req.include_breaks,
        }
    }
}

/// Persistence operations for clients, jobs and settings.
///
/// Listings come back in a stable order (clients by creation, jobs by
/// date then start time) so "first match" logic behaves the same on
/// every backend.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<Client>>;
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>>;
    async fn create_client(&self, client: &Client) -> Result<Client>;
    async fn update_client(&self, client: &Client) -> Result<Client>;
    async fn delete_client(&self, id: Uuid) -> Result<()>;

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<ScheduledJob>>;
    async fn get_job(&self, id: Uuid) -> Result<Option<ScheduledJob>>;
    async fn create_job(&self, job: &ScheduledJob) -> Result<ScheduledJob>;
    async fn update_job(&self, job: &ScheduledJob) -> Result<ScheduledJob>;
    async fn delete_job(&self, id: Uuid) -> Result<()>;

    /// Stored settings, or the defaults when none were saved yet.
    async fn get_settings(&self) -> Result<ScheduleSettings>;
    /// Replace the settings wholesale; last write wins.
    async fn save_settings(&self, settings: &ScheduleSettings) -> Result<()>;
}
