//! In-memory `Store` backend used by tests and demo seeding

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveTime;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::storage::{JobFilter, Store};
use crate::types::{Client, ScheduleSettings, ScheduledJob};

#[derive(Default)]
struct Inner {
    clients: HashMap<Uuid, Client>,
    jobs: HashMap<Uuid, ScheduledJob>,
    settings: Option<ScheduleSettings>,
}

/// HashMap-backed store guarded by a single RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(job: &ScheduledJob, filter: &JobFilter) -> bool {
    if !filter.include_breaks && job.is_break {
        return false;
    }
    if let Some(client_id) = filter.client_id {
        if job.parsed_client_id() != Some(client_id) {
            return false;
        }
    }
    if let Some(on) = filter.on_date {
        if job.date != on {
            return false;
        }
    }
    if let Some(from) = filter.from_date {
        if job.date < from {
            return false;
        }
    }
    if let Some(to) = filter.to_date {
        if job.date > to {
            return false;
        }
    }
    if let Some(team_id) = &filter.team_id {
        if !job.assigned_teams.iter().any(|t| t == team_id) {
            return false;
        }
    }
    true
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        let inner = self.inner.read();
        let mut clients: Vec<Client> = inner.clients.values().cloned().collect();
        clients.sort_by_key(|c| (c.created_at, c.id));
        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        Ok(self.inner.read().clients.get(&id).cloned())
    }

    async fn create_client(&self, client: &Client) -> Result<Client> {
        self.inner.write().clients.insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn update_client(&self, client: &Client) -> Result<Client> {
        let mut inner = self.inner.write();
        if !inner.clients.contains_key(&client.id) {
            return Err(anyhow!("Client {} not found", client.id));
        }
        inner.clients.insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn delete_client(&self, id: Uuid) -> Result<()> {
        self.inner.write().clients.remove(&id);
        Ok(())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<ScheduledJob>> {
        let inner = self.inner.read();
        let mut jobs: Vec<ScheduledJob> = inner
            .jobs
            .values()
            .filter(|j| matches(j, filter))
            .cloned()
            .collect();
        // Date, then start time with unscheduled jobs last, then insertion order.
        jobs.sort_by_key(|j| {
            (
                j.date,
                j.start_time.is_none(),
                j.start_time.unwrap_or(NaiveTime::MIN),
                j.created_at,
                j.id,
            )
        });
        Ok(jobs)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ScheduledJob>> {
        Ok(self.inner.read().jobs.get(&id).cloned())
    }

    async fn create_job(&self, job: &ScheduledJob) -> Result<ScheduledJob> {
        self.inner.write().jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn update_job(&self, job: &ScheduledJob) -> Result<ScheduledJob> {
        let mut inner = self.inner.write();
        if !inner.jobs.contains_key(&job.id) {
            return Err(anyhow!("Job {} not found", job.id));
        }
        inner.jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<()> {
        self.inner.write().jobs.remove(&id);
        Ok(())
    }

    async fn get_settings(&self) -> Result<ScheduleSettings> {
        Ok(self.inner.read().settings.clone().unwrap_or_default())
    }

    async fn save_settings(&self, settings: &ScheduleSettings) -> Result<()> {
        self.inner.write().settings = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client(name: &str) -> Client {
        use crate::types::CreateClientRequest;
        Client::from_request(CreateClientRequest {
            name: name.to_string(),
            address: Some("1 Test St".to_string()),
            suburb: Some("Buderim".to_string()),
            ..Default::default()
        })
    }

    fn job_on(date: NaiveDate, start_minutes: i32) -> ScheduledJob {
        ScheduledJob::for_client(&client("Job Owner"), date, start_minutes, 60)
    }

    #[tokio::test]
    async fn test_client_roundtrip() {
        let store = MemoryStore::new();
        let created = store.create_client(&client("Alice")).await.unwrap();

        let fetched = store.get_client(created.id).await.unwrap();
        assert_eq!(fetched.as_ref().map(|c| c.name.as_str()), Some("Alice"));

        store.delete_client(created.id).await.unwrap();
        assert!(store.get_client(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_client_fails() {
        let store = MemoryStore::new();
        let ghost = client("Ghost");
        assert!(store.update_client(&ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_jobs_sorted_by_date_then_start() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        store.create_job(&job_on(later, 480)).await.unwrap();
        store.create_job(&job_on(date, 600)).await.unwrap();
        store.create_job(&job_on(date, 480)).await.unwrap();
        let mut unscheduled = job_on(date, 480);
        unscheduled.start_time = None;
        unscheduled.end_time = None;
        store.create_job(&unscheduled).await.unwrap();

        let jobs = store.list_jobs(&JobFilter::default()).await.unwrap();
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0].date, date);
        assert_eq!(jobs[0].start_minutes(), Some(480));
        assert_eq!(jobs[1].start_minutes(), Some(600));
        assert!(jobs[2].start_time.is_none(), "unscheduled job sorts last in its date");
        assert_eq!(jobs[3].date, later);
    }

    #[tokio::test]
    async fn test_job_filters() {
        let store = MemoryStore::new();
        let owner = client("Owner");
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        let mut owned = ScheduledJob::for_client(&owner, date, 480, 60);
        owned.assigned_teams = vec!["team-1".to_string()];
        store.create_job(&owned).await.unwrap();

        let mut other = job_on(date, 540);
        other.assigned_teams = vec!["team-2".to_string()];
        store.create_job(&other).await.unwrap();

        let brk = ScheduledJob::break_for(date, "team-1", 660, 30);
        store.create_job(&brk).await.unwrap();

        let by_client = store
            .list_jobs(&JobFilter::for_client(owner.id))
            .await
            .unwrap();
        assert_eq!(by_client.len(), 1);
        assert_eq!(by_client[0].id, owned.id);

        let by_team = store
            .list_jobs(&JobFilter {
                team_id: Some("team-2".to_string()),
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_team.len(), 1);
        assert_eq!(by_team[0].id, other.id);

        // Breaks only show up when asked for.
        let without_breaks = store.list_jobs(&JobFilter::on(date)).await.unwrap();
        assert_eq!(without_breaks.len(), 2);
        let with_breaks = store
            .list_jobs(&JobFilter {
                on_date: Some(date),
                include_breaks: true,
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(with_breaks.len(), 3);
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let store = MemoryStore::new();
        for day in 1..=5 {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            store.create_job(&job_on(date, 480)).await.unwrap();
        }

        let jobs = store
            .list_jobs(&JobFilter {
                from_date: NaiveDate::from_ymd_opt(2024, 3, 2),
                to_date: NaiveDate::from_ymd_opt(2024, 3, 4),
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().all(|j| {
            j.date >= NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
                && j.date <= NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        }));
    }

    #[tokio::test]
    async fn test_settings_default_until_saved() {
        let store = MemoryStore::new();
        let initial = store.get_settings().await.unwrap();
        assert_eq!(initial.teams.len(), 2);

        let mut updated = initial.clone();
        updated.max_jobs_per_team_per_day = 3;
        store.save_settings(&updated).await.unwrap();

        let reloaded = store.get_settings().await.unwrap();
        assert_eq!(reloaded.max_jobs_per_team_per_day, 3);
    }
}
