//! Postgres `Store` backend, a thin wrapper over `db::queries`

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries;
use crate::storage::{JobFilter, Store};
use crate::types::{Client, ScheduleSettings, ScheduledJob};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        queries::client::list_clients(&self.pool).await
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        queries::client::get_client(&self.pool, id).await
    }

    async fn create_client(&self, client: &Client) -> Result<Client> {
        queries::client::create_client(&self.pool, client).await
    }

    async fn update_client(&self, client: &Client) -> Result<Client> {
        queries::client::update_client(&self.pool, client).await
    }

    async fn delete_client(&self, id: Uuid) -> Result<()> {
        queries::client::delete_client(&self.pool, id).await?;
        Ok(())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<ScheduledJob>> {
        queries::job::list_jobs(&self.pool, filter).await
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<ScheduledJob>> {
        queries::job::get_job(&self.pool, id).await
    }

    async fn create_job(&self, job: &ScheduledJob) -> Result<ScheduledJob> {
        queries::job::create_job(&self.pool, job).await
    }

    async fn update_job(&self, job: &ScheduledJob) -> Result<ScheduledJob> {
        queries::job::update_job(&self.pool, job).await
    }

    async fn delete_job(&self, id: Uuid) -> Result<()> {
        queries::job::delete_job(&self.pool, id).await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<ScheduleSettings> {
        let stored = queries::settings::get_settings(&self.pool).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn save_settings(&self, settings: &ScheduleSettings) -> Result<()> {
        queries::settings::save_settings(&self.pool, settings).await
    }
}
