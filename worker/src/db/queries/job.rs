//! Scheduled job database queries

use anyhow::{anyhow, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::storage::JobFilter;
use crate::types::ScheduledJob;

/// List jobs matching the filter.
///
/// Ordered by date, then start time with unscheduled jobs last, then
/// insertion order, so callers can rely on "first match" being stable.
pub async fn list_jobs(pool: &PgPool, filter: &JobFilter) -> Result<Vec<ScheduledJob>> {
    // Build WHERE conditions dynamically
    let mut conditions: Vec<String> = Vec::new();
    let mut param_idx = 0;

    if !filter.include_breaks {
        conditions.push("is_break = FALSE".to_string());
    }
    if filter.client_id.is_some() {
        param_idx += 1;
        // Legacy references may carry whitespace or uppercase hex.
        conditions.push(format!("LOWER(TRIM(client_id)) = ${}", param_idx));
    }
    if filter.on_date.is_some() {
        param_idx += 1;
        conditions.push(format!("date = ${}", param_idx));
    }
    if filter.from_date.is_some() {
        param_idx += 1;
        conditions.push(format!("date >= ${}", param_idx));
    }
    if filter.to_date.is_some() {
        param_idx += 1;
        conditions.push(format!("date <= ${}", param_idx));
    }
    if filter.team_id.is_some() {
        param_idx += 1;
        conditions.push(format!("${} = ANY(assigned_teams)", param_idx));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let query = format!(
        r#"
        SELECT
            id, date, client_id, client_name, suburb, address,
            email, phone,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_time,
            access_notes, special_instructions,
            start_time, end_time, duration_minutes,
            status, assigned_teams,
            published, is_demo, is_break,
            created_at, updated_at
        FROM scheduled_jobs
        {}
        ORDER BY date, start_time ASC NULLS LAST, created_at, id
        "#,
        where_clause
    );

    // Build query with bindings
    let mut query_builder = sqlx::query_as::<_, ScheduledJob>(&query);

    if let Some(cid) = filter.client_id {
        query_builder = query_builder.bind(cid.to_string());
    }
    if let Some(on) = filter.on_date {
        query_builder = query_builder.bind(on);
    }
    if let Some(from) = filter.from_date {
        query_builder = query_builder.bind(from);
    }
    if let Some(to) = filter.to_date {
        query_builder = query_builder.bind(to);
    }
    if let Some(team_id) = &filter.team_id {
        query_builder = query_builder.bind(team_id.clone());
    }

    let jobs = query_builder.fetch_all(pool).await?;

    Ok(jobs)
}

/// Get a single job
pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<ScheduledJob>> {
    let job = sqlx::query_as::<_, ScheduledJob>(
        r#"
        SELECT
            id, date, client_id, client_name, suburb, address,
            email, phone,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_time,
            access_notes, special_instructions,
            start_time, end_time, duration_minutes,
            status, assigned_teams,
            published, is_demo, is_break,
            created_at, updated_at
        FROM scheduled_jobs
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// Insert a new job
pub async fn create_job(pool: &PgPool, job: &ScheduledJob) -> Result<ScheduledJob> {
    let created = sqlx::query_as::<_, ScheduledJob>(
        r#"
        INSERT INTO scheduled_jobs (
            id, date, client_id, client_name, suburb, address,
            email, phone,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_time,
            access_notes, special_instructions,
            start_time, end_time, duration_minutes,
            status, assigned_teams,
            published, is_demo, is_break,
            created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6,
            $7, $8,
            $9, $10, $11, $12,
            $13, $14,
            $15, $16,
            $17, $18, $19,
            $20, $21,
            $22, $23, $24,
            $25, $26
        )
        RETURNING
            id, date, client_id, client_name, suburb, address,
            email, phone,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_time,
            access_notes, special_instructions,
            start_time, end_time, duration_minutes,
            status, assigned_teams,
            published, is_demo, is_break,
            created_at, updated_at
        "#,
    )
    .bind(job.id)
    .bind(job.date)
    .bind(&job.client_id)
    .bind(&job.client_name)
    .bind(&job.suburb)
    .bind(&job.address)
    .bind(&job.email)
    .bind(&job.phone)
    .bind(job.bedrooms)
    .bind(job.bathrooms)
    .bind(job.living_areas)
    .bind(job.kitchens)
    .bind(job.frequency)
    .bind(job.preferred_time)
    .bind(&job.access_notes)
    .bind(&job.special_instructions)
    .bind(job.start_time)
    .bind(job.end_time)
    .bind(job.duration_minutes)
    .bind(job.status)
    .bind(&job.assigned_teams)
    .bind(job.published)
    .bind(job.is_demo)
    .bind(job.is_break)
    .bind(job.created_at)
    .bind(job.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Replace a job record
pub async fn update_job(pool: &PgPool, job: &ScheduledJob) -> Result<ScheduledJob> {
    let updated = sqlx::query_as::<_, ScheduledJob>(
        r#"
        UPDATE scheduled_jobs SET
            date = $2,
            client_id = $3,
            client_name = $4,
            suburb = $5,
            address = $6,
            email = $7,
            phone = $8,
            bedrooms = $9,
            bathrooms = $10,
            living_areas = $11,
            kitchens = $12,
            frequency = $13,
            preferred_time = $14,
            access_notes = $15,
            special_instructions = $16,
            start_time = $17,
            end_time = $18,
            duration_minutes = $19,
            status = $20,
            assigned_teams = $21,
            published = $22,
            is_demo = $23,
            is_break = $24,
            updated_at = $25
        WHERE id = $1
        RETURNING
            id, date, client_id, client_name, suburb, address,
            email, phone,
            bedrooms, bathrooms, living_areas, kitchens,
            frequency, preferred_time,
            access_notes, special_instructions,
            start_time, end_time, duration_minutes,
            status, assigned_teams,
            published, is_demo, is_break,
            created_at, updated_at
        "#,
    )
    .bind(job.id)
    .bind(job.date)
    .bind(&job.client_id)
    .bind(&job.client_name)
    .bind(&job.suburb)
    .bind(&job.address)
    .bind(&job.email)
    .bind(&job.phone)
    .bind(job.bedrooms)
    .bind(job.bathrooms)
    .bind(job.living_areas)
    .bind(job.kitchens)
    .bind(job.frequency)
    .bind(job.preferred_time)
    .bind(&job.access_notes)
    .bind(&job.special_instructions)
    .bind(job.start_time)
    .bind(job.end_time)
    .bind(job.duration_minutes)
    .bind(job.status)
    .bind(&job.assigned_teams)
    .bind(job.published)
    .bind(job.is_demo)
    .bind(job.is_break)
    .bind(job.updated_at)
    .fetch_optional(pool)
    .await?;

    updated.ok_or_else(|| anyhow!("Job {} not found", job.id))
}

/// Delete a job
pub async fn delete_job(pool: &PgPool, job_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM scheduled_jobs WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
