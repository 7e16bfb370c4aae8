//! Job message handlers

use anyhow::Result;
use async_nats::{Client as NatsClient, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::defaults::MIN_JOB_DURATION_MINUTES;
use crate::handlers::notify_changed;
use crate::services::duration::estimate_duration_minutes;
use crate::storage::{JobFilter, PgStore, Store};
use crate::types::{
    time_to_minutes, CreateJobRequest, ErrorResponse, ListJobsRequest, Request, ScheduledJob,
    SuccessResponse, UpdateJobRequest,
};

/// Handle job.list messages
pub async fn handle_list(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received job.list message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<ListJobsRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let filter = JobFilter::from(request.payload.clone());

        match store.list_jobs(&filter).await {
            Ok(jobs) => {
                debug!("Listed {} jobs", jobs.len());
                let response = SuccessResponse::new(request.id, jobs);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to list jobs: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Build a job from a manual create request. When the referenced client
/// exists its snapshot and estimated duration come along; otherwise the
/// job carries only what the request supplied.
async fn build_manual_job(store: &PgStore, req: &CreateJobRequest) -> Result<ScheduledJob> {
    let settings = store.get_settings().await?;

    let client = match req.client_id {
        Some(id) => store.get_client(id).await?,
        None => None,
    };

    let start = req
        .start_time
        .as_deref()
        .and_then(time_to_minutes)
        .unwrap_or_else(|| settings.working_hours.start_minutes());

    let mut job = match &client {
        Some(client) => {
            let duration = req
                .duration_minutes
                .unwrap_or_else(|| estimate_duration_minutes(client, &settings.duration_estimates))
                .max(MIN_JOB_DURATION_MINUTES);
            ScheduledJob::for_client(client, req.date, start, duration)
        }
        None => {
            let duration = req
                .duration_minutes
                .unwrap_or(settings.duration_estimates.base_minutes)
                .max(MIN_JOB_DURATION_MINUTES);
            let mut job = ScheduledJob::manual(req.date, start, duration);
            job.client_id = req.client_id.map(|id| id.to_string());
            job.client_name = req.client_name.clone();
            job.suburb = req.suburb.clone();
            job.address = req.address.clone();
            job
        }
    };

    if let Some(teams) = &req.assigned_teams {
        job.assigned_teams = teams.clone();
    }
    if let Some(is_break) = req.is_break {
        job.is_break = is_break;
    }

    Ok(job)
}

/// Handle job.create messages for one-off manual additions
pub async fn handle_create(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received job.create message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<CreateJobRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let job = match build_manual_job(&store, &request.payload).await {
            Ok(job) => job,
            Err(e) => {
                error!("Failed to prepare job: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match store.create_job(&job).await {
            Ok(created) => {
                notify_changed(&nats, "jobs").await;
                let response = SuccessResponse::new(request.id, created);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Created job: {}", response.payload.id);
            }
            Err(e) => {
                error!("Failed to create job: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle job.update messages
///
/// This is the drag-and-drop path: time, status, team and publish changes
/// land here one job at a time.
pub async fn handle_update(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received job.update message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<UpdateJobRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let update_request = request.payload.clone();

        let mut job = match store.get_job(update_request.id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Job not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
            Err(e) => {
                error!("Failed to load job {}: {}", update_request.id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        job.apply_update(&update_request);

        match store.update_job(&job).await {
            Ok(saved) => {
                notify_changed(&nats, "jobs").await;
                let response = SuccessResponse::new(request.id, saved);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Updated job: {}", response.payload.id);
            }
            Err(e) => {
                error!("Failed to update job: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Delete response payload
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobResponse {
    pub deleted: bool,
}

/// Handle job.delete messages
pub async fn handle_delete(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    #[derive(serde::Deserialize)]
    struct DeleteRequest {
        id: Uuid,
    }

    while let Some(msg) = subscriber.next().await {
        debug!("Received job.delete message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<DeleteRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match store.get_job(request.payload.id).await {
            Ok(Some(existing)) => match store.delete_job(existing.id).await {
                Ok(()) => {
                    notify_changed(&nats, "jobs").await;
                    let response =
                        SuccessResponse::new(request.id, DeleteJobResponse { deleted: true });
                    let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                    debug!("Deleted job: {}", existing.id);
                }
                Err(e) => {
                    error!("Failed to delete job: {}", e);
                    let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                    let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                }
            },
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Job not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to load job {}: {}", request.payload.id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
