//! Schedule message handlers
//!
//! The reconciliation surface: previewing occurrence dates, regenerating
//! one client or the whole book, and packing a day into team capacity.

use anyhow::Result;
use async_nats::{Client as NatsClient, Subscriber};
use chrono::{NaiveDate, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::defaults::DEFAULT_HORIZON_WEEKS;
use crate::handlers::notify_changed;
use crate::services::reconciler;
use crate::storage::{PgStore, Store};
use crate::types::{weekday_name, ErrorResponse, Request, SuccessResponse};

/// Request for a recurrence preview
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub client_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub horizon_weeks: Option<u32>,
}

/// Occurrence dates a client would be scheduled on, without touching jobs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub client_id: Uuid,
    pub weekday: String,
    pub dates: Vec<NaiveDate>,
}

/// Request to reconcile a single client's schedule
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub client_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub horizon_weeks: Option<u32>,
}

/// Request to regenerate every active client's schedule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub start_date: Option<NaiveDate>,
    pub horizon_weeks: Option<u32>,
}

/// Request to pack one day's jobs into team capacity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDayRequest {
    pub date: NaiveDate,
}

/// Handle schedule.preview messages
pub async fn handle_preview(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received schedule.preview message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<PreviewRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let target = match store.get_client(request.payload.client_id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Client not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
            Err(e) => {
                error!("Failed to load client {}: {}", request.payload.client_id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let settings = match store.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let start = request.payload.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let horizon = request.payload.horizon_weeks.unwrap_or(DEFAULT_HORIZON_WEEKS);
        let dates = reconciler::target_dates(&target, &settings, start, horizon);
        let weekday = reconciler::target_weekday(&target, &settings);

        let response = SuccessResponse::new(
            request.id,
            PreviewResponse {
                client_id: target.id,
                weekday: weekday_name(weekday).to_string(),
                dates,
            },
        );
        let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}

/// Handle schedule.reconcile messages for one client
pub async fn handle_reconcile(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received schedule.reconcile message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<ReconcileRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let target = match store.get_client(request.payload.client_id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Client not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
            Err(e) => {
                error!("Failed to load client {}: {}", request.payload.client_id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let settings = match store.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let start = request.payload.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let horizon = request.payload.horizon_weeks.unwrap_or(DEFAULT_HORIZON_WEEKS);

        match reconciler::reconcile_client(&store, &target, &settings, start, horizon).await {
            Ok(outcome) => {
                notify_changed(&nats, "jobs").await;
                let response = SuccessResponse::new(request.id, outcome);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!(
                    "Reconciled {}: {} created, {} updated, {} removed, {} kept",
                    target.id, outcome.created, outcome.updated, outcome.removed, outcome.kept
                );
            }
            Err(e) => {
                error!("Failed to reconcile client {}: {}", target.id, e);
                let error = ErrorResponse::new(request.id, "RECONCILE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle schedule.regenerate messages
///
/// Repairs client links first, then reconciles every active client.
/// Individual client failures are reported in the response, not raised.
pub async fn handle_regenerate(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received schedule.regenerate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<RegenerateRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let settings = match store.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let start = request.payload.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let horizon = request.payload.horizon_weeks.unwrap_or(DEFAULT_HORIZON_WEEKS);

        match reconciler::reconcile_all(&store, &settings, start, horizon).await {
            Ok(report) => {
                notify_changed(&nats, "jobs").await;
                info!(
                    "Regenerated schedules: {} clients, {} created, {} removed, {} failures",
                    report.clients_processed,
                    report.outcome.created,
                    report.outcome.removed,
                    report.failures.len()
                );
                let response = SuccessResponse::new(request.id, report);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to regenerate schedules: {}", e);
                let error = ErrorResponse::new(request.id, "RECONCILE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle schedule.pack_day messages
///
/// Assigns one day's unlocked jobs to teams back to back, break included.
/// Jobs that fit nowhere stay as they were and come back in the unplaced
/// count.
pub async fn handle_pack_day(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received schedule.pack_day message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<PackDayRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let settings = match store.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match reconciler::pack_day(&store, request.payload.date, &settings).await {
            Ok(outcome) => {
                notify_changed(&nats, "jobs").await;
                info!(
                    "Packed {}: {} assigned, {} unplaced, {} breaks",
                    outcome.date, outcome.assigned, outcome.unplaced, outcome.breaks_created
                );
                let response = SuccessResponse::new(request.id, outcome);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to pack day {}: {}", request.payload.date, e);
                let error = ErrorResponse::new(request.id, "PACK_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
