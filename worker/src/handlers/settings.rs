//! Settings message handlers

use anyhow::Result;
use async_nats::{Client as NatsClient, Subscriber};
use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::defaults::DEFAULT_HORIZON_WEEKS;
use crate::handlers::notify_changed;
use crate::services::reconciler;
use crate::storage::{PgStore, Store};
use crate::types::{EmptyPayload, ErrorResponse, Request, ScheduleSettings, SuccessResponse};

/// Handle settings.get messages
///
/// Always answers: an unset document comes back as the defaults.
pub async fn handle_get(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received settings.get message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request (empty payload)
        let request: Request<EmptyPayload> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match store.get_settings().await {
            Ok(settings) => {
                let response = SuccessResponse::new(request.id, settings);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to get settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle settings.update messages
///
/// The whole document is validated and replaced, last write wins. A saved
/// change reshapes the rota, so every active client is reconciled before
/// the reply goes out.
pub async fn handle_update(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received settings.update message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<ScheduleSettings> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let settings = request.payload.clone();

        // Reject bad documents at the boundary; the core assumes valid ones.
        if let Err(e) = settings.validate() {
            warn!("Rejected settings update: {}", e);
            let error = ErrorResponse::new(request.id, "VALIDATION_ERROR", e.to_string());
            let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            continue;
        }

        match store.save_settings(&settings).await {
            Ok(()) => {
                notify_changed(&nats, "schedule_settings").await;

                // The area plan or capacity changed underneath the rota.
                let today = Utc::now().date_naive();
                match reconciler::reconcile_all(&store, &settings, today, DEFAULT_HORIZON_WEEKS)
                    .await
                {
                    Ok(report) => {
                        info!(
                            "Settings saved, schedules refreshed: {} clients, {} failures",
                            report.clients_processed,
                            report.failures.len()
                        );
                        notify_changed(&nats, "jobs").await;
                    }
                    Err(e) => {
                        warn!("Settings saved but schedule refresh failed: {}", e);
                    }
                }

                let response = SuccessResponse::new(request.id, settings);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Saved settings");
            }
            Err(e) => {
                error!("Failed to save settings: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
