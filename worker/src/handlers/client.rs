//! Client message handlers

use anyhow::Result;
use async_nats::{Client as NatsClient, Subscriber};
use chrono::Utc;
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::defaults::DEFAULT_HORIZON_WEEKS;
use crate::handlers::notify_changed;
use crate::services::{demo, geo, reconciler};
use crate::storage::{JobFilter, PgStore, Store};
use crate::types::{
    Client, CreateClientRequest, ErrorResponse, Request, SuccessResponse, UpdateClientRequest,
};

/// Regenerate the client's future jobs after a record write. The write has
/// already succeeded, so failures here are logged rather than returned.
async fn refresh_schedule(store: &PgStore, client: &Client) {
    let settings = match store.get_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Could not load settings to refresh schedule for {}: {}", client.id, e);
            return;
        }
    };

    let today = Utc::now().date_naive();
    match reconciler::reconcile_client(store, client, &settings, today, DEFAULT_HORIZON_WEEKS).await
    {
        Ok(outcome) => {
            debug!(
                "Refreshed schedule for {}: {} created, {} updated, {} removed",
                client.id, outcome.created, outcome.updated, outcome.removed
            );
        }
        Err(e) => {
            warn!("Failed to refresh schedule for client {}: {}", client.id, e);
        }
    }
}

/// Pin coordinates from the suburb table when the record has none.
fn pin_coordinates(client: &mut Client) {
    if client.lat.is_some() && client.lng.is_some() {
        return;
    }
    if let Some(suburb) = client.suburb.as_deref() {
        if geo::known_suburb(suburb) {
            let coords = geo::suburb_coordinates(suburb);
            client.lat = Some(coords.lat);
            client.lng = Some(coords.lng);
            debug!("Pinned {} to the {} centroid", client.name, suburb);
        }
    }
}

/// Handle client.create messages
///
/// Missing coordinates are filled from the suburb centroid table, then the
/// client's recurring jobs are generated before the reply goes out.
pub async fn handle_create(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received client.create message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<CreateClientRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let mut new_client = Client::from_request(request.payload.clone());
        pin_coordinates(&mut new_client);

        // Create client
        match store.create_client(&new_client).await {
            Ok(created) => {
                refresh_schedule(&store, &created).await;
                notify_changed(&nats, "clients").await;
                notify_changed(&nats, "jobs").await;

                let response = SuccessResponse::new(request.id, created);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Created client: {}", response.payload.id);
            }
            Err(e) => {
                error!("Failed to create client: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle client.list messages
pub async fn handle_list(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received client.list message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // The list takes no parameters; parse the envelope for the request id.
        let request_id = serde_json::from_slice::<Request<serde_json::Value>>(&msg.payload)
            .map(|req| req.id)
            .unwrap_or_else(|_| Uuid::nil());

        match store.list_clients().await {
            Ok(clients) => {
                debug!("Listed {} clients", clients.len());
                let response = SuccessResponse::new(request_id, clients);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Failed to list clients: {}", e);
                let error = ErrorResponse::new(request_id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle client.get messages
pub async fn handle_get(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    #[derive(serde::Deserialize)]
    struct GetRequest {
        id: Uuid,
    }

    while let Some(msg) = subscriber.next().await {
        debug!("Received client.get message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<GetRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        // Get client
        match store.get_client(request.payload.id).await {
            Ok(Some(found)) => {
                let response = SuccessResponse::new(request.id, found);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Got client: {}", response.payload.id);
            }
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Client not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to get client: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle client.update messages
///
/// After the record is written the client's future jobs are reconciled, so
/// a frequency or day change reshapes the rota straight away and pausing a
/// client drains their upcoming visits.
pub async fn handle_update(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received client.update message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<UpdateClientRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let update_request = request.payload.clone();

        let mut updated = match store.get_client(update_request.id).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Client not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
            Err(e) => {
                error!("Failed to load client {}: {}", update_request.id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        updated.apply_update(&update_request);

        // A suburb change without explicit coordinates re-pins the record.
        if update_request.suburb.is_some()
            && update_request.lat.is_none()
            && update_request.lng.is_none()
        {
            updated.lat = None;
            updated.lng = None;
            pin_coordinates(&mut updated);
        }

        match store.update_client(&updated).await {
            Ok(saved) => {
                refresh_schedule(&store, &saved).await;
                notify_changed(&nats, "clients").await;
                notify_changed(&nats, "jobs").await;

                let response = SuccessResponse::new(request.id, saved);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                debug!("Updated client: {}", response.payload.id);
            }
            Err(e) => {
                error!("Failed to update client: {}", e);
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
pub struct DeleteClientResponse {
    pub deleted: bool,
    pub jobs_removed: u64,
}

/// Remove the client and every job record that references it.
async fn delete_client_with_jobs(store: &PgStore, id: Uuid) -> Result<u64> {
    let jobs = store.list_jobs(&JobFilter::for_client(id)).await?;
    for job in &jobs {
        store.delete_job(job.id).await?;
    }
    store.delete_client(id).await?;
    Ok(jobs.len() as u64)
}

/// Handle client.delete messages
///
/// Hard delete: the client's job records, past and future, go with it.
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
        debug!("Received client.delete message");

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

        match store.get_client(request.payload.id).await {
            Ok(Some(existing)) => {
                match delete_client_with_jobs(&store, existing.id).await {
                    Ok(jobs_removed) => {
                        info!("Deleted client {} and {} jobs", existing.id, jobs_removed);
                        notify_changed(&nats, "clients").await;
                        notify_changed(&nats, "jobs").await;

                        let response = SuccessResponse::new(
                            request.id,
                            DeleteClientResponse {
                                deleted: true,
                                jobs_removed,
                            },
                        );
                        let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
                    }
                    Err(e) => {
                        error!("Failed to delete client {}: {}", existing.id, e);
                        let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                        let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                    }
                }
            }
            Ok(None) => {
                let error = ErrorResponse::new(request.id, "NOT_FOUND", "Client not found");
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Failed to load client {}: {}", request.payload.id, e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle client.random messages
///
/// Seeds demo clients, schedules included, for empty or trial environments.
pub async fn handle_random(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
) -> Result<()> {
    #[derive(serde::Deserialize)]
    struct RandomRequest {
        #[serde(default)]
        count: Option<u32>,
    }

    while let Some(msg) = subscriber.next().await {
        debug!("Received client.random message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<RandomRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let count = request.payload.count.unwrap_or(1).clamp(1, 25);
        let mut rng = StdRng::from_entropy();
        let mut created = Vec::with_capacity(count as usize);
        let mut failure = None;

        for _ in 0..count {
            let mut candidate = demo::random_demo_client(&mut rng);
            pin_coordinates(&mut candidate);

            match store.create_client(&candidate).await {
                Ok(saved) => {
                    refresh_schedule(&store, &saved).await;
                    created.push(saved);
                }
                Err(e) => {
                    error!("Failed to create demo client: {}", e);
                    failure = Some(e);
                    break;
                }
            }
        }

        if !created.is_empty() {
            notify_changed(&nats, "clients").await;
            notify_changed(&nats, "jobs").await;
        }

        match failure {
            None => {
                info!("Seeded {} demo clients", created.len());
                let response = SuccessResponse::new(request.id, created);
                let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Some(e) => {
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
