//! Route message handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client as NatsClient, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::day_route::compose_day_route;
use crate::services::travel::TravelEstimator;
use crate::storage::{JobFilter, PgStore, Store};
use crate::types::{ErrorResponse, Request, RouteSummaryRequest, SuccessResponse};

/// Handle route.summary messages
///
/// Composes the day's drive: stops in visit order with a travel estimate
/// for every leg between them.
pub async fn handle_summary(
    nats: NatsClient,
    mut subscriber: Subscriber,
    store: PgStore,
    estimator: Arc<TravelEstimator>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.summary message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<RouteSummaryRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let filter = JobFilter {
            on_date: Some(request.payload.date),
            team_id: request.payload.team_id.clone(),
            ..Default::default()
        };

        let jobs = match store.list_jobs(&filter).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to list jobs for route: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let clients = match store.list_clients().await {
            Ok(clients) => clients,
            Err(e) => {
                error!("Failed to list clients for route: {}", e);
                let error = ErrorResponse::new(request.id, "DATABASE_ERROR", e.to_string());
                let _ = nats.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let route = compose_day_route(
            &estimator,
            request.payload.date,
            request.payload.team_id.clone(),
            &jobs,
            &clients,
        )
        .await;

        debug!(
            "Composed route for {}: {} stops, {:.1} km",
            route.date,
            route.stops.len(),
            route.total_distance_km
        );
        let response = SuccessResponse::new(request.id, route);
        let _ = nats.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}
