//! NATS message handlers

pub mod client;
pub mod job;
pub mod ping;
pub mod route;
pub mod schedule;
pub mod settings;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client as NatsClient;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::directions::create_directions_provider;
use crate::services::travel::TravelEstimator;
use crate::storage::PgStore;
use crate::types::ChangeEvent;

/// Best-effort change notification so open frontends can refresh their
/// collections. Delivery failures are ignored.
pub(crate) async fn notify_changed(nats: &NatsClient, table: &str) {
    let event = ChangeEvent::new(table);
    if let Ok(bytes) = serde_json::to_vec(&event) {
        let _ = nats.publish(format!("tidywave.changed.{table}"), bytes.into()).await;
    }
}

/// Start all message handlers
pub async fn start_handlers(nats: NatsClient, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let store = PgStore::new(pool);

    // Travel estimator, with the distance-matrix provider when configured
    let estimator = Arc::new(TravelEstimator::new(create_directions_provider(
        config.directions_api_url.clone(),
        config.directions_api_key.clone(),
    )));

    // Subscribe to all subjects
    let ping_sub = nats.subscribe("tidywave.ping").await?;

    // Client subjects
    let client_create_sub = nats.subscribe("tidywave.client.create").await?;
    let client_list_sub = nats.subscribe("tidywave.client.list").await?;
    let client_get_sub = nats.subscribe("tidywave.client.get").await?;
    let client_update_sub = nats.subscribe("tidywave.client.update").await?;
    let client_delete_sub = nats.subscribe("tidywave.client.delete").await?;
    let client_random_sub = nats.subscribe("tidywave.client.random").await?;

    // Job subjects
    let job_list_sub = nats.subscribe("tidywave.job.list").await?;
    let job_create_sub = nats.subscribe("tidywave.job.create").await?;
    let job_update_sub = nats.subscribe("tidywave.job.update").await?;
    let job_delete_sub = nats.subscribe("tidywave.job.delete").await?;

    // Schedule subjects
    let schedule_preview_sub = nats.subscribe("tidywave.schedule.preview").await?;
    let schedule_reconcile_sub = nats.subscribe("tidywave.schedule.reconcile").await?;
    let schedule_regenerate_sub = nats.subscribe("tidywave.schedule.regenerate").await?;
    let schedule_pack_day_sub = nats.subscribe("tidywave.schedule.pack_day").await?;

    // Route subjects
    let route_summary_sub = nats.subscribe("tidywave.route.summary").await?;

    // Settings subjects
    let settings_get_sub = nats.subscribe("tidywave.settings.get").await?;
    let settings_update_sub = nats.subscribe("tidywave.settings.update").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let nats_ping = nats.clone();
    let nats_client_create = nats.clone();
    let nats_client_list = nats.clone();
    let nats_client_get = nats.clone();
    let nats_client_update = nats.clone();
    let nats_client_delete = nats.clone();
    let nats_client_random = nats.clone();
    let nats_job_list = nats.clone();
    let nats_job_create = nats.clone();
    let nats_job_update = nats.clone();
    let nats_job_delete = nats.clone();
    let nats_schedule_preview = nats.clone();
    let nats_schedule_reconcile = nats.clone();
    let nats_schedule_regenerate = nats.clone();
    let nats_schedule_pack_day = nats.clone();
    let nats_route_summary = nats.clone();
    let nats_settings_get = nats.clone();
    let nats_settings_update = nats.clone();

    let store_client_create = store.clone();
    let store_client_list = store.clone();
    let store_client_get = store.clone();
    let store_client_update = store.clone();
    let store_client_delete = store.clone();
    let store_client_random = store.clone();
    let store_job_list = store.clone();
    let store_job_create = store.clone();
    let store_job_update = store.clone();
    let store_job_delete = store.clone();
    let store_schedule_preview = store.clone();
    let store_schedule_reconcile = store.clone();
    let store_schedule_regenerate = store.clone();
    let store_schedule_pack_day = store.clone();
    let store_route_summary = store.clone();
    let store_settings_get = store.clone();
    let store_settings_update = store.clone();

    let estimator_route_summary = Arc::clone(&estimator);

    // Spawn handlers
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(nats_ping, ping_sub).await
    });

    let client_create_handle = tokio::spawn(async move {
        client::handle_create(nats_client_create, client_create_sub, store_client_create).await
    });

    let client_list_handle = tokio::spawn(async move {
        client::handle_list(nats_client_list, client_list_sub, store_client_list).await
    });

    let client_get_handle = tokio::spawn(async move {
        client::handle_get(nats_client_get, client_get_sub, store_client_get).await
    });

    let client_update_handle = tokio::spawn(async move {
        client::handle_update(nats_client_update, client_update_sub, store_client_update).await
    });

    let client_delete_handle = tokio::spawn(async move {
        client::handle_delete(nats_client_delete, client_delete_sub, store_client_delete).await
    });

    let client_random_handle = tokio::spawn(async move {
        client::handle_random(nats_client_random, client_random_sub, store_client_random).await
    });

    // Job handlers
    let job_list_handle = tokio::spawn(async move {
        job::handle_list(nats_job_list, job_list_sub, store_job_list).await
    });

    let job_create_handle = tokio::spawn(async move {
        job::handle_create(nats_job_create, job_create_sub, store_job_create).await
    });

    let job_update_handle = tokio::spawn(async move {
        job::handle_update(nats_job_update, job_update_sub, store_job_update).await
    });

    let job_delete_handle = tokio::spawn(async move {
        job::handle_delete(nats_job_delete, job_delete_sub, store_job_delete).await
    });

    // Schedule handlers
    let schedule_preview_handle = tokio::spawn(async move {
        schedule::handle_preview(nats_schedule_preview, schedule_preview_sub, store_schedule_preview).await
    });

    let schedule_reconcile_handle = tokio::spawn(async move {
        schedule::handle_reconcile(nats_schedule_reconcile, schedule_reconcile_sub, store_schedule_reconcile).await
    });

    let schedule_regenerate_handle = tokio::spawn(async move {
        schedule::handle_regenerate(nats_schedule_regenerate, schedule_regenerate_sub, store_schedule_regenerate).await
    });

    let schedule_pack_day_handle = tokio::spawn(async move {
        schedule::handle_pack_day(nats_schedule_pack_day, schedule_pack_day_sub, store_schedule_pack_day).await
    });

    // Route handlers
    let route_summary_handle = tokio::spawn(async move {
        route::handle_summary(nats_route_summary, route_summary_sub, store_route_summary, estimator_route_summary).await
    });

    // Settings handlers
    let settings_get_handle = tokio::spawn(async move {
        settings::handle_get(nats_settings_get, settings_get_sub, store_settings_get).await
    });

    let settings_update_handle = tokio::spawn(async move {
        settings::handle_update(nats_settings_update, settings_update_sub, store_settings_update).await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = client_create_handle => {
            error!("Client create handler finished: {:?}", result);
        }
        result = client_list_handle => {
            error!("Client list handler finished: {:?}", result);
        }
        result = client_get_handle => {
            error!("Client get handler finished: {:?}", result);
        }
        result = client_update_handle => {
            error!("Client update handler finished: {:?}", result);
        }
        result = client_delete_handle => {
            error!("Client delete handler finished: {:?}", result);
        }
        result = client_random_handle => {
            error!("Client random handler finished: {:?}", result);
        }
        result = job_list_handle => {
            error!("Job list handler finished: {:?}", result);
        }
        result = job_create_handle => {
            error!("Job create handler finished: {:?}", result);
        }
        result = job_update_handle => {
            error!("Job update handler finished: {:?}", result);
        }
        result = job_delete_handle => {
            error!("Job delete handler finished: {:?}", result);
        }
        result = schedule_preview_handle => {
            error!("Schedule preview handler finished: {:?}", result);
        }
        result = schedule_reconcile_handle => {
            error!("Schedule reconcile handler finished: {:?}", result);
        }
        result = schedule_regenerate_handle => {
            error!("Schedule regenerate handler finished: {:?}", result);
        }
        result = schedule_pack_day_handle => {
            error!("Schedule pack day handler finished: {:?}", result);
        }
        result = route_summary_handle => {
            error!("Route summary handler finished: {:?}", result);
        }
        result = settings_get_handle => {
            error!("Settings get handler finished: {:?}", result);
        }
        result = settings_update_handle => {
            error!("Settings update handler finished: {:?}", result);
        }
    }

    Ok(())
}
