//! Client link repair
//!
//! Jobs imported from the old system, or whose client was deleted and
//! re-created, can carry a reference that no longer resolves. This pass
//! re-associates such jobs with the right client by matching the
//! denormalized snapshot fields, most specific first.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::{JobFilter, Store};
use crate::types::Client;

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Repair broken client references on jobs dated `from_date` or later.
///
/// A job whose stored reference parses as a UUID and resolves to a live
/// client is sound and skipped. Anything else is matched against the
/// client list by (name, suburb), then name, then address, normalized to
/// trimmed lowercase. The first client inserted wins on duplicate keys,
/// so repeated runs resolve the same way. A matched job gets the full
/// client snapshot rewritten; an unmatched job is left alone.
///
/// Returns the number of jobs repaired.
pub async fn repair_client_links(store: &dyn Store, from_date: NaiveDate) -> Result<u32> {
    let clients = store.list_clients().await?;

    let mut by_id: HashMap<Uuid, &Client> = HashMap::new();
    let mut by_name_suburb: HashMap<(String, String), &Client> = HashMap::new();
    let mut by_name: HashMap<String, &Client> = HashMap::new();
    let mut by_address: HashMap<String, &Client> = HashMap::new();

    for client in &clients {
        by_id.insert(client.id, client);

        let name = normalize(&client.name);
        if name.is_empty() {
            continue;
        }
        if let Some(suburb) = client.suburb.as_deref() {
            let suburb = normalize(suburb);
            if !suburb.is_empty() {
                by_name_suburb.entry((name.clone(), suburb)).or_insert(client);
            }
        }
        by_name.entry(name).or_insert(client);
        if let Some(address) = client.address.as_deref() {
            let address = normalize(address);
            if !address.is_empty() {
                by_address.entry(address).or_insert(client);
            }
        }
    }

    let jobs = store.list_jobs(&JobFilter::since(from_date)).await?;
    let mut repaired = 0;

    for job in jobs {
        if let Some(id) = job.parsed_client_id() {
            if by_id.contains_key(&id) {
                continue;
            }
        }

        let matched = job
            .client_name
            .as_deref()
            .map(normalize)
            .filter(|name| !name.is_empty())
            .and_then(|name| {
                job.suburb
                    .as_deref()
                    .and_then(|suburb| by_name_suburb.get(&(name.clone(), normalize(suburb))))
                    .or_else(|| by_name.get(&name))
            })
            .or_else(|| {
                job.address
                    .as_deref()
                    .and_then(|address| by_address.get(&normalize(address)))
            })
            .copied();

        let Some(client) = matched else {
            debug!(
                "No client match for job {} ({:?}), leaving as-is",
                job.id, job.client_name
            );
            continue;
        };

        let mut fixed = job.clone();
        fixed.apply_client_snapshot(client);
        fixed.updated_at = Utc::now();
        store.update_job(&fixed).await?;
        repaired += 1;
    }

    if repaired > 0 {
        info!("Repaired {} job-client links", repaired);
    }
    Ok(repaired)
}
