//! Recurring schedule reconciliation
//!
//! Converges the stored job set toward each client's recurrence target.
//! The diff is surgical: jobs on target dates are updated in place, jobs
//! off the target are deleted, and anything in progress or completed is
//! never touched. Persistence writes run one at a time so a failure
//! leaves an explainable prefix of the batch applied.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::{NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::defaults::MIN_JOB_DURATION_MINUTES;
use crate::services::duration::estimate_duration_minutes;
use crate::services::packer::{DayPlan, SlotKind};
use crate::services::recurrence::recurrence_dates;
use crate::services::relink::repair_client_links;
use crate::storage::{JobFilter, Store};
use crate::types::settings::minutes_to_time;
use crate::types::{Client, JobStatus, ScheduleSettings, ScheduledJob};

/// Convergence counts for one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub created: u32,
    pub updated: u32,
    pub removed: u32,
    /// Jobs left untouched: locked, or already matching the target.
    pub kept: u32,
}

impl ReconcileOutcome {
    fn absorb(&mut self, other: ReconcileOutcome) {
        self.created += other.created;
        self.updated += other.updated;
        self.removed += other.removed;
        self.kept += other.kept;
    }
}

/// One client that failed during a bulk pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFailure {
    pub client_id: Uuid,
    pub client_name: String,
    pub error: String,
}

/// Result of a bulk reconcile over every active client.
///
/// A failing client is skipped and reported here; the rest of the batch
/// still runs. Totals cover the clients that completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReconcileReport {
    pub clients_processed: u32,
    pub repaired_links: u32,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
    pub failures: Vec<ClientFailure>,
}

/// Result of packing one day's jobs into team capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDayOutcome {
    pub date: NaiveDate,
    pub assigned: u32,
    pub unplaced: u32,
    pub breaks_created: u32,
    pub locked: u32,
}

// ---------------------------------------------------------------------------
// Target computation
// ---------------------------------------------------------------------------

/// Weekday a client should be visited on. The area schedule wins over the
/// client's own preference when the suburb is mapped.
pub fn target_weekday(client: &Client, settings: &ScheduleSettings) -> Weekday {
    client
        .suburb
        .as_deref()
        .and_then(|suburb| settings.weekday_for_suburb(suburb))
        .unwrap_or_else(|| client.preferred_weekday())
}

/// Occurrence dates for a client over the horizon. Empty unless the client
/// is active.
pub fn target_dates(
    client: &Client,
    settings: &ScheduleSettings,
    start: NaiveDate,
    horizon_weeks: u32,
) -> Vec<NaiveDate> {
    if !client.is_active() {
        return Vec::new();
    }
    recurrence_dates(
        start,
        target_weekday(client, settings),
        client.frequency,
        horizon_weeks,
    )
}

// ---------------------------------------------------------------------------
// Per-client reconcile
// ---------------------------------------------------------------------------

/// Converge one client's stored jobs to its recurrence target.
///
/// Existing jobs dated before `start_date` are out of scope. On each date
/// the first stored job is the keeper; extra jobs on the same date are
/// surplus and removed with the off-target ones. A keeper whose times
/// already match is left unwritten, which is what makes a repeat run a
/// no-op.
pub async fn reconcile_client(
    store: &dyn Store,
    client: &Client,
    settings: &ScheduleSettings,
    start_date: NaiveDate,
    horizon_weeks: u32,
) -> Result<ReconcileOutcome> {
    let targets: BTreeSet<NaiveDate> =
        target_dates(client, settings, start_date, horizon_weeks)
            .into_iter()
            .collect();

    let existing = store
        .list_jobs(&JobFilter {
            client_id: Some(client.id),
            from_date: Some(start_date),
            ..JobFilter::default()
        })
        .await?;

    let mut keeper: BTreeMap<NaiveDate, ScheduledJob> = BTreeMap::new();
    for job in &existing {
        keeper.entry(job.date).or_insert_with(|| job.clone());
    }

    let mut outcome = ReconcileOutcome::default();

    for job in &existing {
        let keeps_a_target_date = targets.contains(&job.date)
            && keeper.get(&job.date).map(|k| k.id) == Some(job.id);
        if keeps_a_target_date {
            continue;
        }
        if job.is_locked() {
            outcome.kept += 1;
            continue;
        }
        store.delete_job(job.id).await?;
        outcome.removed += 1;
    }

    let duration =
        estimate_duration_minutes(client, &settings.duration_estimates).max(MIN_JOB_DURATION_MINUTES);

    for &date in &targets {
        match keeper.get(&date) {
            Some(job) if job.is_locked() => {
                outcome.kept += 1;
            }
            Some(job) => {
                let start = job
                    .start_minutes()
                    .unwrap_or_else(|| client.preferred_time.default_start_minutes());
                let start_time = minutes_to_time(start);
                let end_time = minutes_to_time(start + duration);

                if job.start_time == Some(start_time)
                    && job.end_time == Some(end_time)
                    && job.duration_minutes == Some(duration)
                {
                    outcome.kept += 1;
                    continue;
                }

                let mut updated = job.clone();
                updated.start_time = Some(start_time);
                updated.end_time = Some(end_time);
                updated.duration_minutes = Some(duration);
                updated.updated_at = Utc::now();
                store.update_job(&updated).await?;
                outcome.updated += 1;
            }
            None => {
                let start = client.preferred_time.default_start_minutes();
                let job = ScheduledJob::for_client(client, date, start, duration);
                store.create_job(&job).await?;
                outcome.created += 1;
            }
        }
    }

    debug!(
        "Reconciled client {} ({}): {} created, {} updated, {} removed, {} kept",
        client.name, client.id, outcome.created, outcome.updated, outcome.removed, outcome.kept
    );
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Bulk reconcile
// ---------------------------------------------------------------------------

/// Reconcile every active client, repairing job-client links first so the
/// per-client diffs see their own jobs.
pub async fn reconcile_all(
    store: &dyn Store,
    settings: &ScheduleSettings,
    start_date: NaiveDate,
    horizon_weeks: u32,
) -> Result<BulkReconcileReport> {
    let repaired_links = repair_client_links(store, start_date).await?;

    let clients = store.list_clients().await?;
    let mut report = BulkReconcileReport {
        repaired_links,
        ..BulkReconcileReport::default()
    };

    for client in clients.iter().filter(|c| c.is_active()) {
        match reconcile_client(store, client, settings, start_date, horizon_weeks).await {
            Ok(outcome) => {
                report.outcome.absorb(outcome);
                report.clients_processed += 1;
            }
            Err(e) => {
                warn!(
                    "Reconcile failed for client {} ({}): {}",
                    client.name, client.id, e
                );
                report.failures.push(ClientFailure {
                    client_id: client.id,
                    client_name: client.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Bulk reconcile: {} clients, {} links repaired, {} created, {} updated, {} removed, {} failed",
        report.clients_processed,
        report.repaired_links,
        report.outcome.created,
        report.outcome.updated,
        report.outcome.removed,
        report.failures.len()
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Day packing
// ---------------------------------------------------------------------------

/// Re-place one day's jobs into team capacity windows.
///
/// Locked jobs stay where they are and their intervals are seeded into
/// the plan, so new placements pack around them. Old break placeholders
/// are dropped and re-derived. Every unlocked scheduled job is offered to
/// each team in configured order; the first team with room takes it. A
/// job no team can fit is left exactly as it was and reported as
/// unplaced. Cancelled jobs neither consume capacity nor move.
pub async fn pack_day(
    store: &dyn Store,
    date: NaiveDate,
    settings: &ScheduleSettings,
) -> Result<PackDayOutcome> {
    let jobs = store
        .list_jobs(&JobFilter {
            on_date: Some(date),
            include_breaks: true,
            ..JobFilter::default()
        })
        .await?;

    let mut outcome = PackDayOutcome {
        date,
        assigned: 0,
        unplaced: 0,
        breaks_created: 0,
        locked: 0,
    };
    let mut plan = DayPlan::new();
    let mut to_place: Vec<ScheduledJob> = Vec::new();

    for job in jobs {
        if job.is_break {
            if job.is_locked() {
                seed_job(&mut plan, &job, SlotKind::Break);
            } else {
                store.delete_job(job.id).await?;
            }
            continue;
        }
        if job.is_locked() {
            seed_job(&mut plan, &job, SlotKind::Job);
            outcome.locked += 1;
            continue;
        }
        if job.status == JobStatus::Cancelled {
            continue;
        }
        to_place.push(job);
    }

    let team_ids = settings.team_ids();

    for job in to_place {
        let duration = job
            .duration_minutes
            .unwrap_or(settings.duration_estimates.base_minutes)
            .max(MIN_JOB_DURATION_MINUTES);

        let placement = team_ids
            .iter()
            .find_map(|team_id| {
                plan.reserve_slot(date, team_id, duration, settings)
                    .map(|slot| (team_id.clone(), slot))
            });

        let Some((team_id, slot)) = placement else {
            debug!("No capacity for job {} on {}", job.id, date);
            outcome.unplaced += 1;
            continue;
        };

        if let Some((break_start, break_end)) = slot.break_slot {
            let brk = ScheduledJob::break_for(date, &team_id, break_start, break_end - break_start);
            store.create_job(&brk).await?;
            outcome.breaks_created += 1;
        }

        let mut placed = job.clone();
        placed.start_time = Some(slot.start_time());
        placed.end_time = Some(slot.end_time());
        placed.duration_minutes = Some(duration);
        placed.assigned_teams = vec![team_id];
        placed.updated_at = Utc::now();
        store.update_job(&placed).await?;
        outcome.assigned += 1;
    }

    info!(
        "Packed {}: {} assigned, {} unplaced, {} locked, {} breaks",
        date, outcome.assigned, outcome.unplaced, outcome.locked, outcome.breaks_created
    );
    Ok(outcome)
}

/// Seed a stored job's interval into the plan for each team it occupies.
fn seed_job(plan: &mut DayPlan, job: &ScheduledJob, kind: SlotKind) {
    let (Some(start), Some(end)) = (job.start_minutes(), job.end_minutes()) else {
        return;
    };
    for team_id in &job.assigned_teams {
        plan.seed(job.date, team_id, kind, start, end);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
