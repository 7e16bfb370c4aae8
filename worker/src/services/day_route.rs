//! Day route composition
//!
//! Walks a day's visits in start-time order and accumulates leg-by-leg
//! travel. Purely informational; nothing here feeds back into packing.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::services::travel::{TravelEstimator, TravelPoint};
use crate::types::{Client, DayRoute, RouteLeg, RouteStop, ScheduledJob};

/// Compose the travel route over the given jobs.
///
/// Breaks are dropped and the rest ordered by start time, unscheduled
/// visits last. Each stop resolves through its client record when it
/// still exists, otherwise through the job's own snapshot. Fewer than
/// two stops yields no legs and zero totals.
pub async fn compose_day_route(
    estimator: &TravelEstimator,
    date: NaiveDate,
    team_id: Option<String>,
    jobs: &[ScheduledJob],
    clients: &[Client],
) -> DayRoute {
    let by_id: HashMap<Uuid, &Client> = clients.iter().map(|c| (c.id, c)).collect();

    let mut ordered: Vec<&ScheduledJob> = jobs.iter().filter(|j| !j.is_break).collect();
    ordered.sort_by_key(|j| {
        (
            j.start_time.is_none(),
            j.start_time.unwrap_or(NaiveTime::MIN),
            j.id,
        )
    });

    let mut stops = Vec::with_capacity(ordered.len());
    let mut points = Vec::with_capacity(ordered.len());
    for job in &ordered {
        let point = job
            .parsed_client_id()
            .and_then(|id| by_id.get(&id))
            .map(|client| TravelPoint::for_client(client))
            .unwrap_or_else(|| TravelPoint::for_job(job));

        stops.push(RouteStop {
            job_id: job.id,
            label: point.label.clone(),
            suburb: job.suburb.clone(),
            start_time: job.start_time,
            end_time: job.end_time,
        });
        points.push(point);
    }

    let mut legs = Vec::new();
    let mut total_distance_km = 0.0;
    let mut total_travel_minutes = 0;

    for i in 1..points.len() {
        let travel = estimator.between(&points[i - 1], &points[i]).await;
        total_distance_km += travel.distance_km;
        total_travel_minutes += travel.duration_minutes;
        legs.push(RouteLeg {
            from_job_id: ordered[i - 1].id,
            to_job_id: ordered[i].id,
            from_label: points[i - 1].label.clone(),
            to_label: points[i].label.clone(),
            travel,
        });
    }

    DayRoute {
        date,
        team_id,
        stops,
        legs,
        total_distance_km,
        total_travel_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreateClientRequest, EstimateMethod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client_in(name: &str, suburb: &str) -> Client {
        Client::from_request(CreateClientRequest {
            name: name.to_string(),
            suburb: Some(suburb.to_string()),
            ..Default::default()
        })
    }

    fn job_for(client: &Client, on: NaiveDate, start_minutes: i32) -> ScheduledJob {
        ScheduledJob::for_client(client, on, start_minutes, 60)
    }

    #[tokio::test]
    async fn composes_legs_in_start_time_order() {
        let estimator = TravelEstimator::offline();
        let day = date(2024, 3, 4);
        let a = client_in("First", "Buderim");
        let b = client_in("Second", "Mooloolaba");
        let c = client_in("Third", "Maroochydore");

        // Deliberately shuffled input.
        let jobs = vec![
            job_for(&c, day, 780),
            job_for(&a, day, 480),
            job_for(&b, day, 600),
        ];
        let clients = vec![a.clone(), b.clone(), c.clone()];

        let route = compose_day_route(&estimator, day, None, &jobs, &clients).await;

        assert_eq!(route.stops.len(), 3);
        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.stops[0].label, "Buderim");
        assert_eq!(route.stops[1].label, "Mooloolaba");
        assert_eq!(route.stops[2].label, "Maroochydore");
        assert_eq!(route.legs[0].from_label, "Buderim");
        assert_eq!(route.legs[0].to_label, "Mooloolaba");

        let leg_distance: f64 = route.legs.iter().map(|l| l.travel.distance_km).sum();
        let leg_minutes: i32 = route.legs.iter().map(|l| l.travel.duration_minutes).sum();
        assert!((route.total_distance_km - leg_distance).abs() < 1e-9);
        assert_eq!(route.total_travel_minutes, leg_minutes);
        assert!(route.total_distance_km > 0.0);
        assert!(route
            .legs
            .iter()
            .all(|l| l.travel.method == EstimateMethod::Estimate));
    }

    #[tokio::test]
    async fn fewer_than_two_stops_yields_zero_totals() {
        let estimator = TravelEstimator::offline();
        let day = date(2024, 3, 4);
        let a = client_in("Only", "Buderim");
        let jobs = vec![job_for(&a, day, 480)];

        let route = compose_day_route(&estimator, day, None, &jobs, &[a]).await;
        assert_eq!(route.stops.len(), 1);
        assert!(route.legs.is_empty());
        assert_eq!(route.total_distance_km, 0.0);
        assert_eq!(route.total_travel_minutes, 0);

        let empty = compose_day_route(&estimator, day, None, &[], &[]).await;
        assert!(empty.stops.is_empty());
        assert!(empty.legs.is_empty());
    }

    #[tokio::test]
    async fn breaks_are_left_out_of_the_route() {
        let estimator = TravelEstimator::offline();
        let day = date(2024, 3, 4);
        let a = client_in("First", "Buderim");
        let b = client_in("Second", "Mooloolaba");

        let jobs = vec![
            job_for(&a, day, 480),
            ScheduledJob::break_for(day, "team-1", 660, 30),
            job_for(&b, day, 780),
        ];
        let clients = vec![a, b];

        let route = compose_day_route(&estimator, day, Some("team-1".to_string()), &jobs, &clients).await;
        assert_eq!(route.stops.len(), 2);
        assert_eq!(route.legs.len(), 1);
        assert_eq!(route.team_id.as_deref(), Some("team-1"));
    }

    #[tokio::test]
    async fn stop_without_a_client_uses_the_job_snapshot() {
        let estimator = TravelEstimator::offline();
        let day = date(2024, 3, 4);
        let gone = client_in("Gone", "Mooloolaba");
        let still = client_in("Still Here", "Buderim");

        let jobs = vec![job_for(&still, day, 480), job_for(&gone, day, 600)];
        // Only one of the two clients still exists.
        let clients = vec![still];

        let route = compose_day_route(&estimator, day, None, &jobs, &clients).await;
        assert_eq!(route.stops.len(), 2);
        assert_eq!(route.stops[1].label, "Mooloolaba");
        assert!(route.total_distance_km > 0.0);
    }

    #[tokio::test]
    async fn unscheduled_visits_sort_last() {
        let estimator = TravelEstimator::offline();
        let day = date(2024, 3, 4);
        let a = client_in("Timed", "Buderim");
        let b = client_in("Loose", "Mooloolaba");

        let mut loose = job_for(&b, day, 480);
        loose.start_time = None;
        loose.end_time = None;
        let jobs = vec![loose, job_for(&a, day, 540)];
        let clients = vec![a, b];

        let route = compose_day_route(&estimator, day, None, &jobs, &clients).await;
        assert_eq!(route.stops[0].label, "Buderim");
        assert_eq!(route.stops[1].label, "Mooloolaba");
        assert!(route.stops[1].start_time.is_none());
    }
}
