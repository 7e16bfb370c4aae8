//! Travel estimation between consecutive stops
//!
//! Asks the distance-matrix provider when one is configured and falls back
//! to the deterministic offline estimate, so route composition always
//! produces a result.

use std::sync::Arc;

use tracing::warn;

use crate::services::directions::DirectionsProvider;
use crate::services::geo;
use crate::types::{Client, Coordinates, EstimateMethod, ScheduledJob, TravelEstimate};

/// A place a leg can start or end at: a human-readable label for the
/// provider plus coordinates for the offline estimate.
#[derive(Debug, Clone)]
pub struct TravelPoint {
    pub label: String,
    pub coordinates: Coordinates,
}

impl TravelPoint {
    pub fn new(label: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            label: label.into(),
            coordinates,
        }
    }

    /// Point for a client: street address when present, suburb otherwise.
    pub fn for_client(client: &Client) -> Self {
        let label = client
            .address
            .clone()
            .or_else(|| client.suburb.clone())
            .unwrap_or_else(|| "Maroochydore".to_string());
        Self {
            label,
            coordinates: geo::client_coordinates(client),
        }
    }

    /// Point from a job's denormalized fields, for stops whose client
    /// record is gone.
    pub fn for_job(job: &ScheduledJob) -> Self {
        let label = job
            .address
            .clone()
            .or_else(|| job.suburb.clone())
            .unwrap_or_else(|| "Maroochydore".to_string());
        let coordinates = job
            .suburb
            .as_deref()
            .map(geo::suburb_coordinates)
            .unwrap_or(geo::CITY_CENTRE);
        Self { label, coordinates }
    }
}

/// Travel resolver shared by the route handlers.
pub struct TravelEstimator {
    provider: Option<Arc<dyn DirectionsProvider>>,
}

impl TravelEstimator {
    pub fn new(provider: Option<Arc<dyn DirectionsProvider>>) -> Self {
        Self { provider }
    }

    /// Estimator with no provider; every leg uses the offline estimate.
    pub fn offline() -> Self {
        Self { provider: None }
    }

    /// Resolve one leg. Provider failures degrade to the offline estimate
    /// and are never propagated.
    pub async fn between(&self, from: &TravelPoint, to: &TravelPoint) -> TravelEstimate {
        if let Some(provider) = &self.provider {
            match provider.leg(&from.label, &to.label).await {
                Ok(leg) => {
                    return TravelEstimate {
                        distance_km: leg.distance_meters as f64 / 1000.0,
                        duration_minutes: (leg.duration_seconds as f64 / 60.0).round() as i32,
                        distance_text: leg.distance_text,
                        duration_text: leg.duration_text,
                        method: EstimateMethod::Provider,
                    };
                }
                Err(e) => {
                    warn!(
                        "Directions provider failed for {} -> {}: {}, using offline estimate",
                        from.label, to.label, e
                    );
                }
            }
        }
        offline_estimate(from, to)
    }
}

/// Deterministic offline estimate: haversine distance scaled by the road
/// coefficient, timed at the fixed average speed.
pub fn offline_estimate(from: &TravelPoint, to: &TravelPoint) -> TravelEstimate {
    let distance_km = geo::road_distance(&from.coordinates, &to.coordinates);
    let duration_minutes = geo::travel_time_minutes(&from.coordinates, &to.coordinates).round() as i32;

    TravelEstimate {
        distance_km,
        duration_minutes,
        distance_text: format!("{:.1} km", distance_km),
        duration_text: format_duration_text(duration_minutes),
        method: EstimateMethod::Estimate,
    }
}

fn format_duration_text(minutes: i32) -> String {
    if minutes >= 60 {
        format!("{} hr {} min", minutes / 60, minutes % 60)
    } else {
        format!("{} min", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::directions::ProviderLeg;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedProvider;

    #[async_trait]
    impl DirectionsProvider for FixedProvider {
        async fn leg(&self, _origin: &str, _destination: &str) -> Result<ProviderLeg> {
            Ok(ProviderLeg {
                distance_meters: 9_400,
                duration_seconds: 16 * 60,
                distance_text: "9.4 km".to_string(),
                duration_text: "16 mins".to_string(),
            })
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl DirectionsProvider for FailingProvider {
        async fn leg(&self, _origin: &str, _destination: &str) -> Result<ProviderLeg> {
            anyhow::bail!("matrix unavailable")
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn buderim() -> TravelPoint {
        TravelPoint::new("Buderim", geo::suburb_coordinates("Buderim"))
    }

    fn mooloolaba() -> TravelPoint {
        TravelPoint::new("Mooloolaba", geo::suburb_coordinates("Mooloolaba"))
    }

    #[test]
    fn test_offline_estimate_is_deterministic() {
        let first = offline_estimate(&buderim(), &mooloolaba());
        let second = offline_estimate(&buderim(), &mooloolaba());
        assert_eq!(first, second);
        assert_eq!(first.method, EstimateMethod::Estimate);
    }

    #[test]
    fn test_offline_estimate_magnitude() {
        let estimate = offline_estimate(&buderim(), &mooloolaba());

        // ~6.2 km straight line, scaled by 1.3
        assert!((estimate.distance_km - 8.1).abs() < 1.0);
        // ~8 km at 40 km/h
        assert!((estimate.duration_minutes - 12).abs() <= 2);
        assert!(estimate.distance_text.ends_with(" km"));
    }

    #[test]
    fn test_duration_text_formats_hours() {
        assert_eq!(format_duration_text(12), "12 min");
        assert_eq!(format_duration_text(75), "1 hr 15 min");
    }

    #[tokio::test]
    async fn test_between_prefers_the_provider() {
        let estimator = TravelEstimator::new(Some(Arc::new(FixedProvider)));
        let leg = estimator.between(&buderim(), &mooloolaba()).await;

        assert_eq!(leg.method, EstimateMethod::Provider);
        assert_eq!(leg.distance_km, 9.4);
        assert_eq!(leg.duration_minutes, 16);
        assert_eq!(leg.duration_text, "16 mins");
    }

    #[tokio::test]
    async fn test_between_falls_back_when_provider_fails() {
        let estimator = TravelEstimator::new(Some(Arc::new(FailingProvider)));
        let leg = estimator.between(&buderim(), &mooloolaba()).await;

        assert_eq!(leg.method, EstimateMethod::Estimate);
        assert!(leg.distance_km > 0.0);
    }

    #[tokio::test]
    async fn test_offline_estimator_never_uses_a_provider() {
        let estimator = TravelEstimator::offline();
        let leg = estimator.between(&buderim(), &mooloolaba()).await;
        assert_eq!(leg.method, EstimateMethod::Estimate);
    }

    #[test]
    fn test_travel_point_for_client_label_fallbacks() {
        let mut req = crate::types::CreateClientRequest {
            name: "Label".to_string(),
            email: None,
            phone: None,
            address: Some("5 First Ave".to_string()),
            suburb: Some("Caloundra".to_string()),
            lat: None,
            lng: None,
            bedrooms: None,
            bathrooms: None,
            living_areas: None,
            kitchens: None,
            frequency: None,
            preferred_day: None,
            preferred_time: None,
            duration_override_minutes: None,
            access_notes: None,
            special_instructions: None,
            status: None,
            is_demo: None,
        };

        let with_address = Client::from_request(req.clone());
        assert_eq!(TravelPoint::for_client(&with_address).label, "5 First Ave");

        req.address = None;
        let suburb_only = Client::from_request(req.clone());
        assert_eq!(TravelPoint::for_client(&suburb_only).label, "Caloundra");
        assert_eq!(
            TravelPoint::for_client(&suburb_only).coordinates,
            geo::suburb_coordinates("Caloundra")
        );

        req.suburb = None;
        let blank = Client::from_request(req);
        assert_eq!(TravelPoint::for_client(&blank).label, "Maroochydore");
    }
}
