//! Distance-matrix provider for travel legs between visits
//!
//! Used when a provider API key is configured; otherwise every leg falls
//! back to the offline estimate in the travel service.

mod matrix;

pub use matrix::{MatrixClient, MatrixConfig};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// One resolved driving leg between two places
#[derive(Debug, Clone)]
pub struct ProviderLeg {
    /// Distance in meters
    pub distance_meters: u64,
    /// Duration in seconds
    pub duration_seconds: u64,
    /// Human-readable distance ("8.1 km")
    pub distance_text: String,
    /// Human-readable duration ("12 mins")
    pub duration_text: String,
}

/// Directions provider trait for abstraction (distance-matrix API, mock)
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Resolve the driving leg between two human-readable places
    /// (street addresses or suburb names).
    async fn leg(&self, origin: &str, destination: &str) -> Result<ProviderLeg>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Create the directions provider from configuration.
///
/// Returns `None` when no API key is set; travel estimation then runs
/// fully offline.
pub fn create_directions_provider(
    base_url: Option<String>,
    api_key: Option<String>,
) -> Option<Arc<dyn DirectionsProvider>> {
    match api_key {
        Some(key) if !key.trim().is_empty() => {
            let config = match base_url {
                Some(url) => MatrixConfig::with_base_url(url, key),
                None => MatrixConfig::new(key),
            };
            info!("Distance-matrix provider configured at {}", config.base_url);
            Some(Arc::new(MatrixClient::new(config)))
        }
        _ => {
            info!("No distance-matrix API key configured, travel legs will use offline estimates");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_without_key_is_none() {
        assert!(create_directions_provider(None, None).is_none());
        assert!(create_directions_provider(None, Some("  ".to_string())).is_none());
    }

    #[test]
    fn test_create_provider_with_key() {
        let provider = create_directions_provider(None, Some("test-key".to_string())).unwrap();
        assert_eq!(provider.name(), "DistanceMatrix");
    }

    #[test]
    fn test_create_provider_honors_custom_base_url() {
        let provider = create_directions_provider(
            Some("http://localhost:8111/matrix".to_string()),
            Some("test-key".to_string()),
        );
        assert!(provider.is_some());
    }
}
