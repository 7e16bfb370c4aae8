//! Distance-matrix API client
//!
//! Speaks the Google Distance Matrix JSON protocol:
//! https://developers.google.com/maps/documentation/distance-matrix

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{DirectionsProvider, ProviderLeg};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Distance-matrix client configuration
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Endpoint URL
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl MatrixConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout_seconds: 10,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(api_key)
        }
    }
}

/// Distance-matrix API client
pub struct MatrixClient {
    client: Client,
    config: MatrixConfig,
}

impl MatrixClient {
    pub fn new(config: MatrixConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Build the request URL for a single origin/destination pair.
    fn build_request_url(&self, origin: &str, destination: &str) -> String {
        format!(
            "{}?origins={}&destinations={}&mode=driving&units=metric&key={}",
            self.config.base_url,
            urlencoding::encode(origin),
            urlencoding::encode(destination),
            urlencoding::encode(&self.config.api_key),
        )
    }
}

#[async_trait]
impl DirectionsProvider for MatrixClient {
    async fn leg(&self, origin: &str, destination: &str) -> Result<ProviderLeg> {
        let url = self.build_request_url(origin, destination);

        debug!("Requesting travel leg {} -> {}", origin, destination);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to distance-matrix API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Distance-matrix API returned error {}: {}", status, body);
        }

        let matrix: MatrixResponse = response
            .json()
            .await
            .context("Failed to parse distance-matrix response")?;

        if matrix.status != "OK" {
            anyhow::bail!("Distance-matrix API rejected the request: {}", matrix.status);
        }

        let element = matrix
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .context("Distance-matrix response contained no elements")?;

        if element.status != "OK" {
            anyhow::bail!(
                "No route between {} and {}: {}",
                origin,
                destination,
                element.status
            );
        }

        let distance = element
            .distance
            .as_ref()
            .context("Distance-matrix element missing distance")?;
        let duration = element
            .duration
            .as_ref()
            .context("Distance-matrix element missing duration")?;

        Ok(ProviderLeg {
            distance_meters: distance.value,
            duration_seconds: duration.value,
            distance_text: distance.text.clone(),
            duration_text: duration.text.clone(),
        })
    }

    fn name(&self) -> &str {
        "DistanceMatrix"
    }
}

// Distance-matrix API types

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MatrixConfig::new("secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn test_build_request_url_encodes_parameters() {
        let client = MatrixClient::new(MatrixConfig::with_base_url("http://localhost/dm", "k&y"));
        let url = client.build_request_url("12 Beach Rd, Mooloolaba", "Buderim");

        assert!(url.starts_with("http://localhost/dm?"));
        assert!(url.contains("origins=12%20Beach%20Rd%2C%20Mooloolaba"));
        assert!(url.contains("destinations=Buderim"));
        assert!(url.contains("mode=driving"));
        assert!(url.contains("units=metric"));
        assert!(url.contains("key=k%26y"));
    }

    #[test]
    fn test_parse_successful_response() {
        let body = r#"{
            "status": "OK",
            "origin_addresses": ["Mooloolaba QLD, Australia"],
            "destination_addresses": ["Buderim QLD 4556, Australia"],
            "rows": [{
                "elements": [{
                    "status": "OK",
                    "distance": { "text": "8.1 km", "value": 8095 },
                    "duration": { "text": "14 mins", "value": 841 }
                }]
            }]
        }"#;

        let parsed: MatrixResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "OK");
        let element = &parsed.rows[0].elements[0];
        assert_eq!(element.status, "OK");
        assert_eq!(element.distance.as_ref().unwrap().value, 8095);
        assert_eq!(element.duration.as_ref().unwrap().text, "14 mins");
    }

    #[test]
    fn test_parse_unroutable_element() {
        let body = r#"{
            "status": "OK",
            "rows": [{ "elements": [{ "status": "ZERO_RESULTS" }] }]
        }"#;

        let parsed: MatrixResponse = serde_json::from_str(body).unwrap();
        let element = &parsed.rows[0].elements[0];
        assert_eq!(element.status, "ZERO_RESULTS");
        assert!(element.distance.is_none());
    }

    #[tokio::test]
    #[ignore = "Requires a real distance-matrix API key in DIRECTIONS_API_KEY"]
    async fn test_real_api_leg() {
        let key = std::env::var("DIRECTIONS_API_KEY").expect("DIRECTIONS_API_KEY not set");
        let client = MatrixClient::new(MatrixConfig::new(key));

        let leg = client
            .leg("Mooloolaba QLD", "Buderim QLD")
            .await
            .expect("API call failed");

        assert!(leg.distance_meters > 1_000);
        assert!(leg.duration_seconds > 60);
    }
}
