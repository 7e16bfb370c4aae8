//! Day route types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a travel leg was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateMethod {
    /// Resolved by the external distance-matrix provider
    Provider,
    /// Deterministic haversine-based approximation
    Estimate,
}

impl EstimateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateMethod::Provider => "provider",
            EstimateMethod::Estimate => "estimate",
        }
    }
}

/// A single travel measurement between two places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_minutes: i32,
    pub distance_text: String,
    pub duration_text: String,
    pub method: EstimateMethod,
}

/// One visit on a composed day route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub job_id: Uuid,
    pub label: String,
    pub suburb: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Travel leg between two consecutive visits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from_job_id: Uuid,
    pub to_job_id: Uuid,
    pub from_label: String,
    pub to_label: String,
    #[serde(flatten)]
    pub travel: TravelEstimate,
}

/// Composed route for one day, optionally narrowed to one team
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRoute {
    pub date: NaiveDate,
    pub team_id: Option<String>,
    pub stops: Vec<RouteStop>,
    pub legs: Vec<RouteLeg>,
    pub total_distance_km: f64,
    pub total_travel_minutes: i32,
}

/// Request for a day route summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummaryRequest {
    pub date: NaiveDate,
    pub team_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_leg_flattens_travel_fields() {
        let leg = RouteLeg {
            from_job_id: Uuid::nil(),
            to_job_id: Uuid::nil(),
            from_label: "Buderim".to_string(),
            to_label: "Mooloolaba".to_string(),
            travel: TravelEstimate {
                distance_km: 8.1,
                duration_minutes: 12,
                distance_text: "8.1 km".to_string(),
                duration_text: "12 min".to_string(),
                method: EstimateMethod::Estimate,
            },
        };
        let json = serde_json::to_value(&leg).unwrap();
        assert_eq!(json["distanceKm"], 8.1);
        assert_eq!(json["method"], "estimate");
        assert_eq!(json["fromLabel"], "Buderim");
    }

    #[test]
    fn test_summary_request_parses_without_team() {
        let req: RouteSummaryRequest =
            serde_json::from_str(r#"{"date":"2024-03-05"}"#).unwrap();
        assert_eq!(req.team_id, None);
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }
}
