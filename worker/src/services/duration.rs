//! Visit duration estimation

use crate::types::{Client, DurationEstimates};

/// Estimated visit length in minutes for a client's home.
///
/// A positive per-client override wins outright. Otherwise the estimate is
/// the base setup time plus a weight per room; missing room counts count
/// as zero.
pub fn estimate_duration_minutes(client: &Client, estimates: &DurationEstimates) -> i32 {
    if let Some(override_minutes) = client.duration_override_minutes {
        if override_minutes > 0 {
            return override_minutes;
        }
    }

    estimates.base_minutes
        + client.bedrooms.unwrap_or(0) * estimates.per_bedroom
        + client.bathrooms.unwrap_or(0) * estimates.per_bathroom
        + client.living_areas.unwrap_or(0) * estimates.per_living_area
        + client.kitchens.unwrap_or(0) * estimates.per_kitchen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CreateClientRequest;

    fn client_with_rooms(
        bedrooms: Option<i32>,
        bathrooms: Option<i32>,
        living_areas: Option<i32>,
        kitchens: Option<i32>,
    ) -> Client {
        Client::from_request(CreateClientRequest {
            name: "Rooms".to_string(),
            email: None,
            phone: None,
            address: None,
            suburb: None,
            lat: None,
            lng: None,
            bedrooms,
            bathrooms,
            living_areas,
            kitchens,
            frequency: None,
            preferred_day: None,
            preferred_time: None,
            duration_override_minutes: None,
            access_notes: None,
            special_instructions: None,
            status: None,
            is_demo: None,
        })
    }

    #[test]
    fn test_estimate_sums_room_weights() {
        let client = client_with_rooms(Some(3), Some(2), Some(1), Some(1));
        let estimates = DurationEstimates::default();

        // 30 + 3*20 + 2*25 + 1*15 + 1*20
        assert_eq!(estimate_duration_minutes(&client, &estimates), 175);
    }

    #[test]
    fn test_missing_room_counts_count_as_zero() {
        let client = client_with_rooms(None, None, None, None);
        let estimates = DurationEstimates::default();
        assert_eq!(
            estimate_duration_minutes(&client, &estimates),
            estimates.base_minutes
        );
    }

    #[test]
    fn test_positive_override_wins() {
        let mut client = client_with_rooms(Some(4), Some(3), Some(2), Some(1));
        client.duration_override_minutes = Some(45);
        let estimates = DurationEstimates::default();
        assert_eq!(estimate_duration_minutes(&client, &estimates), 45);
    }

    #[test]
    fn test_non_positive_override_is_ignored() {
        let mut client = client_with_rooms(Some(1), None, None, None);
        client.duration_override_minutes = Some(0);
        let estimates = DurationEstimates::default();
        assert_eq!(estimate_duration_minutes(&client, &estimates), 50);

        client.duration_override_minutes = Some(-30);
        assert_eq!(estimate_duration_minutes(&client, &estimates), 50);
    }

    #[test]
    fn test_more_rooms_never_shortens_the_visit() {
        let estimates = DurationEstimates::default();
        let small = client_with_rooms(Some(1), Some(1), None, None);
        let large = client_with_rooms(Some(5), Some(3), Some(2), Some(2));
        assert!(
            estimate_duration_minutes(&large, &estimates)
                > estimate_duration_minutes(&small, &estimates)
        );
    }
}
