//! Geographic calculations and the serviced-suburb table

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{Client, Coordinates};

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance coefficient (straight line to road)
const ROAD_COEFFICIENT: f64 = 1.3;

/// Average speed in km/h for travel time estimation
const AVERAGE_SPEED_KMH: f64 = 40.0;

/// Fallback point when nothing about a location is known (Maroochydore CBD)
pub const CITY_CENTRE: Coordinates = Coordinates {
    lat: -26.6564,
    lng: 153.0910,
};

/// Centroids for the suburbs we service. Keys are lowercase.
static SUBURB_CENTROIDS: Lazy<HashMap<&'static str, Coordinates>> = Lazy::new(|| {
    HashMap::from([
        ("buderim", Coordinates { lat: -26.6844, lng: 153.0570 }),
        ("mooloolaba", Coordinates { lat: -26.6817, lng: 153.1192 }),
        ("maroochydore", Coordinates { lat: -26.6564, lng: 153.0910 }),
        ("alexandra headland", Coordinates { lat: -26.6720, lng: 153.1046 }),
        ("mountain creek", Coordinates { lat: -26.6989, lng: 153.1049 }),
        ("sippy downs", Coordinates { lat: -26.7183, lng: 153.0582 }),
        ("kawana waters", Coordinates { lat: -26.7191, lng: 153.1204 }),
        ("caloundra", Coordinates { lat: -26.8035, lng: 153.1219 }),
        ("currimundi", Coordinates { lat: -26.7642, lng: 153.1233 }),
        ("noosa heads", Coordinates { lat: -26.3945, lng: 153.0901 }),
        ("noosaville", Coordinates { lat: -26.3990, lng: 153.0620 }),
        ("coolum beach", Coordinates { lat: -26.5280, lng: 153.0900 }),
        ("peregian beach", Coordinates { lat: -26.4820, lng: 153.0950 }),
        ("bli bli", Coordinates { lat: -26.6180, lng: 153.0360 }),
        ("nambour", Coordinates { lat: -26.6260, lng: 152.9590 }),
        ("woombye", Coordinates { lat: -26.6594, lng: 152.9702 }),
        ("palmwoods", Coordinates { lat: -26.6855, lng: 152.9618 }),
    ])
});

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate road distance from straight-line distance
pub fn road_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from, to) * ROAD_COEFFICIENT
}

/// Estimate travel time in minutes
pub fn travel_time_minutes(from: &Coordinates, to: &Coordinates) -> f64 {
    let distance = road_distance(from, to);
    (distance / AVERAGE_SPEED_KMH) * 60.0
}

/// True when the suburb is in the serviced table
pub fn known_suburb(suburb: &str) -> bool {
    SUBURB_CENTROIDS.contains_key(suburb.trim().to_lowercase().as_str())
}

/// Centroid for a serviced suburb, city centre when unknown
pub fn suburb_coordinates(suburb: &str) -> Coordinates {
    SUBURB_CENTROIDS
        .get(suburb.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(CITY_CENTRE)
}

/// Best coordinates for a client: explicit lat/lng first, then the suburb
/// centroid, then the city centre.
pub fn client_coordinates(client: &Client) -> Coordinates {
    if let Some(coords) = client.explicit_coordinates() {
        return coords;
    }
    match client.suburb.as_deref() {
        Some(suburb) => suburb_coordinates(suburb),
        None => CITY_CENTRE,
    }
}
