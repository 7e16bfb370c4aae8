//! Client types

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Client lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Paused,
    Cancelled,
}

impl ClientStatus {
    /// Normalize a free-form status string. All status strings entering the
    /// system go through here; unrecognized values fall back to active.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "paused" | "on hold" => ClientStatus::Paused,
            "cancelled" | "canceled" => ClientStatus::Cancelled,
            _ => ClientStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Paused => "paused",
            ClientStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Active
    }
}

/// Service frequency enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "service_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
}

impl Frequency {
    /// Normalize a free-form frequency string. Unrecognized values fall back
    /// to fortnightly, the most common plan.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Fortnightly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Fortnightly
    }
}

/// Preferred time of day for a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "preferred_time", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PreferredTime {
    Morning,
    Afternoon,
    Midday,
    Anytime,
}

impl PreferredTime {
    /// Normalize a free-form time-of-day string.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => PreferredTime::Morning,
            "afternoon" | "arvo" | "pm" => PreferredTime::Afternoon,
            "midday" | "noon" => PreferredTime::Midday,
            _ => PreferredTime::Anytime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredTime::Morning => "morning",
            PreferredTime::Afternoon => "afternoon",
            PreferredTime::Midday => "midday",
            PreferredTime::Anytime => "anytime",
        }
    }

    /// Default visit start (minutes from midnight) for a job that has no
    /// explicit start time yet.
    pub fn default_start_minutes(&self) -> i32 {
        match self {
            PreferredTime::Morning => 8 * 60,
            PreferredTime::Afternoon => 13 * 60,
            PreferredTime::Midday => 11 * 60,
            PreferredTime::Anytime => 8 * 60,
        }
    }
}

impl Default for PreferredTime {
    fn default() -> Self {
        PreferredTime::Anytime
    }
}

/// Parse a weekday name ("monday", "Tue", ...). Unrecognized input maps to
/// Monday so a typo in client data never stalls schedule generation.
pub fn parse_weekday(s: &str) -> Weekday {
    match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => Weekday::Mon,
    }
}

/// Lowercase weekday name, matching area-schedule keys.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Client entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    // Address
    pub address: Option<String>,
    pub suburb: Option<String>,

    // Coordinates, when known
    pub lat: Option<f64>,
    pub lng: Option<f64>,

    // Room counts used for duration estimation
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_areas: Option<i32>,
    pub kitchens: Option<i32>,

    pub frequency: Frequency,
    pub preferred_day: Option<String>,
    pub preferred_time: PreferredTime,
    pub duration_override_minutes: Option<i32>,

    pub access_notes: Option<String>,
    pub special_instructions: Option<String>,

    pub status: ClientStatus,
    pub is_demo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Build a new client from a create request, normalizing the stringly
    /// enum fields in one place.
    pub fn from_request(req: CreateClientRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone,
            address: req.address,
            suburb: req.suburb,
            lat: req.lat,
            lng: req.lng,
            bedrooms: req.bedrooms,
            bathrooms: req.bathrooms,
            living_areas: req.living_areas,
            kitchens: req.kitchens,
            frequency: req.frequency.as_deref().map(Frequency::parse).unwrap_or_default(),
            preferred_day: req.preferred_day,
            preferred_time: req
                .preferred_time
                .as_deref()
                .map(PreferredTime::parse)
                .unwrap_or_default(),
            duration_override_minutes: req.duration_override_minutes,
            access_notes: req.access_notes,
            special_instructions: req.special_instructions,
            status: req.status.as_deref().map(ClientStatus::parse).unwrap_or_default(),
            is_demo: req.is_demo.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update request. Absent fields keep their current value.
    pub fn apply_update(&mut self, req: &UpdateClientRequest) {
        if let Some(name) = &req.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &req.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &req.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(address) = &req.address {
            self.address = Some(address.clone());
        }
        if let Some(suburb) = &req.suburb {
            self.suburb = Some(suburb.clone());
        }
        if let Some(lat) = req.lat {
            self.lat = Some(lat);
        }
        if let Some(lng) = req.lng {
            self.lng = Some(lng);
        }
        if let Some(bedrooms) = req.bedrooms {
            self.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = req.bathrooms {
            self.bathrooms = Some(bathrooms);
        }
        if let Some(living_areas) = req.living_areas {
            self.living_areas = Some(living_areas);
        }
        if let Some(kitchens) = req.kitchens {
            self.kitchens = Some(kitchens);
        }
        if let Some(frequency) = &req.frequency {
            self.frequency = Frequency::parse(frequency);
        }
        if let Some(preferred_day) = &req.preferred_day {
            self.preferred_day = Some(preferred_day.clone());
        }
        if let Some(preferred_time) = &req.preferred_time {
            self.preferred_time = PreferredTime::parse(preferred_time);
        }
        if let Some(minutes) = req.duration_override_minutes {
            self.duration_override_minutes = Some(minutes);
        }
        if let Some(access_notes) = &req.access_notes {
            self.access_notes = Some(access_notes.clone());
        }
        if let Some(special_instructions) = &req.special_instructions {
            self.special_instructions = Some(special_instructions.clone());
        }
        if let Some(status) = &req.status {
            self.status = ClientStatus::parse(status);
        }
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == ClientStatus::Active
    }

    /// Weekday named on the client record, Monday when missing or garbled.
    pub fn preferred_weekday(&self) -> Weekday {
        self.preferred_day
            .as_deref()
            .map(parse_weekday)
            .unwrap_or(Weekday::Mon)
    }

    /// Coordinates stored on the record, if both components are present.
    pub fn explicit_coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

/// Request to create a client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub suburb: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_areas: Option<i32>,
    pub kitchens: Option<i32>,
    pub frequency: Option<String>,
    pub preferred_day: Option<String>,
    pub preferred_time: Option<String>,
    pub duration_override_minutes: Option<i32>,
    pub access_notes: Option<String>,
    pub special_instructions: Option<String>,
    pub status: Option<String>,
    pub is_demo: Option<bool>,
}

/// Request to update a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub suburb: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_areas: Option<i32>,
    pub kitchens: Option<i32>,
    pub frequency: Option<String>,
    pub preferred_day: Option<String>,
    pub preferred_time: Option<String>,
    pub duration_override_minutes: Option<i32>,
    pub access_notes: Option<String>,
    pub special_instructions: Option<String>,
    pub status: Option<String>,
}

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str) -> CreateClientRequest {
        CreateClientRequest {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            suburb: None,
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
        }
    }

    #[test]
    fn test_frequency_parse_normalizes_case_and_whitespace() {
        assert_eq!(Frequency::parse("Weekly"), Frequency::Weekly);
        assert_eq!(Frequency::parse("  MONTHLY "), Frequency::Monthly);
        assert_eq!(Frequency::parse("fortnightly"), Frequency::Fortnightly);
    }

    #[test]
    fn test_frequency_parse_unknown_falls_back_to_fortnightly() {
        assert_eq!(Frequency::parse("every other tuesday"), Frequency::Fortnightly);
        assert_eq!(Frequency::parse(""), Frequency::Fortnightly);
    }

    #[test]
    fn test_preferred_time_parse_accepts_noon_for_midday() {
        assert_eq!(PreferredTime::parse("noon"), PreferredTime::Midday);
        assert_eq!(PreferredTime::parse("Midday"), PreferredTime::Midday);
    }

    #[test]
    fn test_preferred_time_parse_unknown_falls_back_to_anytime() {
        assert_eq!(PreferredTime::parse("whenever suits"), PreferredTime::Anytime);
    }

    #[test]
    fn test_preferred_time_default_start_minutes() {
        assert_eq!(PreferredTime::Morning.default_start_minutes(), 480);
        assert_eq!(PreferredTime::Midday.default_start_minutes(), 660);
        assert_eq!(PreferredTime::Afternoon.default_start_minutes(), 780);
        assert_eq!(PreferredTime::Anytime.default_start_minutes(), 480);
    }

    #[test]
    fn test_parse_weekday_names_and_abbreviations() {
        assert_eq!(parse_weekday("Wednesday"), Weekday::Wed);
        assert_eq!(parse_weekday("fri"), Weekday::Fri);
        assert_eq!(parse_weekday(" SATURDAY "), Weekday::Sat);
    }

    #[test]
    fn test_parse_weekday_unknown_defaults_to_monday() {
        assert_eq!(parse_weekday("someday"), Weekday::Mon);
        assert_eq!(parse_weekday(""), Weekday::Mon);
    }

    #[test]
    fn test_from_request_normalizes_enums() {
        let mut req = create_request("Sarah Mitchell");
        req.frequency = Some("WEEKLY".to_string());
        req.preferred_time = Some("noon".to_string());
        req.status = Some("on hold".to_string());

        let client = Client::from_request(req);
        assert_eq!(client.frequency, Frequency::Weekly);
        assert_eq!(client.preferred_time, PreferredTime::Midday);
        assert_eq!(client.status, ClientStatus::Paused);
        assert!(!client.is_demo);
    }

    #[test]
    fn test_apply_update_keeps_absent_fields() {
        let mut req = create_request("Tom Ellis");
        req.suburb = Some("Buderim".to_string());
        req.bedrooms = Some(3);
        let mut client = Client::from_request(req);

        let update = UpdateClientRequest {
            id: client.id,
            name: None,
            email: None,
            phone: None,
            address: None,
            suburb: None,
            lat: None,
            lng: None,
            bedrooms: Some(4),
            bathrooms: None,
            living_areas: None,
            kitchens: None,
            frequency: Some("monthly".to_string()),
            preferred_day: None,
            preferred_time: None,
            duration_override_minutes: None,
            access_notes: None,
            special_instructions: None,
            status: None,
        };
        client.apply_update(&update);

        assert_eq!(client.name, "Tom Ellis");
        assert_eq!(client.suburb.as_deref(), Some("Buderim"));
        assert_eq!(client.bedrooms, Some(4));
        assert_eq!(client.frequency, Frequency::Monthly);
        assert_eq!(client.status, ClientStatus::Active);
    }

    #[test]
    fn test_client_serializes_to_camel_case() {
        let client = Client::from_request(create_request("Jess Hartley"));
        let json = serde_json::to_value(&client).unwrap();
        assert!(json.get("preferredTime").is_some());
        assert!(json.get("isDemo").is_some());
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_explicit_coordinates_requires_both_components() {
        let mut client = Client::from_request(create_request("Nina Brooks"));
        assert!(client.explicit_coordinates().is_none());
        client.lat = Some(-26.68);
        assert!(client.explicit_coordinates().is_none());
        client.lng = Some(153.05);
        let coords = client.explicit_coordinates().unwrap();
        assert_eq!(coords.lat, -26.68);
    }
}
