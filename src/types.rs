use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend user identifier (`_id` on the wire, opaque here).
///
/// Immutable, unique per account. The only link a booking record keeps to
/// the user who made it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Backend booking identifier (`_id` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct BookingId(pub String);

/// Flight offer identifier. Scoped to one search response; not stable
/// across searches, so never persisted as anything but a working copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct FlightId(pub String);

/// The signed-in user, as returned by the auth endpoints.
///
/// Wire field names are the backend's French ones; this is also the exact
/// shape persisted under the `user` storage key, so restore can parse what
/// login wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    pub email: String,
}

/// A flight offer from search results or the popular-destinations rail.
///
/// Only the fields the core reads are typed. Everything else the backend
/// sends (return-leg times, stops, fare class, ...) lands in `extra`, so a
/// cached offer re-hydrates into the booking flow without losing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    /// Absent on some popular-destination cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FlightId>,
    pub airline: String,
    /// Departure IATA code.
    pub departure: String,
    /// Arrival IATA code.
    pub arrival: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date_time: Option<String>,
    /// ISO 8601 duration, e.g. `PT2H35M`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub price: f64,
    pub currency: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A booking record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: BookingId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub departure: String,
    pub arrival: String,
    /// `None` for guest bookings.
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<time::OffsetDateTime>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One-way or round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Oneway,
    Roundtrip,
}

/// Query for `GET /api/flights`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Departure IATA code.
    pub departure: String,
    /// Arrival IATA code.
    pub arrival: String,
    /// Outbound date, `YYYY-MM-DD`.
    pub date: String,
    pub passengers: u32,
    pub trip_type: TripType,
    /// Required when `trip_type` is [`TripType::Roundtrip`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}
