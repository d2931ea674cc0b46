//! Single-slot holding area for the flight a signed-out visitor tried to
//! book, durable across the authentication interruption (which may include
//! a full page reload).

use std::sync::Arc;

use crate::storage::{keys, Storage};
use crate::types::FlightOffer;

/// Pending-intent cache plus the staged working copy the booking entry
/// point reads.
///
/// One slot, last-write-wins, consume-once. The slot is owned by the
/// session subsystem: [`SessionStore::logout`](crate::SessionStore::logout)
/// deletes it; the gate only reads and clears.
#[derive(Clone)]
pub struct IntentCache {
    storage: Arc<dyn Storage>,
}

impl IntentCache {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Caches `flight` as the pending intent, replacing any previous one.
    pub fn set_pending_flight(&self, flight: &FlightOffer) {
        match serde_json::to_string(flight) {
            Ok(raw) => self.storage.set(keys::PENDING_FLIGHT, &raw),
            Err(err) => tracing::error!(%err, "pending flight failed to serialize"),
        }
    }

    /// Takes the pending intent: the read and the delete are one unit, so a
    /// second call before any new set returns `None`. Malformed payloads
    /// count as absent (and are deleted all the same).
    pub fn take_pending_flight(&self) -> Option<FlightOffer> {
        let raw = self.storage.get(keys::PENDING_FLIGHT)?;
        self.storage.remove(keys::PENDING_FLIGHT);
        match serde_json::from_str(&raw) {
            Ok(flight) => Some(flight),
            Err(err) => {
                tracing::warn!(%err, "pending flight is corrupt, discarding");
                None
            }
        }
    }

    /// Drops the pending intent without reading it.
    pub fn clear(&self) {
        self.storage.remove(keys::PENDING_FLIGHT);
    }

    /// Stages the working copy the booking entry point consumes.
    pub fn stage_selected_flight(&self, flight: &FlightOffer) {
        match serde_json::to_string(flight) {
            Ok(raw) => {
                self.storage.set(keys::SELECTED_FLIGHT, &raw);
                let id = flight
                    .id
                    .as_ref()
                    .map_or_else(|| "unknown".to_owned(), ToString::to_string);
                self.storage.set(keys::SELECTED_FLIGHT_ID, &id);
            }
            Err(err) => tracing::error!(%err, "selected flight failed to serialize"),
        }
    }

    /// Reads the staged working copy. Non-consuming — the booking form may
    /// re-read it across reloads; logout deletes it.
    #[must_use]
    pub fn selected_flight(&self) -> Option<FlightOffer> {
        let raw = self.storage.get(keys::SELECTED_FLIGHT)?;
        match serde_json::from_str(&raw) {
            Ok(flight) => Some(flight),
            Err(err) => {
                tracing::warn!(%err, "selected flight is corrupt, discarding");
                self.storage.remove(keys::SELECTED_FLIGHT);
                self.storage.remove(keys::SELECTED_FLIGHT_ID);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn offer_with_extras() -> FlightOffer {
        serde_json::from_str(
            r#"{
                "id": "FL-42",
                "airline": "Air Senegal",
                "departure": "DSS",
                "arrival": "CDG",
                "departureDateTime": "2026-09-01T08:30:00",
                "duration": "PT5H45M",
                "price": 412.5,
                "currency": "EUR",
                "returnDuration": "PT6H05M",
                "stops": 0
            }"#,
        )
        .unwrap()
    }

    fn cache() -> (Arc<MemoryStorage>, IntentCache) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = IntentCache::new(storage.clone());
        (storage, cache)
    }

    #[test]
    fn pending_flight_round_trips_losslessly() {
        let (_, cache) = cache();
        let offer = offer_with_extras();

        cache.set_pending_flight(&offer);
        assert_eq!(cache.take_pending_flight().unwrap(), offer);
    }

    #[test]
    fn take_consumes_the_slot() {
        let (storage, cache) = cache();
        cache.set_pending_flight(&offer_with_extras());

        assert!(cache.take_pending_flight().is_some());
        assert!(cache.take_pending_flight().is_none());
        assert_eq!(storage.get(keys::PENDING_FLIGHT), None);
    }

    #[test]
    fn set_overwrites_previous_intent() {
        let (_, cache) = cache();
        let mut first = offer_with_extras();
        first.arrival = "BRU".into();
        cache.set_pending_flight(&first);

        let second = offer_with_extras();
        cache.set_pending_flight(&second);
        assert_eq!(cache.take_pending_flight().unwrap(), second);
    }

    #[test]
    fn malformed_pending_flight_counts_as_absent() {
        let (storage, cache) = cache();
        storage.set(keys::PENDING_FLIGHT, "<<not json>>");

        assert!(cache.take_pending_flight().is_none());
        // Deleted, not left to fail again next time.
        assert_eq!(storage.get(keys::PENDING_FLIGHT), None);
    }

    #[test]
    fn clear_drops_the_intent() {
        let (_, cache) = cache();
        cache.set_pending_flight(&offer_with_extras());
        cache.clear();
        assert!(cache.take_pending_flight().is_none());
    }

    #[test]
    fn staged_working_copy_is_non_consuming() {
        let (storage, cache) = cache();
        let offer = offer_with_extras();
        cache.stage_selected_flight(&offer);

        assert_eq!(cache.selected_flight().unwrap(), offer);
        assert_eq!(cache.selected_flight().unwrap(), offer);
        assert_eq!(storage.get(keys::SELECTED_FLIGHT_ID).as_deref(), Some("FL-42"));
    }

    #[test]
    fn staging_an_offer_without_id_records_unknown() {
        let (storage, cache) = cache();
        let mut offer = offer_with_extras();
        offer.id = None;
        cache.stage_selected_flight(&offer);

        assert_eq!(
            storage.get(keys::SELECTED_FLIGHT_ID).as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn corrupt_working_copy_is_discarded() {
        let (storage, cache) = cache();
        storage.set(keys::SELECTED_FLIGHT, "oops");
        storage.set(keys::SELECTED_FLIGHT_ID, "FL-42");

        assert!(cache.selected_flight().is_none());
        assert_eq!(storage.get(keys::SELECTED_FLIGHT), None);
        assert_eq!(storage.get(keys::SELECTED_FLIGHT_ID), None);
    }
}
