//! Durable key-value storage boundary.
//!
//! The storefront persists session and handoff state in the browser's
//! localStorage; this trait is that boundary. The store is partially
//! trusted: another script or the user can edit or corrupt any entry, so
//! callers must treat unparseable values as absent, never as fatal.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Storage keys owned by this crate.
pub mod keys {
    /// Bearer token.
    pub const TOKEN: &str = "token";
    /// Serialized [`UserIdentity`](crate::UserIdentity).
    pub const USER: &str = "user";
    /// Serialized [`FlightOffer`](crate::FlightOffer) awaiting authentication.
    pub const PENDING_FLIGHT: &str = "pendingFlight";
    /// Working copy consumed by the booking entry point.
    pub const SELECTED_FLIGHT: &str = "selectedFlight";
    /// Id of the working copy, `"unknown"` when the offer has none.
    pub const SELECTED_FLIGHT_ID: &str = "selectedFlightId";
    /// Presence means gated actions proceed without identity.
    pub const GUEST: &str = "guest";

    /// Every key logout must delete.
    pub const ALL: [&str; 6] = [
        TOKEN,
        USER,
        PENDING_FLIGHT,
        SELECTED_FLIGHT,
        SELECTED_FLIGHT_ID,
        GUEST,
    ];
}

/// Consumer-provided durable string storage (localStorage semantics).
///
/// Operations are synchronous and infallible at this boundary; corruption
/// shows up as values that fail to parse, which callers handle.
pub trait Storage: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory [`Storage`], used in tests and native embeddings.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::TOKEN), None);

        storage.set(keys::TOKEN, "tok-1");
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("tok-1"));

        storage.set(keys::TOKEN, "tok-2");
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("tok-2"));

        storage.remove(keys::TOKEN);
        assert_eq!(storage.get(keys::TOKEN), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.remove("missing");
        storage.remove("missing");
    }
}
