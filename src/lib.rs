#![doc = include_str!("../README.md")]

#[cfg(feature = "api")]
pub mod api;
pub mod error;
pub mod gate;
pub mod intent;
pub mod session;
pub mod storage;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "api")]
pub use api::{ApiClient, ApiConfig, AuthResponse, BookingRequest, RegisterRequest};
pub use error::Error;
pub use gate::{
    ActionClass, ActionTracker, AuthGate, GateDecision, InFlightGuard, NavTarget, Phase,
};
pub use intent::IntentCache;
pub use session::{SessionSignal, SessionState, SessionStore};
pub use storage::{keys, MemoryStorage, Storage};
pub use types::{
    Booking, BookingId, FlightId, FlightOffer, SearchQuery, TripType, UserId, UserIdentity,
};
