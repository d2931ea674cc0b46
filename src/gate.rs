//! Auth gate and post-login resumption.
//!
//! A visitor picks a flight before they have a session. The gate decides
//! whether a gated action proceeds, prompts for authentication (caching the
//! intent), or proceeds identity-less under the guest override; after a
//! successful login it resumes the cached action. It also owns the
//! per-action-class in-flight markers that suppress double submissions.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;
use crate::intent::IntentCache;
use crate::session::{SessionSignal, SessionStore};
use crate::types::{FlightOffer, UserIdentity};

/// Gate phase. `Resuming` exists only for the duration of
/// [`AuthGate::resume_after_login`]; it is still modeled so a re-entrant
/// call observes a defined phase rather than a half-finished transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Anonymous,
    AwaitingAuth,
    Resuming,
    Authenticated,
}

/// What a gated action should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Session is live: proceed as this user.
    Proceed { user: UserIdentity, token: String },
    /// Guest override is set: proceed with no identity; the booking is
    /// recorded with a null `userId`.
    ProceedAsGuest,
    /// Signed out: the intent is cached and the auth prompt must be raised.
    Prompt,
}

/// Where the UI navigates once an authentication settles.
#[derive(Debug, Clone, PartialEq)]
pub enum NavTarget {
    /// Booking entry point, pre-populated with the resumed flight and
    /// bypassing search/selection.
    Booking(FlightOffer),
    /// Default landing: the search page.
    Search,
}

/// Action classes whose submissions are suppressed while one is in flight.
///
/// Classes are independent: a search in flight does not block a booking
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Search,
    CreateBooking,
    CancelBooking,
    Authenticate,
}

/// Per-action-class in-flight markers.
///
/// [`try_begin`](Self::try_begin) hands out at most one guard per class;
/// duplicate triggers get `None` and are suppressed, not errored. The
/// marker is released when the guard drops, success or failure, so a failed
/// request can never wedge the UI.
#[derive(Clone, Debug, Default)]
pub struct ActionTracker {
    live: Arc<Mutex<HashSet<ActionClass>>>,
}

impl ActionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `class` in flight. `None` while a previous trigger of the same
    /// class has not settled.
    #[must_use]
    pub fn try_begin(&self, class: ActionClass) -> Option<InFlightGuard> {
        if !self.live.lock().insert(class) {
            tracing::debug!(?class, "duplicate trigger suppressed");
            return None;
        }
        Some(InFlightGuard {
            live: self.live.clone(),
            class,
        })
    }

    #[must_use]
    pub fn in_flight(&self, class: ActionClass) -> bool {
        self.live.lock().contains(&class)
    }
}

/// RAII marker for one in-flight action. Hold it across the await; drop it
/// (or let the error path drop it) to allow the next attempt.
#[derive(Debug)]
pub struct InFlightGuard {
    live: Arc<Mutex<HashSet<ActionClass>>>,
    class: ActionClass,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.live.lock().remove(&self.class);
    }
}

/// The gate/resumption state machine.
///
/// Anonymous → (gated action) → AwaitingAuth → (login) → Resuming →
/// Authenticated, and back to Anonymous on logout, session expiry, or
/// prompt dismissal.
pub struct AuthGate {
    session: Arc<SessionStore>,
    intent: IntentCache,
    phase: Mutex<Phase>,
    tracker: ActionTracker,
}

impl AuthGate {
    /// Builds the gate over a settled session. A restored session starts
    /// `Authenticated`; anything else starts `Anonymous`.
    #[must_use]
    pub fn new(session: Arc<SessionStore>, intent: IntentCache) -> Self {
        let phase = if session.is_authenticated() {
            Phase::Authenticated
        } else {
            Phase::Anonymous
        };
        Self {
            session,
            intent,
            phase: Mutex::new(phase),
            tracker: ActionTracker::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    #[must_use]
    pub fn tracker(&self) -> &ActionTracker {
        &self.tracker
    }

    /// Convenience passthrough to [`ActionTracker::try_begin`].
    #[must_use]
    pub fn try_begin(&self, class: ActionClass) -> Option<InFlightGuard> {
        self.tracker.try_begin(class)
    }

    /// Guard for "book this flight".
    ///
    /// Authenticated sessions and guest-override visitors proceed with the
    /// working copy staged; everyone else gets the prompt, with the flight
    /// cached as the pending intent.
    pub fn request_booking(&self, flight: &FlightOffer) -> GateDecision {
        let state = self.session.state();
        if let (Some(user), Some(token)) = (state.user(), state.token()) {
            self.intent.stage_selected_flight(flight);
            return GateDecision::Proceed {
                user: user.clone(),
                token: token.to_owned(),
            };
        }
        if self.session.guest_override() {
            self.intent.stage_selected_flight(flight);
            return GateDecision::ProceedAsGuest;
        }

        self.intent.set_pending_flight(flight);
        *self.phase.lock() = Phase::AwaitingAuth;
        tracing::debug!(flight = ?flight.id, "booking gated, awaiting authentication");
        GateDecision::Prompt
    }

    /// The prompt was closed without signing in.
    ///
    /// The cached intent is dropped: a later, possibly different, login must
    /// not resume an action this visitor abandoned.
    pub fn dismiss_prompt(&self) {
        let mut phase = self.phase.lock();
        if *phase == Phase::AwaitingAuth {
            *phase = Phase::Anonymous;
            self.intent.clear();
            tracing::debug!("auth prompt dismissed, pending intent dropped");
        }
    }

    /// Resumption step after a successful login or registration. Also
    /// dismisses the prompt as far as the gate is concerned.
    ///
    /// Consumes the pending intent: present means straight to the booking
    /// entry point with the flight staged, absent means the default landing.
    pub fn resume_after_login(&self) -> NavTarget {
        *self.phase.lock() = Phase::Resuming;
        let target = match self.intent.take_pending_flight() {
            Some(flight) => {
                self.intent.stage_selected_flight(&flight);
                tracing::debug!(flight = ?flight.id, "resuming cached booking");
                NavTarget::Booking(flight)
            }
            None => {
                tracing::debug!("no pending intent, landing on search");
                NavTarget::Search
            }
        };
        *self.phase.lock() = Phase::Authenticated;
        target
    }

    /// Logout or session expiry observed: back to `Anonymous`.
    pub fn on_session_closed(&self) {
        *self.phase.lock() = Phase::Anonymous;
    }

    /// Call-site hook for backend failures: a 401 tears the session down
    /// and reports the expiry signal; any other error is left for the
    /// caller to surface as a notification.
    pub fn handle_api_error(&self, err: &Error) -> Option<SessionSignal> {
        if matches!(err, Error::Unauthorized) {
            let signal = self.session.handle_unauthorized();
            self.on_session_closed();
            Some(signal)
        } else {
            None
        }
    }
}
