//! View state machine driving the single stats screen.
//!
//! # Design
//! `ViewState` is one enum value owned by `ViewController`, so the screen can
//! never be loading and resolved at once. Every change goes through
//! `ViewController::handle`, which either applies a row of the transition
//! table and returns the `Effect` the host must carry out, or rejects the
//! event and leaves the state untouched.
//!
//! | State            | Event                  | Next             | Effect       |
//! |------------------|------------------------|------------------|--------------|
//! | Idle             | UserTriggersFetch      | Loading          | InvokeClient |
//! | Loading          | ClientReturned(ok)     | Resolved(ok)     | None         |
//! | Loading          | ClientReturned(err)    | Resolved(err)    | None         |
//! | Resolved(err)    | UserTriggersRetry      | Loading          | InvokeClient |
//!
//! `Resolved(Success)` has no outgoing transition.

use tracing::debug;

use crate::error::TransitionError;
use crate::types::FetchOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Resolved(FetchOutcome),
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Resolved(FetchOutcome::Success(_)) => "success",
            ViewState::Resolved(FetchOutcome::Failure(_)) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    UserTriggersFetch,
    UserTriggersRetry,
    ClientReturned(FetchOutcome),
}

impl ViewEvent {
    fn label(&self) -> &'static str {
        match self {
            ViewEvent::UserTriggersFetch => "user_triggers_fetch",
            ViewEvent::UserTriggersRetry => "user_triggers_retry",
            ViewEvent::ClientReturned(_) => "client_returned",
        }
    }
}

/// What the host must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start exactly one fetch and report its outcome via `ClientReturned`.
    InvokeClient,
    None,
}

/// The affordance the screen should offer in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Fetch,
    Retry,
}

#[derive(Debug, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    pub fn available_action(&self) -> Option<UserAction> {
        match self.state {
            ViewState::Idle => Some(UserAction::Fetch),
            ViewState::Resolved(FetchOutcome::Failure(_)) => Some(UserAction::Retry),
            ViewState::Loading | ViewState::Resolved(FetchOutcome::Success(_)) => None,
        }
    }

    /// Apply `event`, replacing the state wholesale on success.
    pub fn handle(&mut self, event: ViewEvent) -> Result<Effect, TransitionError> {
        let from = self.state.label();
        let (next, effect) = match (&self.state, event) {
            (ViewState::Idle, ViewEvent::UserTriggersFetch) => {
                (ViewState::Loading, Effect::InvokeClient)
            }
            (ViewState::Resolved(FetchOutcome::Failure(_)), ViewEvent::UserTriggersRetry) => {
                (ViewState::Loading, Effect::InvokeClient)
            }
            (ViewState::Loading, ViewEvent::ClientReturned(outcome)) => {
                (ViewState::Resolved(outcome), Effect::None)
            }
            (_, event) => {
                return Err(TransitionError::NotAllowed {
                    state: from,
                    event: event.label(),
                })
            }
        };
        self.state = next;
        debug!(from, to = self.state.label(), "view transition");
        Ok(effect)
    }

    pub fn trigger_fetch(&mut self) -> Result<Effect, TransitionError> {
        self.handle(ViewEvent::UserTriggersFetch)
    }

    pub fn trigger_retry(&mut self) -> Result<Effect, TransitionError> {
        self.handle(ViewEvent::UserTriggersRetry)
    }

    pub fn resolve(&mut self, outcome: FetchOutcome) -> Result<Effect, TransitionError> {
        self.handle(ViewEvent::ClientReturned(outcome))
    }
}
