//! # Actions
//!
//! Everything that can happen in chatdeck becomes an `Action`.
//! User picks a company? That's `Action::SelectCompany(id)`.
//! The simulated backend answers? That's `Action::ReplyLanded { .. }`.
//!
//! `update()` applies an action to the store and returns the `Effect` the
//! adapter has to carry out (spawning tasks, quitting). No I/O happens here.
//!
//! ```text
//! Store + Action  →  update()  →  Store' + Effect
//! ```

use log::{debug, warn};

use crate::core::notify::Notification;
use crate::core::round_trip::RoundTrip;
use crate::core::store::{HistoryStore, Outcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectCompany(String),
    SelectUser(String),
    AddUser(String),
    ToggleInputMode,
    SubmitQuery(String),
    /// A simulated recording finished; treated like a submitted query.
    TranscriptReady(String),
    QueryLanded(RoundTrip),
    ReplyLanded { trip: RoundTrip, content: String },
    Quit,
}

/// Side effects requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SpawnRoundTrip(RoundTrip),
}

pub fn update(store: &mut HistoryStore, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::SelectCompany(id) => {
            applied("select company", store.select_company(&id));
            Effect::None
        }
        Action::SelectUser(id) => {
            applied("select user", store.select_user(&id));
            Effect::None
        }
        Action::AddUser(name) => {
            applied("add user", store.add_user(&name));
            Effect::None
        }
        Action::ToggleInputMode => {
            let mode = store.toggle_input_mode();
            debug!("Input mode is now {}", mode.label());
            Effect::None
        }
        Action::SubmitQuery(text) => match applied("submit query", store.submit_query(&text)) {
            Some(trip) => Effect::SpawnRoundTrip(trip),
            None => Effect::None,
        },
        Action::TranscriptReady(text) => match store.submit_query(&text) {
            Outcome::Applied(trip) => Effect::SpawnRoundTrip(trip),
            Outcome::NoOp(reason) => {
                // The recording is gone once dropped, so tell the user
                warn!("Transcript dropped: {reason}");
                store.notify(Notification::new(
                    "Voice Message Not Sent",
                    format!("Transcript dropped: {reason}"),
                ));
                Effect::None
            }
        },
        Action::QueryLanded(trip) => {
            applied("land query", store.land_query(&trip));
            Effect::None
        }
        Action::ReplyLanded { trip, content } => {
            applied("land reply", store.land_reply(&trip, &content));
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Unwraps an applied outcome, logging no-ops.
fn applied<T>(what: &str, outcome: Outcome<T>) -> Option<T> {
    match outcome {
        Outcome::Applied(value) => Some(value),
        Outcome::NoOp(reason) => {
            debug!("{what} skipped: {reason}");
            None
        }
    }
}
