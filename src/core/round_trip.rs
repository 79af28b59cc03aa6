//! # Simulated Round Trips
//!
//! A submitted query becomes a [`RoundTrip`] ticket. A background task then
//! plays out the exchange and reports each phase back as an [`Action`]:
//!
//! ```text
//! submit ──► sleep(query delay) ──► QueryLanded ──► responder.respond() ──► ReplyLanded
//! ```
//!
//! Both phases are sent from the same task over the same channel, so the
//! event loop can never see the reply before its query. The task never
//! touches the store; the event loop applies the actions.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::core::action::Action;
use crate::core::config::{DEFAULT_QUERY_MS, DEFAULT_TRANSCRIPTION_MS};
use crate::core::responder::Responder;

/// Default delay before the query shows up in the history.
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_millis(DEFAULT_QUERY_MS);

/// Default delay before a simulated recording yields its transcript.
pub const DEFAULT_TRANSCRIPTION_DELAY: Duration = Duration::from_millis(DEFAULT_TRANSCRIPTION_MS);

pub const SIMULATED_TRANSCRIPT: &str = "This is a simulated voice message transcript.";

/// One outstanding query/reply exchange, bound to the user it was submitted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    pub id: Uuid,
    pub company_id: String,
    pub user_id: String,
    pub query: String,
}

impl RoundTrip {
    pub fn new(
        company_id: impl Into<String>,
        user_id: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            user_id: user_id.into(),
            query: query.into(),
        }
    }

    /// The (company, user) pair this exchange belongs to.
    pub fn target(&self) -> (String, String) {
        (self.company_id.clone(), self.user_id.clone())
    }
}

/// Plays out `trip` and reports both phases on `tx`.
pub async fn drive(
    trip: RoundTrip,
    query_delay: Duration,
    responder: Arc<dyn Responder>,
    tx: UnboundedSender<Action>,
) {
    tokio::time::sleep(query_delay).await;
    debug!("Round trip {} query landed", trip.id);
    if tx.send(Action::QueryLanded(trip.clone())).is_err() {
        warn!("Round trip {} dropped: receiver closed", trip.id);
        return;
    }

    let content = responder.respond(&trip.query).await;
    debug!("Round trip {} reply ready from {}", trip.id, responder.name());
    if tx.send(Action::ReplyLanded { trip, content }).is_err() {
        warn!("Failed to deliver reply: receiver closed");
    }
}

/// Spawns [`drive`] on the tokio runtime.
pub fn spawn(
    trip: RoundTrip,
    query_delay: Duration,
    responder: Arc<dyn Responder>,
    tx: UnboundedSender<Action>,
) -> AbortHandle {
    info!(
        "Spawning round trip {} (company={}, user={})",
        trip.id, trip.company_id, trip.user_id
    );
    tokio::spawn(drive(trip, query_delay, responder, tx)).abort_handle()
}

/// Pretends to record audio for `delay`, then reports a fixed transcript.
pub fn spawn_transcription(delay: Duration, tx: UnboundedSender<Action>) -> AbortHandle {
    info!("Simulating recording for {}ms", delay.as_millis());
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx
            .send(Action::TranscriptReady(SIMULATED_TRANSCRIPT.to_string()))
            .is_err()
        {
            warn!("Failed to deliver transcript: receiver closed");
        }
    })
    .abort_handle()
}
