//! # Responders
//!
//! A `Responder` turns a query into reply text. The only implementation is
//! [`SimulatedResponder`], which waits a fixed latency and echoes the query
//! back in a canned sentence.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::core::config::DEFAULT_REPLY_MS;

/// Default delay before the simulated reply is ready.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(DEFAULT_REPLY_MS);

#[async_trait]
pub trait Responder: Send + Sync {
    /// Returns the name of the responder.
    fn name(&self) -> &str;

    /// Produces the reply text for `query`. May take a while.
    async fn respond(&self, query: &str) -> String;
}

pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn respond(&self, query: &str) -> String {
        debug!("Simulating reply in {}ms", self.delay.as_millis());
        tokio::time::sleep(self.delay).await;
        simulated_reply(query)
    }
}

/// The canned reply text for `query`.
pub fn simulated_reply(query: &str) -> String {
    format!("This is a simulated response to: \"{query}\"")
}
