//! Auth event bus.
//!
//! The transport layer reports session-level side effects here instead of
//! acting on them. A single top-level subscriber owns the decision of what
//! "send the user back to sign-in" means.

use tokio::sync::broadcast;

/// Session-level events emitted by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The stored credential was rejected by the server and has been cleared.
    SessionRevoked,
}

/// Broadcast channel for [`AuthEvent`]s.
pub struct AuthEventBus {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Dropped silently when nobody is subscribed.
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new()
    }
}
