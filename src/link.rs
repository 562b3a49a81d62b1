//! Link state tracker for the single allowed peer.
//!
//! ```text
//!                 PeerConnected
//!   ┌──────────────┐ ─────────▶ ┌───────────┐
//!   │ Disconnected │            │ Connected │
//!   └──────────────┘ ◀───────── └───────────┘
//!                 PeerDisconnected
//! ```
//!
//! Callbacks only flip the level. The main cycle calls
//! [`LinkTracker::poll_edge`] once per iteration, which compares the level
//! against the previous cycle's. A disconnect therefore yields exactly one
//! [`LinkEdge::Disconnected`] no matter how many idle cycles follow, and the
//! re-advertise action hangs off that single edge.

/// Level plus the previous cycle's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkState {
    pub connected: bool,
    pub was_connected_prev_cycle: bool,
}

/// A level change observed between two consecutive cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEdge {
    Connected,
    Disconnected,
}

#[derive(Debug, Default)]
pub struct LinkTracker {
    state: LinkState,
}

impl LinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect(&mut self) {
        self.state.connected = true;
    }

    pub fn on_disconnect(&mut self) {
        self.state.connected = false;
    }

    /// Consume the edge since the last poll, if any.
    ///
    /// A disconnect and reconnect inside the same cycle produce no edge:
    /// the peer is already back, so there is nothing to re-advertise for.
    pub fn poll_edge(&mut self) -> Option<LinkEdge> {
        let LinkState {
            connected,
            was_connected_prev_cycle: was,
        } = self.state;
        self.state.was_connected_prev_cycle = connected;
        match (was, connected) {
            (true, false) => Some(LinkEdge::Disconnected),
            (false, true) => Some(LinkEdge::Connected),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    pub fn state(&self) -> LinkState {
        self.state
    }
}
