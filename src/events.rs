//! Link event queue.
//!
//! The BLE stack delivers connect, disconnect and write callbacks on its
//! own task. Those callbacks never touch application state; they only
//! enqueue a [`LinkEvent`]. The main cycle drains the queue once per
//! iteration, so every state mutation happens on a single task.
//!
//! ```text
//! ┌──────────────────┐          ┌────────────────────────┐
//! │ GATTS connect    │─────────▶│ link level (Signal)    │──┐
//! │ GATTS disconnect │─────────▶│ latest value wins      │  │  drain  ┌────────────┐
//! │                  │          ├────────────────────────┤  ├────────▶│ Main cycle │
//! │ GATTS write      │─────────▶│ writes (bounded FIFO)  │──┘         └────────────┘
//! └──────────────────┘          └────────────────────────┘
//! ```
//!
//! Writes may be dropped when the FIFO is full. The connection level never
//! is: it lives in a [`Signal`] that always holds the most recent value, so
//! a burst of writes cannot hide a disconnect from the link tracker.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

/// Longest inbound write kept verbatim. Anything longer cannot be a known
/// command, so truncation never changes how it is interpreted.
pub const MAX_COMMAND_LEN: usize = 32;

/// Pending writes the queue can hold between two drains.
const EVENT_QUEUE_DEPTH: usize = 16;

/// Raw bytes of one characteristic write.
pub type CommandPayload = Vec<u8, MAX_COMMAND_LEN>;

/// Everything the radio stack can tell the main cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    PeerConnected,
    PeerDisconnected,
    CommandReceived(CommandPayload),
}

impl LinkEvent {
    /// Build a `CommandReceived` from a raw write.
    pub fn command(bytes: &[u8]) -> Self {
        Self::CommandReceived(command_payload(bytes))
    }
}

/// Copy a raw write into a [`CommandPayload`], truncating to
/// [`MAX_COMMAND_LEN`].
pub fn command_payload(bytes: &[u8]) -> CommandPayload {
    let take = bytes.len().min(MAX_COMMAND_LEN);
    let mut payload = CommandPayload::new();
    // `take` never exceeds capacity.
    let _ = payload.extend_from_slice(&bytes[..take]);
    payload
}

/// Multi-producer / single-consumer queue of [`LinkEvent`]s.
///
/// Writes go through a bounded FIFO. Connect and disconnect only update
/// the pending link level, which a drain delivers after the writes as a
/// single `PeerConnected` or `PeerDisconnected`.
///
/// `const`-constructible so the device build can place one in a static
/// for the C callbacks; tests own their own instance.
pub struct EventQueue {
    commands: Channel<CriticalSectionRawMutex, CommandPayload, EVENT_QUEUE_DEPTH>,
    /// `true` = connected.
    link: Signal<CriticalSectionRawMutex, bool>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            link: Signal::new(),
        }
    }

    /// Enqueue an event. Safe from the radio stack task.
    ///
    /// Link events always succeed and replace any undrained level.
    /// Returns `false` only if a write was dropped because the FIFO is full.
    pub fn push(&self, event: LinkEvent) -> bool {
        match event {
            LinkEvent::PeerConnected => {
                self.link.signal(true);
                true
            }
            LinkEvent::PeerDisconnected => {
                self.link.signal(false);
                true
            }
            LinkEvent::CommandReceived(payload) => match self.commands.try_send(payload) {
                Ok(()) => true,
                Err(_) => {
                    log::warn!("Command queue full, write dropped");
                    false
                }
            },
        }
    }

    /// Pop the oldest pending write, or the pending link level once no
    /// writes are left.
    pub fn pop(&self) -> Option<LinkEvent> {
        if let Ok(payload) = self.commands.try_receive() {
            return Some(LinkEvent::CommandReceived(payload));
        }
        self.link.try_take().map(|connected| {
            if connected {
                LinkEvent::PeerConnected
            } else {
                LinkEvent::PeerDisconnected
            }
        })
    }

    /// Drain all pending events into a callback: writes in FIFO order,
    /// then the latest link level.
    pub fn drain(&self, mut handler: impl FnMut(LinkEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len() + usize::from(self.link.signaled())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Queue shared with the Bluedroid callbacks on the device build.
#[cfg(target_os = "espidf")]
pub static LINK_EVENTS: EventQueue = EventQueue::new();
