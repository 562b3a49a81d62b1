//! Inbound commands written by the paired app.
//!
//! The characteristic accepts free-form UTF-8 text. Exactly one command is
//! recognised today; everything else is logged and dropped without telling
//! the peer.

use std::borrow::Cow;

/// Wire text of the reset command. Must match byte-for-byte.
pub const RESET_TOKEN: &[u8] = b"RESET";

/// Commands that the peer can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Clear the latched violation.
    Reset,
}

/// Result of decoding one characteristic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Zero-length write. Ignored silently.
    Empty,
    Command(AppCommand),
    /// Anything else, kept for the log line.
    Unrecognised(&'a [u8]),
}

impl AppCommand {
    pub fn decode(bytes: &[u8]) -> Inbound<'_> {
        if bytes.is_empty() {
            Inbound::Empty
        } else if bytes == RESET_TOKEN {
            Inbound::Command(Self::Reset)
        } else {
            Inbound::Unrecognised(bytes)
        }
    }
}

/// Printable form of a raw write for the log. Invalid UTF-8 sequences
/// become U+FFFD; the valid parts are kept.
pub fn display_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
