//! Status notification codec.
//!
//! Wire tokens (UTF-8, no terminator):
//!
//! | Token       | Meaning                                         |
//! |-------------|-------------------------------------------------|
//! | `S`         | safe, nothing latched                           |
//! | `V:<ms>`    | violation latched `<ms>` milliseconds ago       |
//! | `E`         | sensor fault (only when enabled in config)      |
//!
//! `<ms>` is plain decimal: no sign, no leading zeros (`0` itself is fine).

use core::fmt::{self, Write};

use crate::violation::{Millis, ViolationState};

/// `"V:"` plus the 20 digits of `u64::MAX`.
pub const MAX_STATUS_LEN: usize = 22;

/// Encoded notification payload.
pub type StatusPayload = heapless::String<MAX_STATUS_LEN>;

/// One report, derived from the latch on every connected cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Safe,
    Violated { elapsed_ms: Millis },
    SensorFault,
}

impl StatusMessage {
    pub fn from_state(state: &ViolationState, now: Millis) -> Self {
        match state.elapsed(now) {
            Some(elapsed_ms) => Self::Violated { elapsed_ms },
            None => Self::Safe,
        }
    }

    /// Render into a fixed-capacity buffer.
    pub fn encode(&self) -> StatusPayload {
        let mut out = StatusPayload::new();
        // Capacity covers the longest token, so this cannot fail.
        let _ = write!(out, "{self}");
        out
    }

    pub fn parse(text: &str) -> Result<Self, ParseStatusError> {
        match text {
            "S" => Ok(Self::Safe),
            "E" => Ok(Self::SensorFault),
            _ => {
                let digits = text
                    .strip_prefix("V:")
                    .ok_or(ParseStatusError::UnknownToken)?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseStatusError::BadNumber);
                }
                if digits.len() > 1 && digits.starts_with('0') {
                    return Err(ParseStatusError::BadNumber);
                }
                let elapsed_ms = digits
                    .parse::<Millis>()
                    .map_err(|_| ParseStatusError::BadNumber)?;
                Ok(Self::Violated { elapsed_ms })
            }
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => f.write_str("S"),
            Self::Violated { elapsed_ms } => write!(f, "V:{elapsed_ms}"),
            Self::SensorFault => f.write_str("E"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatusError {
    UnknownToken,
    BadNumber,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToken => write!(f, "unknown status token"),
            Self::BadNumber => write!(f, "malformed elapsed milliseconds"),
        }
    }
}
