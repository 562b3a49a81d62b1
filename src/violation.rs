//! Violation detector: turns a raw light sample into a latched tamper flag.
//!
//! ```text
//!  RawSample ──▶ detect() ──▶ light? ──▶ ViolationLatch ──▶ ViolationState
//!                 ▲                          ▲
//!          threshold + polarity        clear() (RESET command only)
//! ```
//!
//! The latch is one-way: the first sample that shows light records
//! `violated_at`, and nothing but an explicit [`ViolationLatch::clear`]
//! returns it to safe. Light disappearing again (lid closed) does not
//! erase the event.

use serde::{Deserialize, Serialize};

/// One light-intensity reading from the 12-bit ADC.
pub type RawSample = u16;

/// Largest value the reference ADC can produce.
pub const RAW_SAMPLE_MAX: RawSample = 4095;

/// Monotonic milliseconds since boot.
pub type Millis = u64;

/// How a raw reading maps to "light present".
///
/// Depends on which side of the divider the LDR sits. With the LDR on the
/// high side (reference wiring) more light pulls the ADC value *down*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightPolarity {
    /// `raw < threshold` means light (reference wiring).
    #[default]
    LowMeansLight,
    /// `raw > threshold` means light (LDR on the low side of the divider).
    HighMeansLight,
}

/// Classify a single sample.
pub fn detect(raw: RawSample, threshold: u16, polarity: LightPolarity) -> bool {
    match polarity {
        LightPolarity::LowMeansLight => raw < threshold,
        LightPolarity::HighMeansLight => raw > threshold,
    }
}

// ---------------------------------------------------------------------------
// ViolationState
// ---------------------------------------------------------------------------

/// Latched tamper state.
///
/// `violated_at` is only meaningful while `violated` is set; it is written
/// once on the false→true edge and zeroed again by a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViolationState {
    pub violated: bool,
    pub violated_at: Millis,
}

impl ViolationState {
    /// Power-on state.
    pub const SAFE: Self = Self {
        violated: false,
        violated_at: 0,
    };

    /// Milliseconds since the violation edge, or `None` while safe.
    /// Saturates at zero if `now` is somehow behind the edge.
    pub fn elapsed(&self, now: Millis) -> Option<Millis> {
        self.violated.then(|| now.saturating_sub(self.violated_at))
    }
}

// ---------------------------------------------------------------------------
// ViolationLatch
// ---------------------------------------------------------------------------

/// Owner of the [`ViolationState`]. Mutated only from the main cycle.
#[derive(Debug, Default)]
pub struct ViolationLatch {
    state: ViolationState,
}

impl ViolationLatch {
    pub fn new() -> Self {
        Self {
            state: ViolationState::SAFE,
        }
    }

    /// Feed one classified sample taken at `now`.
    ///
    /// Returns `true` only on the call that latched.
    pub fn observe(&mut self, light_present: bool, now: Millis) -> bool {
        if light_present && !self.state.violated {
            self.state = ViolationState {
                violated: true,
                violated_at: now,
            };
            return true;
        }
        false
    }

    /// Return to the safe state. Returns `true` if a violation was cleared,
    /// `false` if the latch was already safe (no-op).
    pub fn clear(&mut self) -> bool {
        let was_violated = self.state.violated;
        self.state = ViolationState::SAFE;
        was_violated
    }

    pub fn state(&self) -> ViolationState {
        self.state
    }

    pub fn is_violated(&self) -> bool {
        self.state.violated
    }
}
