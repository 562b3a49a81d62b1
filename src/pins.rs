//! GPIO / ADC assignments for the suitcase board (ESP32-C3 SuperMini).
//!
//! Single source of truth: drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Light sensor (LDR + fixed resistor divider)
// ---------------------------------------------------------------------------

/// LDR divider midpoint. GPIO 0 is ADC1 channel 0 on the ESP32-C3.
pub const LDR_ADC_GPIO: i32 = 0;
/// ADC1 channel wired to [`LDR_ADC_GPIO`].
pub const LDR_ADC_CHANNEL: u32 = 0;
