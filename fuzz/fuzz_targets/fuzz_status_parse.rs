//! Fuzz target: `StatusMessage::parse`
//!
//! Arbitrary text must never panic the parser, and anything it accepts
//! must encode back to exactly the same bytes.
//!
//! cargo fuzz run fuzz_status_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use suitcase::status::StatusMessage;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(msg) = StatusMessage::parse(text) {
        assert_eq!(msg.encode().as_str(), text);
    }
});
