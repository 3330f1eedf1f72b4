//! Fuzz test for exchange configuration parsing
//!
//! Tests that arbitrary JSON input doesn't cause panics when parsed as a
//! key exchange configuration.

#![no_main]

use curvekex_core::KexConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<KexConfig>(data) {
        // Anything that parses must serialize back
        let _ = serde_json::to_string(&config).unwrap();
    }
});
