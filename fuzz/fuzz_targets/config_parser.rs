//! Fuzz target for the querykit config parser.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use querykit::KitConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // the parser should never panic, only return errors
        if let Ok(config) = KitConfig::from_toml(input) {
            let _ = config.parser();
            let _ = config.compiler();
        }
    }
});
