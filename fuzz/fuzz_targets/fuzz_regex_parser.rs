#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing must never panic, and a parsed tree prints back to a
    // pattern that parses again
    if let Ok(regex) = sarex::regex::parse_regex(data) {
        let printed = regex.to_string();
        if !printed.is_empty() {
            assert!(sarex::regex::parse_regex(&printed).is_ok(), "{printed}");
        }
    }
});
