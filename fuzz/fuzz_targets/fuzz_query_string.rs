#![no_main]

use libfuzzer_sys::fuzz_target;
use odata_adapt::parse_query_string;

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM on pathological inputs
    if data.len() > 4096 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(query) = parse_query_string(s) {
            // Parsing must be deterministic.
            assert_eq!(parse_query_string(s).ok(), Some(query));
        }
    }
});
